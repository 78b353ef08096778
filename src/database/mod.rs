use std::str::FromStr;

use sqlx::{
    Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tracing::{info, instrument};

pub mod schema;
pub mod sessions;
pub mod users;

pub use schema::CURRENT_SCHEMA;

/// Opens the pool, creating the database file when it does not exist yet.
#[instrument]
pub async fn connect(database_url: &str) -> Result<Pool<Sqlite>, sqlx::Error> {
    info!("Connecting to SQLite database");

    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    SqlitePoolOptions::new().connect_with(options).await
}

/// Creates any missing tables. Safe to run on every start.
#[instrument(skip(pool))]
pub async fn init_schema(pool: &Pool<Sqlite>) -> Result<(), sqlx::Error> {
    info!("Ensuring database schema");

    sqlx::raw_sql(CURRENT_SCHEMA).execute(pool).await?;

    Ok(())
}
