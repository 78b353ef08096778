use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::auth::DbUser;
use crate::error::AppError;

/// Inserts a user row. The unique constraint on `username` is the only
/// duplicate check, so two racing signups cannot both succeed.
#[instrument(skip(pool, password_hash))]
pub async fn create_user(
    pool: &Pool<Sqlite>,
    username: &str,
    password_hash: &str,
) -> Result<i64, AppError> {
    info!("Creating new user");

    let res = sqlx::query("INSERT INTO users (username, password) VALUES (?, ?)")
        .bind(username)
        .bind(password_hash)
        .execute(pool)
        .await;

    match res {
        Ok(res) => Ok(res.last_insert_rowid()),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
            AppError::Conflict(format!("Username '{}' already exists", username)),
        ),
        Err(e) => Err(AppError::Database(e)),
    }
}

#[instrument(skip(pool))]
pub async fn find_user_by_username(
    pool: &Pool<Sqlite>,
    username: &str,
) -> Result<Option<DbUser>, AppError> {
    info!("Getting user by username");

    let row = sqlx::query_as::<_, DbUser>(
        "SELECT id, username, password FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
