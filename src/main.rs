#[macro_use]
extern crate rocket;

mod auth;
mod config;
mod database;
mod env;
mod error;
mod routes;
mod telemetry;
#[cfg(test)]
mod test;
mod validation;
mod views;

use auth::{PasswordHasher, SessionStore, unauthorized};
use config::AppConfig;
use error::AppError;
use rocket::figment::Figment;
use rocket::{Build, Rocket};
use routes::{dashboard, health, index, login, login_page, logout, signup, signup_page};
use sqlx::SqlitePool;
use telemetry::{TelemetryFairing, init_tracing};
use thiserror::Error;
use tracing::{error, info};
use views::Views;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Anyhow(anyhow::Error),
    #[error("{0}")]
    Figment(Box<rocket::figment::Error>),
    #[error("{0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Application error: {0}")]
    App(#[from] AppError),
    #[error("{0}")]
    Env(#[from] dotenvy::Error),
    #[error("{0}")]
    Rocket(Box<rocket::Error>),
}

impl From<anyhow::Error> for Error {
    fn from(value: anyhow::Error) -> Self {
        Error::Anyhow(value)
    }
}

impl From<rocket::figment::Error> for Error {
    fn from(value: rocket::figment::Error) -> Self {
        Error::Figment(Box::new(value))
    }
}

impl From<rocket::Error> for Error {
    fn from(value: rocket::Error) -> Self {
        Error::Rocket(Box::new(value))
    }
}

#[rocket::main]
async fn main() -> Result<(), Error> {
    env::load_environment()?;
    init_tracing()?;

    let figment = AppConfig::figment();
    let config = AppConfig::from_figment(&figment)?;

    let pool = database::connect(&config.database_url).await?;
    database::init_schema(&pool).await?;

    let sessions = SessionStore::new(pool.clone(), config.session_ttl());
    spawn_session_cleanup(sessions.clone(), config.session_cleanup_interval_secs);

    let _rocket = init_rocket(figment, pool, sessions, &config)?.launch().await?;

    Ok(())
}

fn spawn_session_cleanup(sessions: SessionStore, interval_secs: u64) {
    tokio::spawn(async move {
        tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;

        loop {
            match sessions.purge_expired().await {
                Ok(count) => {
                    if count > 0 {
                        info!("Cleaned up {} expired sessions", count);
                    }
                }
                Err(e) => {
                    error!("Failed to clean expired sessions: {}", e);
                }
            }

            tokio::time::sleep(tokio::time::Duration::from_secs(interval_secs)).await;
        }
    });
}

pub fn init_rocket(
    figment: Figment,
    pool: SqlitePool,
    sessions: SessionStore,
    config: &AppConfig,
) -> Result<Rocket<Build>, AppError> {
    info!("Starting user portal");

    let views = Views::new()?;

    Ok(rocket::custom(figment)
        .manage(pool)
        .manage(sessions)
        .manage(PasswordHasher::new(config.bcrypt_cost))
        .manage(views)
        .mount(
            "/",
            routes![
                index,
                signup_page,
                signup,
                login_page,
                login,
                dashboard,
                logout,
                health,
            ],
        )
        .register("/", catchers![unauthorized])
        .attach(TelemetryFairing))
}
