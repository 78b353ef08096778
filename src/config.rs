use rocket::figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};

const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub session_ttl_minutes: i64,
    pub session_cleanup_interval_secs: u64,
    pub bcrypt_cost: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://users.db".to_string(),
            session_ttl_minutes: 60,
            session_cleanup_interval_secs: 3600,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl AppConfig {
    /// Rocket's own figment (Rocket.toml, `ROCKET_*`) extended with the
    /// application keys. `PORTAL_*` variables win over everything else, and
    /// a bare `DATABASE_URL` is honoured for the database location.
    pub fn figment() -> Figment {
        rocket::Config::figment()
            .join(Serialized::defaults(AppConfig::default()))
            .merge(Env::raw().only(&["database_url"]).global())
            .merge(Env::prefixed("PORTAL_").global())
    }

    pub fn from_figment(figment: &Figment) -> Result<Self, rocket::figment::Error> {
        let config = figment.extract::<AppConfig>()?;
        config.check()?;
        Ok(config)
    }

    /// Rejects values the server could start with but never serve correctly.
    pub fn check(&self) -> Result<(), rocket::figment::Error> {
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.bcrypt_cost) {
            return Err(format!(
                "bcrypt_cost must be between {} and {}, got {}",
                MIN_BCRYPT_COST, MAX_BCRYPT_COST, self.bcrypt_cost
            )
            .into());
        }

        if self.session_ttl_minutes <= 0
            || chrono::Duration::try_minutes(self.session_ttl_minutes).is_none()
        {
            return Err(format!(
                "session_ttl_minutes must be a positive number of minutes, got {}",
                self.session_ttl_minutes
            )
            .into());
        }

        if self.session_cleanup_interval_secs == 0 {
            return Err("session_cleanup_interval_secs must be at least 1".to_string().into());
        }

        Ok(())
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::try_minutes(self.session_ttl_minutes).unwrap_or(chrono::Duration::MAX)
    }
}
