use chrono::{NaiveDateTime, Utc};
use rand::{Rng, distr::Alphanumeric};
use sqlx::{Pool, Sqlite};
use tracing::{debug, instrument};

use crate::database::sessions::{
    clean_expired_sessions, create_user_session, get_session_by_token, invalidate_session,
};
use crate::error::AppError;

use super::User;

pub const SESSION_COOKIE: &str = "session_token";

const TOKEN_LENGTH: usize = 48;

#[derive(Debug, Clone)]
pub struct UserSession {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub token: String,
    pub expires_at: NaiveDateTime,
}

#[derive(sqlx::FromRow)]
pub struct DbUserSession {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub token: String,
    pub expires_at: NaiveDateTime,
}

impl From<DbUserSession> for UserSession {
    fn from(session: DbUserSession) -> Self {
        Self {
            id: session.id,
            user_id: session.user_id,
            username: session.username,
            token: session.token,
            expires_at: session.expires_at,
        }
    }
}

impl UserSession {
    pub fn generate_token() -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.expires_at > Utc::now().naive_utc()
    }

    pub fn user(&self) -> User {
        User {
            id: self.user_id,
            username: self.username.clone(),
        }
    }
}

/// Server-side session registry keyed by opaque tokens. Handlers receive it
/// as managed state; the token itself travels in a private cookie.
#[derive(Clone)]
pub struct SessionStore {
    pool: Pool<Sqlite>,
    ttl: chrono::Duration,
}

impl SessionStore {
    pub fn new(pool: Pool<Sqlite>, ttl: chrono::Duration) -> Self {
        Self { pool, ttl }
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    #[instrument(skip(self), fields(username = %user.username))]
    pub async fn open(&self, user: &User) -> Result<UserSession, AppError> {
        let token = UserSession::generate_token();
        let expires_at = Utc::now().naive_utc() + self.ttl;

        let id = create_user_session(&self.pool, user.id, &token, expires_at).await?;

        Ok(UserSession {
            id,
            user_id: user.id,
            username: user.username.clone(),
            token,
            expires_at,
        })
    }

    /// Resolves a token to its session. Unknown and expired tokens both
    /// resolve to `None`.
    #[instrument(skip_all)]
    pub async fn resolve(&self, token: &str) -> Result<Option<UserSession>, AppError> {
        let session = get_session_by_token(&self.pool, token)
            .await?
            .map(UserSession::from);

        match session {
            Some(session) if session.is_valid() => Ok(Some(session)),
            Some(session) => {
                debug!(user_id = session.user_id, "Session token expired");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Returns whether a session was actually removed.
    #[instrument(skip_all)]
    pub async fn revoke(&self, token: &str) -> Result<bool, AppError> {
        Ok(invalidate_session(&self.pool, token).await? > 0)
    }

    pub async fn purge_expired(&self) -> Result<u64, AppError> {
        clean_expired_sessions(&self.pool).await
    }
}
