use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::database::users::{create_user, find_user_by_username};
use crate::error::AppError;
use crate::validation::check_password;

use super::{PasswordHasher, User};

/// Hashes the password and stores a new user. A taken username surfaces as
/// `AppError::Conflict` and leaves the existing row untouched. Passwords
/// bcrypt cannot hash without loss are rejected with `AppError::Validation`.
#[instrument(skip(pool, hasher, password))]
pub async fn register_user(
    pool: &Pool<Sqlite>,
    hasher: &PasswordHasher,
    username: &str,
    password: &str,
) -> Result<User, AppError> {
    check_password(password)?;

    let password_hash = hasher.hash(password).await?;
    let id = create_user(pool, username, &password_hash).await?;

    info!(user_id = id, "Registered user");

    Ok(User {
        id,
        username: username.to_string(),
    })
}

/// Returns the user when the username exists and the password matches.
/// Unknown usernames and wrong passwords are indistinguishable to callers.
#[instrument(skip(pool, hasher, password))]
pub async fn authenticate_user(
    pool: &Pool<Sqlite>,
    hasher: &PasswordHasher,
    username: &str,
    password: &str,
) -> Result<Option<User>, AppError> {
    info!("Authenticating user");

    // No stored hash can have come from such a password, and bcrypt would
    // otherwise match on the truncated prefix.
    if check_password(password).is_err() {
        return Ok(None);
    }

    let user = match find_user_by_username(pool, username).await? {
        Some(user) => user,
        None => return Ok(None),
    };

    if hasher.verify(password, &user.password).await? {
        Ok(Some(User::from(user)))
    } else {
        Ok(None)
    }
}
