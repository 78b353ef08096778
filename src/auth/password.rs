use rocket::tokio::task;

use crate::error::AppError;

/// bcrypt with a configurable cost. Hashing runs on the blocking pool so a
/// high cost never stalls the request executor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, password: &str) -> Result<String, AppError> {
        let cost = self.cost;
        let password = password.to_string();

        let hashed = task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;

        Ok(hashed)
    }

    /// A malformed stored hash counts as a mismatch rather than an error.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let password = password.to_string();
        let hash = hash.to_string();

        let valid = task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
            .await?;

        Ok(valid)
    }
}
