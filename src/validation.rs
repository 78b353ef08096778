use rocket::FromForm;
use validator::Validate;

use crate::error::AppError;

pub const MISSING_FIELDS_MESSAGE: &str = "Username and password are required";
pub const PASSWORD_TOO_LONG_MESSAGE: &str = "Password must be at most 72 bytes";
pub const PASSWORD_NUL_MESSAGE: &str = "Password must not contain null characters";

/// bcrypt only hashes the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Body of both the signup and the login form.
#[derive(FromForm, Validate)]
pub struct Credentials {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    /// Collapses field errors into the single message shown on the form.
    pub fn check(&self) -> Result<(), AppError> {
        self.validate().map_err(|errors| {
            let fields: Vec<String> = errors
                .field_errors()
                .keys()
                .map(|field| field.to_string())
                .collect();
            AppError::Validation(format!("{}: {}", MISSING_FIELDS_MESSAGE, fields.join(", ")))
        })
    }

    pub fn check_password(&self) -> Result<(), AppError> {
        check_password(&self.password)
    }
}

/// Accepts exactly the passwords bcrypt hashes without loss, so distinct
/// accepted passwords never verify against each other's hash. The limit is
/// in bytes, not characters. bcrypt terminates its key with a NUL and
/// repeats it cyclically, so an embedded NUL could alias a shorter password.
/// The validation message is the one shown on the form.
pub fn check_password(password: &str) -> Result<(), AppError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AppError::Validation(PASSWORD_TOO_LONG_MESSAGE.to_string()));
    }

    if password.contains('\0') {
        return Err(AppError::Validation(PASSWORD_NUL_MESSAGE.to_string()));
    }

    Ok(())
}
