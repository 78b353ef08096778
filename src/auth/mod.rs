pub mod authentication;
pub mod credentials;
pub mod password;
pub mod session;
pub mod user;

pub use authentication::*;
pub use credentials::*;
pub use password::*;
pub use session::*;
pub use user::*;
