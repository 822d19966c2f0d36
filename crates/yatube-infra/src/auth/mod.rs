//! Token and password services for the API's login flow.

mod jwt;
mod password;

pub use jwt::{DEV_SECRET, JwtConfig, JwtTokenService};
pub use password::{Argon2PasswordService, MIN_PASSWORD_LENGTH};
