//! Argon2 password hashing for stored user credentials.
//!
//! The service also owns the password policy: `hash` refuses anything
//! shorter than the configured minimum, so a weak password never reaches
//! the users table in any form.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use yatube_core::ports::{AuthError, PasswordService};

/// Shortest password accepted at registration, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Salted Argon2id hashes in PHC string form, e.g. `$argon2id$v=19$...`.
pub struct Argon2PasswordService {
    argon2: Argon2<'static>,
    min_length: usize,
}

impl Argon2PasswordService {
    pub fn new() -> Self {
        Self::with_min_length(MIN_PASSWORD_LENGTH)
    }

    pub fn with_min_length(min_length: usize) -> Self {
        Self {
            argon2: Argon2::default(),
            min_length,
        }
    }

    fn check_policy(&self, password: &str) -> Result<(), AuthError> {
        if password.chars().count() < self.min_length {
            return Err(AuthError::WeakPassword {
                min_length: self.min_length,
            });
        }
        Ok(())
    }
}

impl Default for Argon2PasswordService {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        self.check_policy(password)?;

        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashingError(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// A stored hash that does not parse is a server fault, not a wrong password.
    fn verify(&self, password: &str, stored: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(stored).map_err(|e| {
            tracing::error!(error = %e, "Stored password hash is malformed");
            AuthError::HashingError(e.to_string())
        })?;

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
