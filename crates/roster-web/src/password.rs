//! Password hashing with Argon2id.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$m=...`), which carry
//! their own salt and cost parameters. Verification reads the parameters
//! from the stored hash, so raising the configured cost only affects new
//! accounts.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::config::PasswordSection;
use crate::error::WebError;

/// Argon2id hasher configured with the application's cost parameters.
#[derive(Clone)]
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl PasswordService {
    /// Build a hasher from configured cost parameters.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::Password`] if the parameters are out of range.
    pub fn new(costs: &PasswordSection) -> Result<Self, WebError> {
        let params = Params::new(costs.memory_kib, costs.iterations, costs.parallelism, None)
            .map_err(|e| WebError::Password(format!("invalid argon2 parameters: {e}")))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash `password` with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, WebError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| WebError::Password(format!("failed to hash password: {e}")))
    }

    /// Check `password` against a stored PHC hash.
    ///
    /// A malformed stored hash never verifies.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        let parsed = match PasswordHash::new(stored) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash is malformed");
                return false;
            }
        };
        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
