//! Password value object - Domain layer password handling.
//!
//! Plaintext is first reduced to a fixed 32-byte SHA-256 digest, then hashed
//! with Argon2id. The pre-digest makes every input the same length for the
//! slow hash, so long passwords are never truncated.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sha2::{Digest, Sha256};

use crate::errors::{AppError, AppResult};

/// Password value object that handles hashing and verification.
#[derive(Clone)]
pub struct Password {
    hash: String,
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Hash a plaintext password with a fresh random salt.
    ///
    /// Length rules are enforced at the request boundary, not here:
    /// any input, including very long ones, is accepted.
    ///
    /// # Errors
    /// Returns an internal error if the hashing primitive fails.
    pub fn hash(plain_text: &str) -> AppResult<Self> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2()
            .hash_password(&Self::pre_digest(plain_text), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?;

        Ok(Self {
            hash: hash.to_string(),
        })
    }

    /// Create a Password from an existing hash (from database).
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }

    /// Get the hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Consume and return the hash string.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password against this hash.
    ///
    /// A malformed stored hash verifies as `false` rather than erroring.
    pub fn verify(&self, plain_text: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.hash) else {
            return false;
        };

        Self::argon2()
            .verify_password(&Self::pre_digest(plain_text), &parsed)
            .is_ok()
    }

    /// Fixed-size one-way digest applied before the slow hash.
    fn pre_digest(plain_text: &str) -> [u8; 32] {
        Sha256::digest(plain_text.as_bytes()).into()
    }

    #[inline]
    fn argon2() -> Argon2<'static> {
        Argon2::default()
    }
}
