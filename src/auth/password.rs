//! Argon2id credential hashing. Stored hashes are PHC strings carrying their
//! own salt and parameters.

use anyhow::anyhow;
use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::error::{AppError, AppResult};

pub fn hash_password(plain: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    match Argon2::default().hash_password(plain.as_bytes(), &salt) {
        Ok(hash) => Ok(hash.to_string()),
        Err(e) => {
            error!(error = %e, "password hashing failed");
            Err(AppError::Internal(anyhow!("hash password: {e}")))
        }
    }
}

/// Checks `plain` against a stored hash.
///
/// A mismatch is [`AppError::InvalidCredentials`]; a hash that cannot be
/// parsed is a server fault and maps to [`AppError::Internal`].
pub fn verify_password(plain: &str, stored: &str) -> AppResult<()> {
    let parsed = PasswordHash::new(stored).map_err(|e| {
        error!(error = %e, "stored password hash is unreadable");
        AppError::Internal(anyhow!("parse password hash: {e}"))
    })?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(()),
        Err(password_hash::Error::Password) => Err(AppError::InvalidCredentials),
        Err(e) => {
            error!(error = %e, "password verification failed");
            Err(AppError::Internal(anyhow!("verify password: {e}")))
        }
    }
}
