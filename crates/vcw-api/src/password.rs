//! Argon2id password hashing.
//!
//! Hashing is CPU-bound and runs on the blocking pool.

use std::sync::OnceLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::AppError;

/// Hash `password` into a PHC string.
pub async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
    })
    .await
    .map_err(|e| AppError::Internal(format!("password hashing task failed: {e}")))?
}

/// Check `password` against a stored PHC string. A malformed stored hash
/// never matches.
pub async fn verify_password(password: String, stored: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || {
        let Ok(parsed) = PasswordHash::new(&stored) else {
            tracing::warn!("stored password hash is not a valid PHC string");
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
    .await
    .map_err(|e| AppError::Internal(format!("password verification task failed: {e}")))
}

/// Run a full verification against a throwaway hash, always failing.
///
/// Used on login for unknown emails so that the response time does not
/// reveal whether an address is registered.
pub async fn verify_unknown_user(password: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || {
        if let Ok(parsed) = PasswordHash::new(dummy_hash()) {
            let _ = Argon2::default().verify_password(password.as_bytes(), &parsed);
        }
        false
    })
    .await
    .map_err(|e| AppError::Internal(format!("password verification task failed: {e}")))
}

fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(b"vcw-unknown-user", &salt)
            .map(|hash| hash.to_string())
            .unwrap_or_default()
    })
}
