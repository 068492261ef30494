//! Argon2 password hashing.
//!
//! Both operations are CPU-bound, so they run on the blocking pool.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use rand_core::OsRng;

use crate::error::ApiError;

/// Hash `password` into an argon2 PHC string.
pub async fn hash(password: String) -> Result<String, ApiError> {
  tokio::task::spawn_blocking(move || {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map(|h| h.to_string())
      .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))
  })
  .await
  .map_err(|e| ApiError::Internal(format!("hashing task failed: {e}")))?
}

/// Check `password` against a stored PHC string. An unparseable hash is an
/// internal error, not a failed login.
pub async fn verify(password: String, phc: String) -> Result<bool, ApiError> {
  tokio::task::spawn_blocking(move || {
    let parsed = PasswordHash::new(&phc)
      .map_err(|e| ApiError::Internal(format!("stored hash is invalid: {e}")))?;
    Ok(
      Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok(),
    )
  })
  .await
  .map_err(|e| ApiError::Internal(format!("verification task failed: {e}")))?
}
