// core/src/auth/password.rs

//! Argon2 password hashing.

use crate::error::{Result, ShopError};
use argon2::{
  password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use rand_core::OsRng;
use tracing::{debug, error, instrument};

/// Hashes `password` with a fresh random salt and returns the PHC string.
#[instrument(name = "password::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String> {
  if password.is_empty() {
    return Err(ShopError::validation("Password cannot be empty."));
  }

  let salt = SaltString::generate(&mut OsRng);
  match Argon2::default().hash_password(password.as_bytes(), &salt) {
    Ok(hash) => {
      debug!("Password hashed.");
      Ok(hash.to_string())
    }
    Err(argon_err) => {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      Err(ShopError::Internal(format!("Password hashing failed: {}", argon_err)))
    }
  }
}

/// `Ok(false)` on a mismatch. A stored hash that does not parse is an
/// internal error, not a failed login.
#[instrument(name = "password::verify_password", skip_all, err(Display))]
pub fn verify_password(stored_hash: &str, provided_password: &str) -> Result<bool> {
  if provided_password.is_empty() {
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(stored_hash).map_err(|parse_err| {
    error!(error = %parse_err, "Stored password hash does not parse.");
    ShopError::Internal(format!("Invalid stored password hash: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => Ok(false),
    Err(other) => {
      error!(error = %other, "Argon2 password verification failed.");
      Err(ShopError::Internal(format!("Password verification failed: {}", other)))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash_then_verify() {
    let hash = hash_password("correct horse").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password(&hash, "correct horse").unwrap());
    assert!(!verify_password(&hash, "wrong horse").unwrap());
  }

  #[test]
  fn salts_differ_between_hashes() {
    let a = hash_password("same-password").unwrap();
    let b = hash_password("same-password").unwrap();
    assert_ne!(a, b);
  }

  #[test]
  fn empty_password_is_rejected() {
    assert!(matches!(hash_password(""), Err(ShopError::Validation(_))));
  }

  #[test]
  fn garbage_hash_is_internal_error() {
    assert!(matches!(verify_password("not-a-hash", "pw"), Err(ShopError::Internal(_))));
  }
}
