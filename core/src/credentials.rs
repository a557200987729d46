// core/src/credentials.rs

//! Password hashing and verification for roster users.

use crate::error::CatalogError;
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use tracing::{debug, error, instrument, warn};

/// Hashes a plain-text password using Argon2 with a fresh random salt.
///
/// # Returns
/// The PHC-formatted hash string, or `CatalogError::Validation` for an empty password.
#[instrument(name = "credentials::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, CatalogError> {
  if password.is_empty() {
    return Err(CatalogError::Validation("La contraseña no puede estar vacía".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  match Argon2::default().hash_password(password.as_bytes(), &salt) {
    Ok(hash) => {
      debug!("Password hashed.");
      Ok(hash.to_string())
    }
    Err(argon_err) => {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      Err(CatalogError::Credential(format!("Password hashing failed: {}", argon_err)))
    }
  }
}

/// True if `stored` is a complete PHC hash string rather than a legacy plaintext value.
///
/// A leading `$` alone is not enough: `$ecreto` parses as a bare PHC identifier.
pub fn is_hashed(stored: &str) -> bool {
  PasswordHash::new(stored)
    .map(|parsed| parsed.salt.is_some() && parsed.hash.is_some())
    .unwrap_or(false)
}

/// Checks `provided` against a stored credential.
///
/// Stored Argon2 hashes are verified normally. Legacy plaintext entries from the
/// baked-in roster are compared directly, with a warning, until they are rehashed.
#[instrument(name = "credentials::verify_password", skip(stored, provided), err(Display))]
pub fn verify_password(stored: &str, provided: &str) -> Result<bool, CatalogError> {
  if stored.is_empty() || provided.is_empty() {
    return Ok(false);
  }

  if !is_hashed(stored) {
    warn!("Verifying against a plaintext stored password.");
    return Ok(stored == provided);
  }

  let parsed = PasswordHash::new(stored).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash.");
    CatalogError::Credential(format!("Invalid stored password hash: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided.as_bytes(), &parsed) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => Ok(false),
    Err(other) => {
      error!(error = %other, "Argon2 password verification failed.");
      Err(CatalogError::Credential(format!("Password verification failed: {}", other)))
    }
  }
}
