// core/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
  /// Missing or malformed required input, or a rejected upload type.
  #[error("Validation error: {0}")]
  Validation(String),

  /// Duplicate product id or duplicate email.
  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Not found: {0}")]
  NotFound(String),

  /// Read or write failure on a backing document or upload directory.
  #[error("Storage error: {message}. Source: {source}")]
  Storage {
    message: String,
    #[source]
    source: AnyhowError,
  },

  #[error("Credential error: {0}")]
  Credential(String),
}

impl CatalogError {
  pub fn storage<E>(message: impl Into<String>, source: E) -> Self
  where
    E: Into<AnyhowError>,
  {
    CatalogError::Storage {
      message: message.into(),
      source: source.into(),
    }
  }

  /// True for failures that the caller caused (bad input, duplicates, unknown ids).
  pub fn is_client_error(&self) -> bool {
    matches!(
      self,
      CatalogError::Validation(_) | CatalogError::Conflict(_) | CatalogError::NotFound(_)
    )
  }
}

pub type CatalogResult<T, E = CatalogError> = std::result::Result<T, E>;
