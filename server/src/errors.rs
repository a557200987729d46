// server/src/errors.rs

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use icaro::CatalogError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Multipart Error: {0}")]
  Multipart(String),

  #[error("Catalog Error: {source}")]
  Catalog {
    #[from]
    source: CatalogError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<CatalogError>() {
      Ok(catalog_err) => AppError::Catalog { source: catalog_err },
      Err(other) => AppError::Internal(other.to_string()),
    }
  }
}

impl From<actix_web::error::BlockingError> for AppError {
  fn from(err: actix_web::error::BlockingError) -> Self {
    AppError::Internal(format!("Blocking task failed: {}", err))
  }
}

impl From<actix_multipart::MultipartError> for AppError {
  fn from(err: actix_multipart::MultipartError) -> Self {
    AppError::Multipart(err.to_string())
  }
}

impl AppError {
  /// Message shown to the caller. Server-side failures get a generic text.
  fn public_message(&self) -> String {
    match self {
      AppError::Validation(m) | AppError::Auth(m) | AppError::NotFound(m) | AppError::Conflict(m) => m.clone(),
      AppError::Multipart(_) => "Formulario multipart inválido".to_string(),
      AppError::Catalog { source } => match source {
        CatalogError::Validation(m) | CatalogError::Conflict(m) | CatalogError::NotFound(m) => m.clone(),
        CatalogError::Storage { .. } | CatalogError::Credential(_) => "Error interno del servidor".to_string(),
      },
      AppError::Config(_) | AppError::Internal(_) => "Error interno del servidor".to_string(),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) | AppError::Conflict(_) | AppError::Multipart(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Catalog { source } => match source {
        CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
        other if other.is_client_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
      },
      AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with server error");
    } else {
      tracing::warn!(application_error = %self, "Responding with client error");
    }
    HttpResponse::build(status).json(json!({ "error": self.public_message() }))
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
