// core/src/models/user.rs

use crate::credentials;
use crate::error::CatalogResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;
use uuid::Uuid;

/// User identifier.
///
/// Registrations made by this crate use UUID v4 text ids. Existing roster
/// documents carry numeric ids (including fractional ones), so both shapes are
/// accepted and compared by their textual form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
  Numeric(Number),
  Text(String),
}

impl UserId {
  pub fn generate() -> Self {
    UserId::Text(Uuid::new_v4().to_string())
  }

  /// Loose comparison against a path segment or other raw id.
  pub fn matches(&self, raw: &str) -> bool {
    self.to_string() == raw.trim()
  }
}

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      UserId::Numeric(n) => write!(f, "{}", n),
      UserId::Text(s) => f.write_str(s),
    }
  }
}

/// Where a roster entry came from. Only `Local` entries are ever written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
  #[default]
  BakedIn,
  Local,
}

fn default_active() -> bool {
  true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub id: UserId,
  pub email: String,
  /// Argon2 PHC string for registered users; legacy baked-in entries may hold plaintext.
  pub password: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub fecha_registro: Option<String>,
  #[serde(default = "default_active")]
  pub activo: bool,
  /// Profile fields (`nombre`, `telefono`, ...) kept as free-form JSON.
  #[serde(flatten)]
  pub extra: Map<String, Value>,
  #[serde(skip)]
  pub provenance: Provenance,
}

impl User {
  pub fn is_local(&self) -> bool {
    self.provenance == Provenance::Local
  }

  /// Checks a login attempt against the stored credential. Slow for hashed entries.
  pub fn password_matches(&self, provided: &str) -> CatalogResult<bool> {
    credentials::verify_password(&self.password, provided)
  }

  pub fn profile(&self) -> UserProfile {
    UserProfile {
      id: self.id.clone(),
      email: self.email.clone(),
      fecha_registro: self.fecha_registro.clone(),
      activo: self.activo,
      origen: self.provenance,
      extra: self.extra.clone(),
    }
  }
}

/// Outward-facing view of a user: everything except the credential.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
  pub id: UserId,
  pub email: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub fecha_registro: Option<String>,
  pub activo: bool,
  pub origen: Provenance,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

/// Registration payload. Anything beyond email and password is stored as profile data.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
  pub email: String,
  pub password: String,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}
