// core/src/roster_store.rs

use crate::error::{CatalogError, CatalogResult};
use crate::models::User;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, error, info, instrument};

/// Name the local roster was historically kept under in browser storage.
pub const LOCAL_ROSTER_KEY: &str = "icaro3d_usuarios";

#[derive(Debug, Deserialize)]
struct BakedRosterDocument {
  usuarios: Vec<User>,
}

/// Files backing the roster: a read-only `{ "usuarios": [...] }` document and a
/// raw JSON array of locally registered users.
#[derive(Debug, Clone)]
pub struct RosterStore {
  baked_path: PathBuf,
  local_path: PathBuf,
}

impl RosterStore {
  pub fn new(baked_path: impl Into<PathBuf>, local_path: impl Into<PathBuf>) -> Self {
    Self {
      baked_path: baked_path.into(),
      local_path: local_path.into(),
    }
  }

  #[instrument(name = "roster_store::load_baked", skip(self), fields(path = %self.baked_path.display()), err(Display))]
  pub async fn load_baked(&self) -> CatalogResult<Vec<User>> {
    let raw = tokio::fs::read(&self.baked_path)
      .await
      .map_err(|e| CatalogError::storage("Failed to read baked-in roster", e))?;
    let doc: BakedRosterDocument =
      serde_json::from_slice(&raw).map_err(|e| CatalogError::storage("Baked-in roster is malformed", e))?;
    debug!(count = doc.usuarios.len(), "Baked-in roster read.");
    Ok(doc.usuarios)
  }

  #[instrument(name = "roster_store::load_local", skip(self), fields(path = %self.local_path.display()))]
  pub async fn load_local(&self) -> Vec<User> {
    let raw = match tokio::fs::read(&self.local_path).await {
      Ok(raw) => raw,
      Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
      Err(e) => {
        error!(error = %e, "Failed to read local roster.");
        return Vec::new();
      }
    };
    match serde_json::from_slice::<Vec<User>>(&raw) {
      Ok(users) => users,
      Err(e) => {
        error!(error = %e, "Local roster is malformed; ignoring it.");
        Vec::new()
      }
    }
  }

  #[instrument(name = "roster_store::save_local", skip(self, users), fields(count = users.len()), err(Display))]
  pub async fn save_local(&self, users: &[User]) -> CatalogResult<()> {
    let body = serde_json::to_vec_pretty(users).map_err(|e| CatalogError::storage("Failed to encode local roster", e))?;
    if let Some(parent) = self.local_path.parent().filter(|p| !p.as_os_str().is_empty()) {
      tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| CatalogError::storage("Failed to create local roster directory", e))?;
    }
    tokio::fs::write(&self.local_path, body)
      .await
      .map_err(|e| CatalogError::storage("Failed to write local roster", e))
  }

  #[instrument(name = "roster_store::clear_local", skip(self), err(Display))]
  pub async fn clear_local(&self) -> CatalogResult<()> {
    match tokio::fs::remove_file(&self.local_path).await {
      Ok(()) => {
        info!("Local roster erased.");
        Ok(())
      }
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
      Err(e) => Err(CatalogError::storage("Failed to erase local roster", e)),
    }
  }

  /// Reads both documents and merges them. A missing or broken baked-in
  /// document falls back to the local users alone.
  pub async fn load_roster(&self) -> crate::roster::UserRoster {
    let baked = self.load_baked().await.ok();
    let local = self.load_local().await;
    crate::roster::UserRoster::merge(baked, local)
  }
}
