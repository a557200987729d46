// core/src/uploads.rs

//! Where uploaded product files land, and how they are written and removed.

use crate::error::{CatalogError, CatalogResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// A file received with a product submission, fully buffered.
#[derive(Debug, Clone)]
pub struct UploadedFile {
  /// Filename as sent by the client.
  pub original_name: String,
  /// Declared media type, e.g. `image/png`.
  pub content_type: Option<String>,
  pub bytes: Vec<u8>,
}

impl UploadedFile {
  pub fn new(original_name: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
    Self {
      original_name: original_name.into(),
      content_type,
      bytes,
    }
  }

  pub fn is_image(&self) -> bool {
    self
      .content_type
      .as_deref()
      .map(|ct| ct.trim().to_ascii_lowercase().starts_with("image/"))
      .unwrap_or(false)
  }

  pub fn has_extension(&self, extension: &str) -> bool {
    let name = self.original_name.to_ascii_lowercase();
    name.ends_with(&extension.to_ascii_lowercase())
  }

  /// The last path component of the client filename.
  pub fn file_name(&self) -> Option<&str> {
    Path::new(&self.original_name)
      .file_name()
      .and_then(|n| n.to_str())
      .filter(|n| !n.is_empty())
  }
}

/// Role of an uploaded file, which decides its destination directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadRole {
  Image,
  Model,
}

impl UploadRole {
  /// Multipart field name carrying a file of this role.
  pub fn field_name(self) -> &'static str {
    match self {
      UploadRole::Image => "imagen",
      UploadRole::Model => "archivo_3d",
    }
  }

  pub fn from_field_name(name: &str) -> Option<Self> {
    match name {
      "imagen" => Some(UploadRole::Image),
      "archivo_3d" => Some(UploadRole::Model),
      _ => None,
    }
  }
}

/// Destination directories for uploads, relative to a static root that is also served over HTTP.
#[derive(Debug, Clone)]
pub struct UploadLayout {
  root: PathBuf,
  image_dir: String,
  model_dir: String,
  model_extension: String,
}

impl UploadLayout {
  pub const DEFAULT_IMAGE_DIR: &'static str = "Vista_previa";
  pub const DEFAULT_MODEL_DIR: &'static str = "Modelos";
  pub const DEFAULT_MODEL_EXTENSION: &'static str = ".glb";

  pub fn new(
    root: impl Into<PathBuf>,
    image_dir: impl Into<String>,
    model_dir: impl Into<String>,
    model_extension: impl Into<String>,
  ) -> Self {
    Self {
      root: root.into(),
      image_dir: trim_slashes(image_dir.into()),
      model_dir: trim_slashes(model_dir.into()),
      model_extension: model_extension.into(),
    }
  }

  pub fn with_defaults(root: impl Into<PathBuf>) -> Self {
    Self::new(
      root,
      Self::DEFAULT_IMAGE_DIR,
      Self::DEFAULT_MODEL_DIR,
      Self::DEFAULT_MODEL_EXTENSION,
    )
  }

  pub fn model_extension(&self) -> &str {
    &self.model_extension
  }

  pub fn dir_for(&self, role: UploadRole) -> &str {
    match role {
      UploadRole::Image => &self.image_dir,
      UploadRole::Model => &self.model_dir,
    }
  }

  /// Path stored in the product record, e.g. `Modelos/silla.glb`.
  pub fn record_path(&self, role: UploadRole, file_name: &str) -> String {
    format!("{}/{}", self.dir_for(role), file_name)
  }

  /// Resolves a stored record path to a location on disk.
  pub fn resolve(&self, record_path: &str) -> PathBuf {
    self.root.join(record_path.trim_start_matches('/'))
  }

  /// Writes `file` into the destination directory for `role` and returns the record path.
  ///
  /// Same-named files are overwritten.
  #[instrument(name = "uploads::store", skip(self, file), fields(role = ?role, name = %file.original_name, size = file.bytes.len()), err(Display))]
  pub async fn store(&self, role: UploadRole, file: &UploadedFile) -> CatalogResult<String> {
    let file_name = file
      .file_name()
      .ok_or_else(|| CatalogError::Validation(format!("Nombre de archivo inválido para '{}'", role.field_name())))?;

    let dir = self.root.join(self.dir_for(role));
    tokio::fs::create_dir_all(&dir)
      .await
      .map_err(|e| CatalogError::storage(format!("Failed to create upload directory {}", dir.display()), e))?;

    let destination = dir.join(file_name);
    tokio::fs::write(&destination, &file.bytes)
      .await
      .map_err(|e| CatalogError::storage(format!("Failed to write upload {}", destination.display()), e))?;

    debug!(destination = %destination.display(), "Upload written.");
    Ok(self.record_path(role, file_name))
  }

  /// Deletes the file behind a record path. Never fails: problems are logged.
  ///
  /// Returns true when a file was actually removed.
  #[instrument(name = "uploads::remove_quietly", skip(self))]
  pub async fn remove_quietly(&self, record_path: &str) -> bool {
    if record_path.trim().is_empty() {
      return false;
    }
    let path = self.resolve(record_path);
    match tokio::fs::remove_file(&path).await {
      Ok(()) => {
        info!(path = %path.display(), "Removed product file.");
        true
      }
      Err(e) if e.kind() == ErrorKind::NotFound => {
        debug!(path = %path.display(), "Product file already gone.");
        false
      }
      Err(e) => {
        warn!(path = %path.display(), error = %e, "Could not remove product file; continuing.");
        false
      }
    }
  }
}

fn trim_slashes(dir: String) -> String {
  dir.trim_matches('/').to_string()
}
