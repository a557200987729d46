// core/src/store.rs

//! Persistence for the product list: one JSON document, rewritten in full on every save.

use crate::error::{CatalogError, CatalogResult};
use crate::models::Product;
use anyhow::anyhow;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, error, info, instrument, warn};

/// Loads and saves the complete product list.
///
/// There is no locking. Concurrent callers race and the last `save` wins.
#[async_trait]
pub trait ProductStore: Send + Sync + 'static {
  /// Returns every readable product. An absent or unparseable document yields an empty list.
  async fn load(&self) -> Vec<Product>;

  /// Returns the list a mutation will write back.
  ///
  /// Unlike `load`, a document holding records that cannot be read is an error, so the
  /// caller never rewrites the file without them.
  async fn load_for_update(&self) -> CatalogResult<Vec<Product>> {
    Ok(self.load().await)
  }

  /// Replaces the stored list with `products`.
  async fn save(&self, products: &[Product]) -> CatalogResult<()>;
}

#[derive(Debug, Default, Deserialize)]
struct RawProductDocument {
  #[serde(default)]
  productos: Vec<Value>,
}

#[derive(Debug, Serialize)]
struct ProductDocumentRef<'a> {
  productos: &'a [Product],
}

/// Records of a parsed document, split into the ones that fit `Product` and the rest.
#[derive(Debug, Default)]
struct DecodedDocument {
  products: Vec<Product>,
  rejected: Vec<String>,
}

fn decode(raw: &[u8]) -> Result<DecodedDocument, serde_json::Error> {
  let doc: RawProductDocument = serde_json::from_slice(raw)?;
  let mut decoded = DecodedDocument::default();
  for (index, record) in doc.productos.into_iter().enumerate() {
    let id = record.get("id").cloned().unwrap_or(Value::Null);
    match serde_json::from_value::<Product>(record) {
      Ok(product) => decoded.products.push(product),
      Err(e) => decoded.rejected.push(format!("record {} (id {}): {}", index, id, e)),
    }
  }
  Ok(decoded)
}

/// `ProductStore` backed by a `{ "productos": [...] }` file.
#[derive(Debug, Clone)]
pub struct JsonProductStore {
  path: PathBuf,
}

impl JsonProductStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  /// `Ok(None)` when the document does not exist yet.
  async fn read_raw(&self) -> CatalogResult<Option<Vec<u8>>> {
    match tokio::fs::read(&self.path).await {
      Ok(bytes) => Ok(Some(bytes)),
      Err(e) if e.kind() == ErrorKind::NotFound => {
        info!(path = %self.path.display(), "Product document does not exist yet; starting from an empty list.");
        Ok(None)
      }
      Err(e) => {
        error!(path = %self.path.display(), error = %e, "Failed to read product document.");
        Err(CatalogError::storage("Failed to read product document", e))
      }
    }
  }
}

#[async_trait]
impl ProductStore for JsonProductStore {
  #[instrument(name = "store::load", skip(self))]
  async fn load(&self) -> Vec<Product> {
    let raw = match self.read_raw().await {
      Ok(Some(raw)) => raw,
      Ok(None) | Err(_) => return Vec::new(),
    };

    match decode(&raw) {
      Ok(decoded) => {
        for reason in &decoded.rejected {
          warn!(path = %self.path.display(), %reason, "Skipping unreadable product record.");
        }
        debug!(count = decoded.products.len(), "Loaded products.");
        decoded.products
      }
      Err(e) => {
        error!(path = %self.path.display(), error = %e, "Product document is malformed; treating it as empty.");
        Vec::new()
      }
    }
  }

  #[instrument(name = "store::load_for_update", skip(self), err(Display))]
  async fn load_for_update(&self) -> CatalogResult<Vec<Product>> {
    let raw = match self.read_raw().await? {
      Some(raw) => raw,
      None => return Ok(Vec::new()),
    };

    match decode(&raw) {
      Ok(decoded) if decoded.rejected.is_empty() => Ok(decoded.products),
      Ok(decoded) => {
        error!(
          path = %self.path.display(),
          rejected = decoded.rejected.len(),
          "Product document has unreadable records; refusing to rewrite it."
        );
        Err(CatalogError::storage(
          "Product document has records that cannot be read",
          anyhow!(decoded.rejected.join("; ")),
        ))
      }
      // Not JSON at all: there is nothing recoverable to keep.
      Err(e) => {
        error!(path = %self.path.display(), error = %e, "Product document is malformed; treating it as empty.");
        Ok(Vec::new())
      }
    }
  }

  #[instrument(name = "store::save", skip(self, products), fields(count = products.len()), err(Display))]
  async fn save(&self, products: &[Product]) -> CatalogResult<()> {
    let body = serde_json::to_vec_pretty(&ProductDocumentRef { productos: products })
      .map_err(|e| CatalogError::storage("Failed to encode product document", e))?;

    if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
      tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| CatalogError::storage("Failed to create product document directory", e))?;
    }

    tokio::fs::write(&self.path, body).await.map_err(|e| {
      error!(path = %self.path.display(), error = %e, "Failed to write product document.");
      CatalogError::storage("Failed to write product document", e)
    })?;

    debug!("Product document saved.");
    Ok(())
  }
}
