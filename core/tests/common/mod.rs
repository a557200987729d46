// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use async_trait::async_trait;
use icaro::{
  Catalog, CatalogError, CatalogResult, JsonProductStore, NewProductForm, Product, ProductStore, UploadLayout,
  UploadedFile,
};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::Level;

// --- Tracing Setup (call once per test run) ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Sandboxed catalog on disk ---
pub struct Sandbox {
  pub dir: TempDir,
  pub catalog: Catalog<JsonProductStore>,
}

impl Sandbox {
  pub fn new() -> Self {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = JsonProductStore::new(dir.path().join("Data").join("productos.json"));
    let catalog = Catalog::new(store, UploadLayout::with_defaults(dir.path()));
    Sandbox { dir, catalog }
  }

  pub fn root(&self) -> &Path {
    self.dir.path()
  }

  pub fn products_file(&self) -> std::path::PathBuf {
    self.dir.path().join("Data").join("productos.json")
  }
}

pub fn form(id: &str, nombre: &str) -> NewProductForm {
  NewProductForm {
    nombre: Some(nombre.to_string()),
    categoria: Some("Muebles".to_string()),
    descripcion: Some(format!("{} de prueba", nombre)),
    precio: Some("99.90".to_string()),
    id: Some(id.to_string()),
  }
}

pub fn png(name: &str) -> UploadedFile {
  UploadedFile::new(name, Some("image/png".to_string()), b"\x89PNG fake".to_vec())
}

pub fn glb(name: &str) -> UploadedFile {
  UploadedFile::new(name, Some("model/gltf-binary".to_string()), b"glTF fake".to_vec())
}

/// Creates a product with attachments named after its id.
pub async fn seed<S: ProductStore>(catalog: &Catalog<S>, id: u32) -> Product {
  catalog
    .create(
      form(&id.to_string(), &format!("Producto {}", id)),
      Some(png(&format!("p{}.png", id))),
      Some(glb(&format!("p{}.glb", id))),
    )
    .await
    .expect("seed product")
}

// --- In-memory store whose saves can be made to fail ---
#[derive(Default, Clone)]
pub struct FlakyStore {
  pub products: Arc<Mutex<Vec<Product>>>,
  pub fail_saves: Arc<AtomicBool>,
}

impl FlakyStore {
  pub fn failing(&self, fail: bool) {
    self.fail_saves.store(fail, Ordering::SeqCst);
  }

  pub fn snapshot(&self) -> Vec<Product> {
    self.products.lock().clone()
  }
}

#[async_trait]
impl ProductStore for FlakyStore {
  async fn load(&self) -> Vec<Product> {
    self.products.lock().clone()
  }

  async fn save(&self, products: &[Product]) -> CatalogResult<()> {
    if self.fail_saves.load(Ordering::SeqCst) {
      return Err(CatalogError::storage(
        "Simulated write failure",
        anyhow::anyhow!("disk full"),
      ));
    }
    *self.products.lock() = products.to_vec();
    Ok(())
  }
}
