// core/src/catalog.rs

//! The product catalog service: validated create, delete with file cleanup, listing.
//!
//! Every operation is one load → mutate → save pass over the store. Nothing is
//! kept between calls; if `save` fails the mutated list is simply dropped.

use crate::allocator::{allocate, IdAllocation};
use crate::error::{CatalogError, CatalogResult};
use crate::models::Product;
use crate::store::ProductStore;
use crate::uploads::{UploadLayout, UploadRole, UploadedFile};
use serde::Deserialize;
use serde_json::Map;
use std::sync::Arc;
use tracing::{event, info, instrument, warn, Level};

/// Text fields of a product submission, as received from the form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProductForm {
  pub nombre: Option<String>,
  pub categoria: Option<String>,
  pub descripcion: Option<String>,
  pub precio: Option<String>,
  pub id: Option<String>,
}

impl NewProductForm {
  /// Assigns a form field by name. Unknown names are ignored.
  pub fn set_field(&mut self, name: &str, value: String) {
    let slot = match name {
      "nombre" => &mut self.nombre,
      "categoria" => &mut self.categoria,
      "descripcion" => &mut self.descripcion,
      "precio" => &mut self.precio,
      "id" => &mut self.id,
      _ => return,
    };
    *slot = Some(value);
  }
}

fn required(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub struct Catalog<S: ProductStore> {
  store: Arc<S>,
  layout: UploadLayout,
}

impl<S: ProductStore> Clone for Catalog<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      layout: self.layout.clone(),
    }
  }
}

impl<S: ProductStore> Catalog<S> {
  pub fn new(store: S, layout: UploadLayout) -> Self {
    Self {
      store: Arc::new(store),
      layout,
    }
  }

  #[instrument(name = "catalog::list", skip(self))]
  pub async fn list(&self) -> Vec<Product> {
    self.store.load().await
  }

  #[instrument(name = "catalog::get", skip(self), err(Display))]
  pub async fn get(&self, id: u32) -> CatalogResult<Product> {
    self
      .store
      .load()
      .await
      .into_iter()
      .find(|p| p.id == id)
      .ok_or_else(|| CatalogError::NotFound("Producto no encontrado".to_string()))
  }

  /// Occupied ids, the first free ids in the allocation window, and the record count.
  #[instrument(name = "catalog::available_ids", skip(self))]
  pub async fn available_ids(&self) -> IdAllocation {
    let products = self.store.load().await;
    allocate(&products)
  }

  /// Validates a submission, writes both files into their destination directories, and
  /// appends the record.
  ///
  /// If the final save fails, the files already written stay on disk.
  #[instrument(
    name = "catalog::create",
    skip(self, form, image, model),
    fields(req_id = ?form.id, nombre = ?form.nombre),
    err(Display)
  )]
  pub async fn create(
    &self,
    form: NewProductForm,
    image: Option<UploadedFile>,
    model: Option<UploadedFile>,
  ) -> CatalogResult<Product> {
    // Step 1: required text fields
    let (nombre, categoria, descripcion, precio, raw_id) = match (
      required(&form.nombre),
      required(&form.categoria),
      required(&form.descripcion),
      required(&form.precio),
      required(&form.id),
    ) {
      (Some(n), Some(c), Some(d), Some(p), Some(i)) => (n, c, d, p, i),
      _ => {
        warn!("Product submission is missing required fields.");
        return Err(CatalogError::Validation("Todos los campos son requeridos".to_string()));
      }
    };

    // Step 2: both attachments, with the right kinds
    let (image, model) = match (image, model) {
      (Some(i), Some(m)) => (i, m),
      _ => {
        warn!("Product submission is missing an attachment.");
        return Err(CatalogError::Validation(
          "Se requieren tanto la imagen como el archivo 3D".to_string(),
        ));
      }
    };
    if !image.is_image() {
      return Err(CatalogError::Validation("Solo se permiten archivos de imagen".to_string()));
    }
    if !model.has_extension(self.layout.model_extension()) {
      return Err(CatalogError::Validation(format!(
        "Solo se permiten archivos {}",
        self.layout.model_extension()
      )));
    }

    let id = match raw_id.parse::<u32>() {
      Ok(id) if id > 0 => id,
      _ => {
        return Err(CatalogError::Validation(
          "El ID debe ser un número entero positivo".to_string(),
        ))
      }
    };

    // Step 3: id uniqueness against the current document
    let mut products = self.store.load_for_update().await?;
    if products.iter().any(|p| p.id == id) {
      warn!(id, "Product id already taken.");
      return Err(CatalogError::Conflict("Ya existe un producto con ese ID".to_string()));
    }

    // Step 4: relocate attachments
    let imagen = self.layout.store(UploadRole::Image, &image).await?;
    let archivo_3d = self.layout.store(UploadRole::Model, &model).await?;
    event!(Level::DEBUG, %imagen, %archivo_3d, "Attachments relocated.");

    // Step 5: append and persist
    let product = Product {
      id,
      nombre: nombre.to_string(),
      categoria: categoria.to_string(),
      descripcion: descripcion.to_string(),
      precio: precio.to_string(),
      imagen,
      archivo_3d,
      extra: Map::new(),
    };
    products.push(product.clone());
    self.store.save(&products).await?;

    info!(id = product.id, nombre = %product.nombre, "Product added.");
    Ok(product)
  }

  /// Removes a product and, best-effort, its two files.
  #[instrument(name = "catalog::delete", skip(self), err(Display))]
  pub async fn delete(&self, id: u32) -> CatalogResult<Product> {
    let products = self.store.load_for_update().await?;
    let removed = match products.iter().find(|p| p.id == id) {
      Some(p) => p.clone(),
      None => {
        warn!(id, "Delete requested for unknown product.");
        return Err(CatalogError::NotFound("Producto no encontrado".to_string()));
      }
    };

    self.layout.remove_quietly(&removed.imagen).await;
    self.layout.remove_quietly(&removed.archivo_3d).await;

    let remaining: Vec<Product> = products.into_iter().filter(|p| p.id != id).collect();
    self.store.save(&remaining).await?;

    info!(id, nombre = %removed.nombre, "Product deleted.");
    Ok(removed)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn set_field_ignores_unknown_names() {
    let mut form = NewProductForm::default();
    form.set_field("nombre", "Silla".into());
    form.set_field("color", "rojo".into());
    assert_eq!(form.nombre.as_deref(), Some("Silla"));
    assert!(form.categoria.is_none());
  }

  #[test]
  fn blank_values_do_not_count_as_present() {
    assert_eq!(required(&Some("  ".into())), None);
    assert_eq!(required(&None), None);
    assert_eq!(required(&Some(" 7 ".into())), Some("7"));
  }
}
