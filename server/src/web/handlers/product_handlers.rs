// server/src/web/handlers/product_handlers.rs

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::TryStreamExt;
use icaro::{NewProductForm, UploadRole, UploadedFile};
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::errors::AppError;
use crate::state::AppState;

/// A decoded product submission: text fields plus at most one file per role.
#[derive(Debug, Default)]
pub struct ProductSubmission {
  pub form: NewProductForm,
  pub image: Option<UploadedFile>,
  pub model: Option<UploadedFile>,
}

/// Reads the whole multipart body into memory.
///
/// Files arrive under `imagen` and `archivo_3d`; any other file field is dropped.
/// Only the first file per role is kept. An empty file input (`filename=""`) counts
/// as no file at all.
pub async fn read_submission(mut payload: Multipart) -> Result<ProductSubmission, AppError> {
  let mut submission = ProductSubmission::default();

  while let Some(mut field) = payload.try_next().await? {
    let disposition = field.content_disposition();
    let name = disposition.get_name().unwrap_or_default().to_string();
    let filename = disposition.get_filename().map(str::to_string);
    let content_type = field.content_type().map(|mime| mime.to_string());

    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await? {
      bytes.extend_from_slice(&chunk);
    }

    match filename {
      Some(filename) if filename.is_empty() => {
        debug!(field = %name, "Empty file input; treating it as absent.");
      }
      Some(filename) => {
        let slot = match UploadRole::from_field_name(&name) {
          Some(UploadRole::Image) => &mut submission.image,
          Some(UploadRole::Model) => &mut submission.model,
          None => {
            debug!(field = %name, "Ignoring unexpected file field.");
            continue;
          }
        };
        if slot.is_none() {
          *slot = Some(UploadedFile::new(filename, content_type, bytes));
        }
      }
      None => {
        let value = String::from_utf8(bytes)
          .map_err(|_| AppError::Validation(format!("El campo '{}' no es texto válido", name)))?;
        submission.form.set_field(&name, value);
      }
    }
  }

  Ok(submission)
}

fn parse_path_id(raw: &str) -> Result<u32, AppError> {
  raw.trim().parse::<u32>().map_err(|_| {
    warn!(raw_id = %raw, "Non-numeric product id in path.");
    AppError::NotFound("Producto no encontrado".to_string())
  })
}

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let productos = app_state.catalog.list().await;
  info!("Listing {} products.", productos.len());
  Ok(HttpResponse::Ok().json(json!({ "productos": productos })))
}

#[instrument(name = "handler::available_ids", skip(app_state))]
pub async fn available_ids_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let allocation = app_state.catalog.available_ids().await;
  Ok(HttpResponse::Ok().json(allocation))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_str()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let id = parse_path_id(&path.into_inner())?;
  let producto = app_state.catalog.get(id).await?;
  Ok(HttpResponse::Ok().json(json!({ "producto": producto })))
}

#[instrument(name = "handler::create_product", skip(app_state, payload))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  payload: Multipart,
) -> Result<HttpResponse, AppError> {
  let submission = read_submission(payload).await?;
  let producto = app_state
    .catalog
    .create(submission.form, submission.image, submission.model)
    .await?;

  info!(id = producto.id, "Product created.");
  Ok(HttpResponse::Created().json(json!({
      "success": true,
      "producto": producto,
      "message": "Producto agregado exitosamente",
  })))
}

#[instrument(name = "handler::delete_product", skip(app_state, path), fields(product_id = %path.as_str()))]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let id = parse_path_id(&path.into_inner())?;
  let producto = app_state.catalog.delete(id).await?;

  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "producto": producto,
      "message": "Producto eliminado exitosamente",
  })))
}
