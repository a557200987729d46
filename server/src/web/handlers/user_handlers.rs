// server/src/web/handlers/user_handlers.rs

use actix_web::{web, HttpResponse};
use icaro::{CatalogResult, NewUser, User, UserProfile, LOCAL_ROSTER_KEY};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::services::roster_service;
use crate::state::AppState;

// --- Request DTOs ---
#[derive(Deserialize, Debug)]
pub struct LoginRequestPayload {
  pub email: String,
  pub password: String,
}

// --- Handler Implementations ---

#[instrument(name = "handler::list_users", skip(app_state))]
pub async fn list_users_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let usuarios: Vec<UserProfile> = app_state.roster.read().all().iter().map(|u| u.profile()).collect();
  Ok(HttpResponse::Ok().json(json!({ "usuarios": usuarios })))
}

/// State of local storage: which users would be written back.
#[instrument(name = "handler::local_users", skip(app_state))]
pub async fn local_users_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let usuarios: Vec<UserProfile> = app_state
    .roster
    .read()
    .local_users()
    .iter()
    .map(|u| u.profile())
    .collect();
  Ok(HttpResponse::Ok().json(json!({
      "clave": LOCAL_ROSTER_KEY,
      "total": usuarios.len(),
      "usuarios": usuarios,
  })))
}

#[instrument(name = "handler::get_user", skip(app_state, path), fields(user_id = %path.as_str()))]
pub async fn get_user_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let profile = app_state.roster.read().find_by_id(path.as_str()).map(|u| u.profile());
  match profile {
    Some(usuario) => Ok(HttpResponse::Ok().json(json!({ "usuario": usuario }))),
    None => Err(AppError::NotFound("Usuario no encontrado".to_string())),
  }
}

#[instrument(name = "handler::register_user", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<NewUser>,
) -> Result<HttpResponse, AppError> {
  let user = roster_service::register(&app_state, req_payload.into_inner()).await?;
  Ok(HttpResponse::Created().json(json!({
      "success": true,
      "usuario": user.profile(),
      "message": "Usuario registrado exitosamente",
  })))
}

#[instrument(name = "handler::login", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<LoginRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let LoginRequestPayload { email, password } = req_payload.into_inner();
  let candidate = app_state.roster.read().login_candidate(&email);

  // Argon2 verification is slow; run it off the worker and without the roster lock.
  let matched = match candidate {
    Some(user) => {
      web::block(move || -> CatalogResult<Option<User>> {
        Ok(if user.password_matches(&password)? { Some(user) } else { None })
      })
      .await??
    }
    None => None,
  };

  match matched {
    Some(user) => {
      info!(id = %user.id, "Credentials verified.");
      Ok(HttpResponse::Ok().json(json!({ "success": true, "usuario": user.profile() })))
    }
    None => {
      warn!("Credential check failed.");
      Err(AppError::Auth("Correo o contraseña incorrectos".to_string()))
    }
  }
}

#[instrument(name = "handler::update_user", skip(app_state, path, patch), fields(user_id = %path.as_str()))]
pub async fn update_user_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  patch: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, AppError> {
  match roster_service::update(&app_state, path.as_str(), patch.into_inner()).await? {
    Some(user) => Ok(HttpResponse::Ok().json(json!({ "success": true, "usuario": user.profile() }))),
    None => Err(AppError::NotFound("Usuario no encontrado".to_string())),
  }
}

#[instrument(name = "handler::clear_local_users", skip(app_state))]
pub async fn clear_local_users_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let eliminados = roster_service::clear_local(&app_state).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "eliminados": eliminados })))
}
