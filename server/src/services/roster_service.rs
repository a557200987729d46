// server/src/services/roster_service.rs

//! Roster mutations paired with their persistence.
//!
//! Each call hashes on the blocking pool first, mutates the shared roster under its
//! lock, releases the lock, then writes the local users. A failed write puts the
//! in-memory roster back.

use crate::errors::AppError;
use crate::state::AppState;
use actix_web::web;
use icaro::{NewUser, Registration, User, UserPatch};
use serde_json::{Map, Value};
use tracing::{error, info, instrument};

#[instrument(name = "roster_service::register", skip(state, new_user), fields(email = %new_user.email), err(Display))]
pub async fn register(state: &AppState, new_user: NewUser) -> Result<User, AppError> {
  let registration = web::block(move || Registration::prepare(new_user)).await??;
  let (result, local) = state.roster.mutate(|roster| roster.register(registration));
  let user = result?;

  if let Err(e) = state.roster_store.save_local(&local).await {
    error!(error = %e, "Persisting the new user failed; undoing registration.");
    state.roster.write().remove_local(&user.id.to_string());
    return Err(e.into());
  }

  info!(id = %user.id, "User registered and persisted.");
  Ok(user)
}

#[instrument(name = "roster_service::update", skip(state, patch), err(Display))]
pub async fn update(state: &AppState, raw_id: &str, patch: Map<String, Value>) -> Result<Option<User>, AppError> {
  let previous = state.roster.read().find_by_id(raw_id).cloned();
  let previous = match previous {
    Some(p) => p,
    None => return Ok(None),
  };

  let patch = web::block(move || UserPatch::prepare(patch)).await??;
  let (result, local) = state.roster.mutate(|roster| roster.update(raw_id, patch));
  let updated = match result? {
    Some(u) => u,
    None => return Ok(None),
  };

  // Baked-in users are never written back, so there is nothing to persist for them.
  if updated.is_local() {
    if let Err(e) = state.roster_store.save_local(&local).await {
      error!(error = %e, "Persisting the user update failed; restoring previous version.");
      state.roster.write().restore(previous);
      return Err(e.into());
    }
  }
  Ok(Some(updated))
}

#[instrument(name = "roster_service::clear_local", skip(state), err(Display))]
pub async fn clear_local(state: &AppState) -> Result<usize, AppError> {
  state.roster_store.clear_local().await?;
  let removed = state.roster.write().clear_local();
  Ok(removed)
}
