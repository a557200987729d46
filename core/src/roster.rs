// core/src/roster.rs

//! The merged user roster: baked-in users plus locally registered ones.
//!
//! `UserRoster` is plain in-memory state. It never touches storage itself; after a
//! mutation the caller persists `local_users()` through a `RosterStore`.

use crate::credentials;
use crate::error::{CatalogError, CatalogResult};
use crate::models::{NewUser, Provenance, User, UserId};
use chrono::Utc;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

// Keys the roster owns; clients cannot smuggle them in through profile data.
const RESERVED_KEYS: [&str; 5] = ["id", "email", "password", "fecha_registro", "activo"];

#[derive(Debug, Clone, Default)]
pub struct UserRoster {
  users: Vec<User>,
}

impl UserRoster {
  /// Builds the effective roster.
  ///
  /// `baked` is `None` when the baked-in roster could not be fetched; the local
  /// roster is then used alone. On an email collision the baked-in entry wins.
  #[instrument(name = "roster::merge", skip_all, fields(baked = baked.as_ref().map(Vec::len), local = local.len()))]
  pub fn merge(baked: Option<Vec<User>>, local: Vec<User>) -> Self {
    let mut roster = UserRoster::default();
    match baked {
      Some(baked) => {
        for mut user in baked {
          user.provenance = Provenance::BakedIn;
          if roster.find_by_email(&user.email).is_none() {
            roster.users.push(user);
          }
        }
      }
      None => warn!("Baked-in roster unavailable; using local users only."),
    }
    roster.absorb_local(local);
    info!(total = roster.users.len(), "User roster loaded.");
    roster
  }

  /// Adds local users whose email is not present yet. Safe to repeat with the same list.
  pub fn absorb_local(&mut self, local: Vec<User>) -> usize {
    let mut seen: HashSet<String> = self.users.iter().map(|u| u.email.clone()).collect();
    let mut added = 0;
    for mut user in local {
      if seen.insert(user.email.clone()) {
        user.provenance = Provenance::Local;
        self.users.push(user);
        added += 1;
      } else {
        debug!(email = %user.email, "Skipping local user shadowed by an existing email.");
      }
    }
    added
  }

  pub fn all(&self) -> &[User] {
    &self.users
  }

  pub fn len(&self) -> usize {
    self.users.len()
  }

  pub fn is_empty(&self) -> bool {
    self.users.is_empty()
  }

  pub fn find_by_email(&self, email: &str) -> Option<&User> {
    self.users.iter().find(|u| u.email == email)
  }

  pub fn find_by_id(&self, raw_id: &str) -> Option<&User> {
    self.users.iter().find(|u| u.id.matches(raw_id))
  }

  /// Users that belong in local storage.
  pub fn local_users(&self) -> Vec<User> {
    self.users.iter().filter(|u| u.is_local()).cloned().collect()
  }

  /// Adds a prepared registration, unless its email is already taken.
  #[instrument(name = "roster::register", skip(self, registration), fields(email = %registration.0.email), err(Display))]
  pub fn register(&mut self, registration: Registration) -> CatalogResult<User> {
    let user = registration.0;
    if self.find_by_email(&user.email).is_some() {
      warn!("Registration attempted with an existing email.");
      return Err(CatalogError::Conflict(
        "Este correo electrónico ya está registrado".to_string(),
      ));
    }
    self.users.push(user.clone());

    info!(id = %user.id, "User registered.");
    Ok(user)
  }

  /// Active user with this email, cloned so the password check can run without a lock held.
  pub fn login_candidate(&self, email: &str) -> Option<User> {
    self.find_by_email(email.trim()).filter(|u| u.activo).cloned()
  }

  /// Shallow-merges `patch` onto the user with id `raw_id`.
  ///
  /// Provenance never changes, so a patched baked-in user stays out of local storage.
  #[instrument(name = "roster::update", skip(self, patch), err(Display))]
  pub fn update(&mut self, raw_id: &str, patch: UserPatch) -> CatalogResult<Option<User>> {
    let idx = match self.users.iter().position(|u| u.id.matches(raw_id)) {
      Some(idx) => idx,
      None => return Ok(None),
    };
    let current = &self.users[idx];

    if let Some(new_email) = patch.fields.get("email").and_then(Value::as_str) {
      let taken = self
        .users
        .iter()
        .enumerate()
        .any(|(i, u)| i != idx && u.email == new_email);
      if taken {
        return Err(CatalogError::Conflict(
          "Este correo electrónico ya está registrado".to_string(),
        ));
      }
    }

    let mut merged = match serde_json::to_value(current) {
      Ok(Value::Object(map)) => map,
      Ok(_) => return Err(CatalogError::Validation("Usuario con formato inesperado".to_string())),
      Err(e) => return Err(CatalogError::storage("Failed to encode user for update", e)),
    };
    merged.extend(patch.fields);

    let mut updated: User = serde_json::from_value(Value::Object(merged))
      .map_err(|e| CatalogError::Validation(format!("Datos de usuario inválidos: {}", e)))?;
    updated.provenance = current.provenance;

    self.users[idx] = updated.clone();
    debug!(id = %updated.id, "User updated.");
    Ok(Some(updated))
  }

  /// Removes one locally registered user. Baked-in users cannot be removed.
  pub fn remove_local(&mut self, raw_id: &str) -> Option<User> {
    let idx = self.users.iter().position(|u| u.is_local() && u.id.matches(raw_id))?;
    Some(self.users.remove(idx))
  }

  /// Puts back a previous version of a user, matched by id.
  pub fn restore(&mut self, previous: User) {
    let raw_id = previous.id.to_string();
    match self.users.iter_mut().find(|u| u.id.matches(&raw_id)) {
      Some(slot) => *slot = previous,
      None => self.users.push(previous),
    }
  }

  /// Drops every locally registered user and returns how many were removed.
  #[instrument(name = "roster::clear_local", skip(self))]
  pub fn clear_local(&mut self) -> usize {
    let before = self.users.len();
    self.users.retain(|u| !u.is_local());
    let removed = before - self.users.len();
    info!(removed, "Local users cleared.");
    removed
  }
}

/// A validated sign-up with its id, date and password hash already assigned.
///
/// Hashing is slow, so this is built before the roster lock is taken.
#[derive(Debug, Clone)]
pub struct Registration(User);

impl Registration {
  #[instrument(name = "roster::prepare_registration", skip(new_user), fields(email = %new_user.email), err(Display))]
  pub fn prepare(new_user: NewUser) -> CatalogResult<Self> {
    let email = new_user.email.trim().to_string();
    if email.is_empty() || new_user.password.is_empty() {
      return Err(CatalogError::Validation(
        "El correo y la contraseña son requeridos".to_string(),
      ));
    }

    let mut extra = new_user.extra;
    for key in RESERVED_KEYS {
      extra.remove(key);
    }

    Ok(Registration(User {
      id: UserId::generate(),
      email,
      password: credentials::hash_password(&new_user.password)?,
      fecha_registro: Some(Utc::now().format("%Y-%m-%d").to_string()),
      activo: true,
      extra,
      provenance: Provenance::Local,
    }))
  }
}

/// Profile changes, validated and with any new password hashed.
///
/// `id` is dropped. A patched `email` is trimmed and must not be blank.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
  fields: Map<String, Value>,
}

impl UserPatch {
  #[instrument(name = "roster::prepare_patch", skip(raw), err(Display))]
  pub fn prepare(raw: Map<String, Value>) -> CatalogResult<Self> {
    let mut fields = Map::new();
    for (key, value) in raw {
      let value = match key.as_str() {
        "id" => continue,
        "email" => {
          let email = value
            .as_str()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| CatalogError::Validation("El correo electrónico es requerido".to_string()))?;
          Value::String(email.to_string())
        }
        "password" => {
          let plain = value
            .as_str()
            .ok_or_else(|| CatalogError::Validation("La contraseña debe ser texto".to_string()))?;
          Value::String(credentials::hash_password(plain)?)
        }
        _ => value,
      };
      fields.insert(key, value);
    }
    Ok(UserPatch { fields })
  }
}

/// Shared ownership of the roster for request handlers.
///
/// Lock guards are blocking and MUST NOT be held across `.await` points: take what
/// you need, drop the guard, then do I/O.
#[derive(Debug, Clone, Default)]
pub struct SharedRoster(Arc<RwLock<UserRoster>>);

impl SharedRoster {
  pub fn new(roster: UserRoster) -> Self {
    SharedRoster(Arc::new(RwLock::new(roster)))
  }

  pub fn read(&self) -> RwLockReadGuard<'_, UserRoster> {
    self.0.read()
  }

  pub fn write(&self) -> RwLockWriteGuard<'_, UserRoster> {
    self.0.write()
  }

  /// Runs `f` under the write lock and returns its result with a snapshot of the local users.
  pub fn mutate<R>(&self, f: impl FnOnce(&mut UserRoster) -> R) -> (R, Vec<User>) {
    let mut guard = self.0.write();
    let result = f(&mut guard);
    let local = guard.local_users();
    (result, local)
  }
}
