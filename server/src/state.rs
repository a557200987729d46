// server/src/state.rs
use crate::config::AppConfig;
use icaro::{Catalog, JsonProductStore, RosterStore, SharedRoster};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub catalog: Catalog<JsonProductStore>,
  pub roster: SharedRoster,
  pub roster_store: RosterStore,
  pub config: Arc<AppConfig>, // Share loaded config
}

impl AppState {
  /// Wires the catalog and loads the user roster from disk.
  pub async fn build(config: Arc<AppConfig>) -> Self {
    let catalog = Catalog::new(JsonProductStore::new(&config.products_file), config.upload_layout());
    let roster_store = RosterStore::new(&config.users_file, &config.local_users_file);
    let roster = SharedRoster::new(roster_store.load_roster().await);

    AppState {
      catalog,
      roster,
      roster_store,
      config,
    }
  }
}
