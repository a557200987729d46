// server/src/main.rs

mod config;
mod errors;
mod services;
mod state;
mod web;

use crate::config::{AppConfig, LogFormat};
use crate::state::AppState;

use actix_cors::Cors;
use actix_web::{web as actix_data, App, HttpServer};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing

fn init_tracing(format: LogFormat) {
  let builder = tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE); // Log when spans close, showing duration

  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Text => builder.init(),
  }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      // Tracing is configured from the config, so report this one directly.
      eprintln!("Configuration error: {}", e);
      std::process::exit(1);
    }
  };
  init_tracing(app_config.log_format);

  tracing::info!("Starting ICARO 3D catalog server...");

  let app_state = AppState::build(app_config.clone()).await;
  tracing::info!(
    users = app_state.roster.read().len(),
    products_file = %app_config.products_file.display(),
    "Application state ready."
  );

  let server_address = app_config.bind_address();
  tracing::info!("Attempting to bind server to {}...", server_address);
  tracing::info!(
    "API: GET /api/productos, POST /api/productos, DELETE /api/productos/{{id}}, GET /api/productos/ids-disponibles"
  );
  tracing::info!("Static files served from {}", app_config.static_root.display());

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone())) // Share AppState with handlers
      .wrap(Cors::permissive())
      .wrap(tracing_actix_web::TracingLogger::default()) // Actix middleware for tracing requests
      .configure(web::configure_app_routes)
      .service(web::static_files(&app_state.config))
  })
  .bind(&server_address)?
  .run()
  .await
}
