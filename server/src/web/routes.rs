// server/src/web/routes.rs

use actix_files::Files;
use actix_web::web;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::web::handlers::{product_handlers, user_handlers};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Called in `main.rs` (and tests) to configure the API services on the Actix App.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/health", web::get().to(health_check_handler))
    .service(
      web::scope("/api")
        .service(
          web::scope("/productos")
            .route("", web::get().to(product_handlers::list_products_handler))
            .route("", web::post().to(product_handlers::create_product_handler))
            // Registered before "/{id}" so it is not captured as an id.
            .route("/ids-disponibles", web::get().to(product_handlers::available_ids_handler))
            .route("/{id}", web::get().to(product_handlers::get_product_handler))
            .route("/{id}", web::delete().to(product_handlers::delete_product_handler)),
        )
        .service(
          web::scope("/usuarios")
            .route("", web::get().to(user_handlers::list_users_handler))
            .route("/registro", web::post().to(user_handlers::register_handler))
            .route("/login", web::post().to(user_handlers::login_handler))
            .route("/locales", web::get().to(user_handlers::local_users_handler))
            .route("/locales", web::delete().to(user_handlers::clear_local_users_handler))
            .route("/{id}", web::get().to(user_handlers::get_user_handler))
            .route("/{id}", web::patch().to(user_handlers::update_user_handler)),
        ),
    );
}

/// Static front end and uploaded assets, served from the static root.
///
/// Must be registered after the API scopes. The roster documents are never served.
pub fn static_files(config: &AppConfig) -> Files {
  let hidden: Vec<PathBuf> = [&config.users_file, &config.local_users_file]
    .into_iter()
    .filter_map(|file| relative_to(&config.static_root, file))
    .collect();

  Files::new("/", &config.static_root)
    .index_file("index.html")
    .path_filter(move |path, _head| !hidden.iter().any(|h| h == path))
}

fn relative_to(root: &Path, file: &Path) -> Option<PathBuf> {
  let root = root.components().filter(|c| !matches!(c, std::path::Component::CurDir)).collect::<PathBuf>();
  let file = file.components().filter(|c| !matches!(c, std::path::Component::CurDir)).collect::<PathBuf>();
  file.strip_prefix(&root).ok().map(Path::to_path_buf)
}
