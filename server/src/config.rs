// server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Text,
  Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,

  /// Directory served over HTTP; uploads and data files resolve against it.
  pub static_root: PathBuf,
  pub products_file: PathBuf,
  pub users_file: PathBuf,
  pub local_users_file: PathBuf,

  pub image_dir: String,
  pub model_dir: String,
  pub model_extension: String,

  pub log_format: LogFormat,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from an arbitrary variable source.
  pub fn from_lookup<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get_or = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

    let server_host = get_or("SERVER_HOST", "127.0.0.1");
    let server_port = get_or("SERVER_PORT", "3000")
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;

    let static_root = PathBuf::from(get_or("STATIC_ROOT", "."));
    let products_file = resolve(&static_root, get_or("PRODUCTS_FILE", "Data/productos.json"));
    let users_file = resolve(&static_root, get_or("USERS_FILE", "Data/usuarios.json"));
    let local_users_file = resolve(&static_root, get_or("LOCAL_USERS_FILE", "Data/usuarios_locales.json"));

    let image_dir = get_or("IMAGE_DIR", icaro::UploadLayout::DEFAULT_IMAGE_DIR);
    let model_dir = get_or("MODEL_DIR", icaro::UploadLayout::DEFAULT_MODEL_DIR);
    let model_extension = get_or("MODEL_EXTENSION", icaro::UploadLayout::DEFAULT_MODEL_EXTENSION);
    if !model_extension.starts_with('.') || model_extension.len() < 2 {
      return Err(AppError::Config(format!(
        "Invalid MODEL_EXTENSION '{}': expected something like '.glb'",
        model_extension
      )));
    }

    let log_format = match get_or("LOG_FORMAT", "text").to_ascii_lowercase().as_str() {
      "text" => LogFormat::Text,
      "json" => LogFormat::Json,
      other => return Err(AppError::Config(format!("Invalid LOG_FORMAT value: {}", other))),
    };

    Ok(Self {
      server_host,
      server_port,
      static_root,
      products_file,
      users_file,
      local_users_file,
      image_dir,
      model_dir,
      model_extension,
      log_format,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }

  pub fn upload_layout(&self) -> icaro::UploadLayout {
    icaro::UploadLayout::new(
      self.static_root.clone(),
      self.image_dir.clone(),
      self.model_dir.clone(),
      self.model_extension.clone(),
    )
  }
}

fn resolve(root: &Path, value: String) -> PathBuf {
  let path = PathBuf::from(value);
  if path.is_absolute() {
    path
  } else {
    root.join(path)
  }
}
