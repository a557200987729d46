// core/src/models/product.rs

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A catalog entry as stored in `productos.json`.
///
/// Field names follow the stored document and the front end. `imagen` and
/// `archivo_3d` are paths relative to the static root (e.g. `Vista_previa/silla.png`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
  pub id: u32,
  pub nombre: String,
  pub categoria: String,
  pub descripcion: String,
  #[serde(deserialize_with = "string_or_number")]
  pub precio: String,
  pub imagen: String,
  pub archivo_3d: String,
  /// Fields written by other tools are carried through untouched.
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

// Older documents store `precio` as a JSON number.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  match Value::deserialize(deserializer)? {
    Value::String(s) => Ok(s),
    Value::Number(n) => Ok(n.to_string()),
    other => Err(serde::de::Error::custom(format!(
      "expected string or number for precio, found {}",
      other
    ))),
  }
}
