// server/src/web/handlers/mod.rs

pub mod product_handlers;
pub mod user_handlers;
