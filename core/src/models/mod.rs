// core/src/models/mod.rs

//! Data structures persisted in the catalog and roster documents.

pub mod product;
pub mod user;

pub use product::Product;
pub use user::{NewUser, Provenance, User, UserId, UserProfile};
