// core/src/lib.rs

//! Icaro: catalog and roster domain logic for the ICARO 3D storefront.
//!
//! The crate covers the parts of the storefront backend that carry invariants:
//!  - A JSON-backed product record store (`store`).
//!  - Identifier allocation over the fixed 1..=100 window (`allocator`).
//!  - The product catalog service: validation, id uniqueness, upload relocation (`catalog`).
//!  - The user roster: merging the baked-in list with locally registered users (`roster`).
//!
//! HTTP routing lives in the `icaro_server` crate; nothing here knows about requests.

pub mod allocator;
pub mod catalog;
pub mod credentials;
pub mod error;
pub mod models;
pub mod roster;
pub mod roster_store;
pub mod store;
pub mod uploads;

// --- Re-exports for the Public API ---

pub use crate::allocator::{allocate, IdAllocation, ID_RANGE, MAX_SUGGESTED_IDS};
pub use crate::catalog::{Catalog, NewProductForm};
pub use crate::error::{CatalogError, CatalogResult};
pub use crate::models::{NewUser, Product, Provenance, User, UserId, UserProfile};
pub use crate::roster::{Registration, SharedRoster, UserPatch, UserRoster};
pub use crate::roster_store::{RosterStore, LOCAL_ROSTER_KEY};
pub use crate::store::{JsonProductStore, ProductStore};
pub use crate::uploads::{UploadLayout, UploadRole, UploadedFile};

/*
    Typical request flow:
    1. Build a `Catalog` from a `JsonProductStore` and an `UploadLayout` once at startup.
    2. Per request, call `catalog.list()`, `catalog.available_ids()`, `catalog.create(..)`
       or `catalog.delete(id)`. Each call loads the document, mutates, and saves.
    3. For users, load a `UserRoster` via `RosterStore` at startup and wrap it in a
       `SharedRoster`. After each mutation, persist `roster.local_users()` explicitly.
*/
