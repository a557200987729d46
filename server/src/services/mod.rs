// server/src/services/mod.rs

pub mod roster_service;
