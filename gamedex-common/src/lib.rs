//! # GameDex Common Library
//!
//! Shared code for the GameDex catalog service including:
//! - Database models and queries (catalog, reviews, seeding)
//! - Catalog change events (CatalogEvent enum + EventBus)
//! - Error types
//! - Configuration loading

pub mod config;
pub mod db;
pub mod error;
pub mod events;

pub use error::{Error, Result};
