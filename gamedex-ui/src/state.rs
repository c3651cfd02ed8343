//! Shared application state

use gamedex_common::events::EventBus;
use sqlx::SqlitePool;
use std::path::PathBuf;

/// Application state shared across handlers
///
/// The store handle and event bus are passed in here rather than living
/// as process-wide globals, so every operation takes an explicit session.
#[derive(Clone)]
pub struct AppState {
    /// Catalog database pool
    pub db: SqlitePool,
    /// Catalog change bus feeding live subscriptions
    pub event_bus: EventBus,
    /// Root folder holding the database and uploaded images
    pub root_folder: PathBuf,
}

impl AppState {
    pub fn new(db: SqlitePool, event_bus: EventBus, root_folder: PathBuf) -> Self {
        Self {
            db,
            event_bus,
            root_folder,
        }
    }

    /// Directory uploaded images are written under
    pub fn images_dir(&self) -> PathBuf {
        self.root_folder.join("images")
    }
}
