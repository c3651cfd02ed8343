//! Catalog change events
//!
//! Write paths (review submission, image update, seeding) emit a
//! `CatalogEvent` after commit; live subscriptions re-materialize their
//! result sets whenever a relevant event arrives.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Catalog change notifications
///
/// Events carry identifiers only, never record contents: a subscriber
/// always re-queries the store for the full current result set, so a
/// lagged or dropped event can at worst delay a refresh, never corrupt it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CatalogEvent {
    /// A game record changed (aggregate fields or image reference)
    GameUpdated {
        game_id: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A review was committed under a game (its aggregate changed too)
    ReviewAdded {
        game_id: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The catalog was bulk-seeded
    CatalogSeeded {
        games: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl CatalogEvent {
    /// Whether this event can change the result of a filtered game-list query
    pub fn touches_games(&self) -> bool {
        // Every current variant mutates at least one game record
        true
    }

    /// Whether this event can change the named game's record
    pub fn touches_game(&self, id: &str) -> bool {
        match self {
            CatalogEvent::GameUpdated { game_id, .. } => game_id == id,
            CatalogEvent::ReviewAdded { game_id, .. } => game_id == id,
            CatalogEvent::CatalogSeeded { .. } => true,
        }
    }

    /// Whether this event can change the named game's review list
    pub fn touches_reviews(&self, id: &str) -> bool {
        match self {
            CatalogEvent::ReviewAdded { game_id, .. } => game_id == id,
            CatalogEvent::CatalogSeeded { .. } => true,
            CatalogEvent::GameUpdated { .. } => false,
        }
    }
}

/// Central event distribution bus for catalog changes
///
/// Backed by tokio::broadcast, providing:
/// - Non-blocking publish (slow subscribers don't block writers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CatalogEvent>,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring whether any subscriber is listening
    pub fn emit(&self, event: CatalogEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}
