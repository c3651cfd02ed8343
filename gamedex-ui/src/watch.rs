//! Live subscriptions
//!
//! A subscription is a standing registration against the catalog change
//! bus: on every relevant event the full current result set is
//! re-materialized from the store (never a diff) and delivered to the
//! consumer's channel. Deregistration is a scoped resource: dropping the
//! returned [`Subscription`] aborts the worker task, so a torn-down
//! consumer cannot leak a standing listener.

use crate::state::AppState;
use gamedex_common::db::{get_game_by_id, get_games, get_reviews_by_game_id};
use gamedex_common::db::{Game, GameFilters, Review};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Deregistration handle for a live subscription
///
/// The registration stays active for the lifetime of this value.
pub struct Subscription {
    task: JoinHandle<()>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Watch the filtered game list
///
/// The current result set is delivered immediately on registration, then
/// again after every event that can change it.
pub fn watch_games(
    state: &AppState,
    filters: GameFilters,
    sink: mpsc::Sender<Vec<Game>>,
) -> Subscription {
    let db = state.db.clone();
    let mut rx = state.event_bus.subscribe();

    let task = tokio::spawn(async move {
        loop {
            match get_games(&db, &filters).await {
                Ok(games) => {
                    if sink.send(games).await.is_err() {
                        debug!("Game-list subscriber went away");
                        return;
                    }
                }
                Err(e) => warn!("Failed to materialize game list: {}", e),
            }

            if !wait_for(&mut rx, |event| event.touches_games()).await {
                return;
            }
        }
    });

    Subscription { task }
}

/// Watch a single game record
///
/// Delivers the record on registration and after every event touching it.
/// A game that cannot currently be fetched (e.g. not yet seeded) is
/// skipped rather than tearing the registration down.
pub fn watch_game(state: &AppState, game_id: String, sink: mpsc::Sender<Game>) -> Subscription {
    let db = state.db.clone();
    let mut rx = state.event_bus.subscribe();

    let task = tokio::spawn(async move {
        loop {
            match get_game_by_id(&db, &game_id).await {
                Ok(game) => {
                    if sink.send(game).await.is_err() {
                        debug!("Game subscriber for {} went away", game_id);
                        return;
                    }
                }
                Err(e) => warn!("Failed to materialize game {}: {}", game_id, e),
            }

            let id = game_id.clone();
            if !wait_for(&mut rx, move |event| event.touches_game(&id)).await {
                return;
            }
        }
    });

    Subscription { task }
}

/// Watch a game's review list, newest first
pub fn watch_reviews(
    state: &AppState,
    game_id: String,
    sink: mpsc::Sender<Vec<Review>>,
) -> Subscription {
    let db = state.db.clone();
    let mut rx = state.event_bus.subscribe();

    let task = tokio::spawn(async move {
        loop {
            match get_reviews_by_game_id(&db, &game_id).await {
                Ok(reviews) => {
                    if sink.send(reviews).await.is_err() {
                        debug!("Review subscriber for {} went away", game_id);
                        return;
                    }
                }
                Err(e) => warn!("Failed to materialize reviews for {}: {}", game_id, e),
            }

            let id = game_id.clone();
            if !wait_for(&mut rx, move |event| event.touches_reviews(&id)).await {
                return;
            }
        }
    });

    Subscription { task }
}

/// Block until a relevant event arrives; false means the bus closed
///
/// A lagged receiver counts as relevant: events were missed, so the
/// subscriber must refresh regardless of what they were.
async fn wait_for<F>(
    rx: &mut tokio::sync::broadcast::Receiver<gamedex_common::events::CatalogEvent>,
    relevant: F,
) -> bool
where
    F: Fn(&gamedex_common::events::CatalogEvent) -> bool,
{
    loop {
        match rx.recv().await {
            Ok(event) if relevant(&event) => return true,
            Ok(_) => continue,
            Err(RecvError::Lagged(missed)) => {
                warn!("Subscription lagged, missed {} events; refreshing", missed);
                return true;
            }
            Err(RecvError::Closed) => return false,
        }
    }
}
