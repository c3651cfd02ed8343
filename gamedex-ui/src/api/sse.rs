//! SSE endpoints for live subscriptions
//!
//! Each connection registers a watch subscription and streams the full
//! re-materialized result set on every change. The subscription guard
//! lives inside the stream, so a client disconnect deregisters it.

use crate::api::handlers::{GameListResponse, ListParams, ReviewListResponse};
use crate::state::AppState;
use crate::watch::{watch_game, watch_games, watch_reviews};
use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

fn sse_response<S>(stream: S) -> Sse<S>
where
    S: Stream<Item = Result<Event, Infallible>> + Send + 'static,
{
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("keep-alive"),
    )
}

/// GET /api/v1/events/games - full filtered game list per change
pub async fn games_events(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New game-list SSE client connected");

    let (tx, mut rx) = mpsc::channel(8);
    let registration = watch_games(&state, params.into_filters(), tx);

    let stream = async_stream::stream! {
        let _registration = registration;
        while let Some(games) = rx.recv().await {
            match Event::default().event("games").json_data(&GameListResponse { games }) {
                Ok(event) => yield Ok(event),
                Err(e) => warn!("Failed to serialize game list event: {}", e),
            }
        }
    };

    sse_response(stream)
}

/// GET /api/v1/events/games/:game_id - single game record per change
pub async fn game_events(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New game SSE client connected for {}", game_id);

    let (tx, mut rx) = mpsc::channel(8);
    let registration = watch_game(&state, game_id, tx);

    let stream = async_stream::stream! {
        let _registration = registration;
        while let Some(game) = rx.recv().await {
            match Event::default().event("game").json_data(&game) {
                Ok(event) => yield Ok(event),
                Err(e) => warn!("Failed to serialize game event: {}", e),
            }
        }
    };

    sse_response(stream)
}

/// GET /api/v1/events/games/:game_id/reviews - full review list per change
pub async fn review_events(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New review SSE client connected for {}", game_id);

    let (tx, mut rx) = mpsc::channel(8);
    let registration = watch_reviews(&state, game_id, tx);

    let stream = async_stream::stream! {
        let _registration = registration;
        while let Some(reviews) = rx.recv().await {
            match Event::default().event("reviews").json_data(&ReviewListResponse { reviews }) {
                Ok(event) => yield Ok(event),
                Err(e) => warn!("Failed to serialize review list event: {}", e),
            }
        }
    };

    sse_response(stream)
}
