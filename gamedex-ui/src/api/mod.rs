//! HTTP API for the catalog service

pub mod handlers;
pub mod sse;

use crate::state::AppState;
use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::path::Path;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Create the API router
///
/// `static_dir` holds the web UI assets; uploaded images are served from
/// `{root_folder}/images` under `/images`.
pub fn create_router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest(
            "/api/v1",
            Router::new()
                // Catalog read paths
                .route("/games", get(handlers::list_games))
                .route("/games/:game_id", get(handlers::get_game))
                .route("/games/:game_id/reviews", get(handlers::list_reviews))
                // Mutations
                .route("/games/:game_id/reviews", post(handlers::submit_review))
                .route("/games/:game_id/image", post(handlers::upload_image))
                .route("/seed", post(handlers::seed))
                // Live subscriptions (SSE)
                .route("/events/games", get(sse::games_events))
                .route("/events/games/:game_id", get(sse::game_events))
                .route("/events/games/:game_id/reviews", get(sse::review_events)),
        )
        .nest_service("/images", ServeDir::new(state.images_dir()))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "module": "gamedex-ui",
        "version": env!("CARGO_PKG_VERSION"),
        "root_folder": state.root_folder.display().to_string(),
    }))
}
