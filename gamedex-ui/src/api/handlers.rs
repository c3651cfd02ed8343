//! HTTP request handlers
//!
//! JSON endpoints over the catalog read/write paths. Wire shapes use
//! camelCase field names (`releaseYear`, `avgRating`, `userId`).

use crate::state::AppState;
use crate::storage;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use gamedex_common::db::{
    add_review, get_game_by_id, get_games, get_reviews_by_game_id, seed_catalog, Game,
    GameFilters, NewReview, Review,
};
use gamedex_common::Error;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters accepted by the listing entry point
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub genre: Option<String>,
    pub release_year: Option<String>,
    pub sort: Option<String>,
}

impl ListParams {
    pub fn into_filters(self) -> GameFilters {
        GameFilters::from_params(
            self.genre.as_deref(),
            self.release_year.as_deref(),
            self.sort.as_deref(),
        )
    }
}

#[derive(Debug, Serialize)]
pub struct GameListResponse {
    pub games: Vec<Game>,
}

#[derive(Debug, Serialize)]
pub struct ReviewListResponse {
    pub reviews: Vec<Review>,
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub photo: String,
}

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub games: usize,
}

// ============================================================================
// Error mapping
// ============================================================================

/// Wrapper mapping `gamedex_common::Error` onto HTTP responses
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            // Database, Io and Config failures are server-side
            Error::Database(_) | Error::Io(_) | Error::Config(_) => {
                error!("Request failed: {}", self.0);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

// ============================================================================
// Catalog read paths
// ============================================================================

/// GET /api/v1/games - filtered game listing
pub async fn list_games(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<GameListResponse>> {
    let games = get_games(&state.db, &params.into_filters()).await?;
    Ok(Json(GameListResponse { games }))
}

/// GET /api/v1/games/:game_id - single game
pub async fn get_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> ApiResult<Json<Game>> {
    let game = get_game_by_id(&state.db, &game_id).await?;
    Ok(Json(game))
}

/// GET /api/v1/games/:game_id/reviews - reviews, newest first
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> ApiResult<Json<ReviewListResponse>> {
    let reviews = get_reviews_by_game_id(&state.db, &game_id).await?;
    Ok(Json(ReviewListResponse { reviews }))
}

// ============================================================================
// Mutations
// ============================================================================

/// POST /api/v1/games/:game_id/reviews - submit a review
///
/// Runs the rating-aggregation transaction and returns the updated game.
pub async fn submit_review(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(review): Json<NewReview>,
) -> ApiResult<(StatusCode, Json<Game>)> {
    let game = add_review(&state.db, &state.event_bus, &game_id, &review).await?;
    Ok((StatusCode::CREATED, Json(game)))
}

/// POST /api/v1/games/:game_id/image - multipart image upload
///
/// Stores the file under `images/{game_id}/{file_name}` and rewrites the
/// game's image reference to its public URL.
pub async fn upload_image(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<Json<ImageResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidInput(format!("Malformed upload: {}", e)))?
    {
        let Some(file_name) = field.file_name().map(|n| n.to_string()) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::InvalidInput(format!("Malformed upload: {}", e)))?;

        let photo = storage::update_game_image(&state, &game_id, &file_name, &bytes).await?;
        return Ok(Json(ImageResponse { photo }));
    }

    Err(Error::InvalidInput("A valid image has not been provided".to_string()).into())
}

/// POST /api/v1/seed - bulk-seed the catalog
pub async fn seed(State(state): State<AppState>) -> ApiResult<Json<SeedResponse>> {
    let games = seed_catalog(&state.db, &state.event_bus).await?;
    Ok(Json(SeedResponse { games }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_for(e: Error) -> StatusCode {
        ApiError(e).into_response().status()
    }

    #[test]
    fn test_invalid_input_maps_to_bad_request() {
        let status = status_for(Error::InvalidInput("Invalid game ID".to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_maps_to_not_found() {
        let status = status_for(Error::NotFound("Game g1 not found".to_string()));
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_server_side_failures_map_to_internal_error() {
        assert_eq!(
            status_for(Error::Database(sqlx::Error::PoolClosed)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(Error::Config("root folder unusable".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
