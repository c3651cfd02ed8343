//! Review submission and the rating-aggregation transaction

use crate::db::catalog::fetch_records_for_game;
use crate::db::models::{Game, NewReview, Review};
use crate::events::{CatalogEvent, EventBus};
use crate::{Error, Result};
use sqlx::SqlitePool;
use tracing::{error, info};
use uuid::Uuid;

/// Fetch a game's reviews, newest first
///
/// An empty identifier is rejected before any store access.
pub async fn get_reviews_by_game_id(pool: &SqlitePool, game_id: &str) -> Result<Vec<Review>> {
    if game_id.is_empty() {
        return Err(Error::InvalidInput("No game ID has been provided".to_string()));
    }

    fetch_records_for_game::<Review>(
        pool,
        "SELECT id, game_id, rating, text, user_id, timestamp \
         FROM reviews WHERE game_id = ? ORDER BY timestamp DESC",
        game_id,
    )
    .await
}

/// Submit a review and update the game's rating aggregate atomically
///
/// The aggregate bump and the review insert run in one transaction: both
/// commit together or neither does. The arithmetic runs inside the UPDATE
/// statement, so concurrent submissions against the same game serialize on
/// the store's writer lock and every committed review is counted exactly
/// once. Returns the updated game record.
pub async fn add_review(
    pool: &SqlitePool,
    bus: &EventBus,
    game_id: &str,
    review: &NewReview,
) -> Result<Game> {
    if game_id.is_empty() {
        return Err(Error::InvalidInput("No game ID has been provided".to_string()));
    }
    if review.user_id.is_empty() || !(1..=5).contains(&review.rating) {
        return Err(Error::InvalidInput(
            "A valid review has not been provided".to_string(),
        ));
    }

    match add_review_tx(pool, game_id, review).await {
        Ok(game) => {
            info!(
                "Review committed for game {} ({} ratings, avg {:.2})",
                game.id, game.num_ratings, game.avg_rating
            );
            bus.emit(CatalogEvent::ReviewAdded {
                game_id: game.id.clone(),
                timestamp: chrono::Utc::now(),
            });
            Ok(game)
        }
        Err(e) => {
            error!("There was an error adding the rating to game {}: {}", game_id, e);
            Err(e)
        }
    }
}

async fn add_review_tx(pool: &SqlitePool, game_id: &str, review: &NewReview) -> Result<Game> {
    let mut tx = pool.begin().await?;

    // sum_rating on the right-hand side is the pre-update value in every
    // SET clause, so the new average is (old_sum + rating) / (old_count + 1)
    let updated = sqlx::query(
        "UPDATE games \
         SET num_ratings = num_ratings + 1, \
             sum_rating = sum_rating + ?, \
             avg_rating = (sum_rating + ?) / (num_ratings + 1) \
         WHERE id = ?",
    )
    .bind(review.rating as f64)
    .bind(review.rating as f64)
    .bind(game_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if updated == 0 {
        // Dropping the transaction rolls it back
        return Err(Error::NotFound(format!("game {}", game_id)));
    }

    sqlx::query(
        "INSERT INTO reviews (id, game_id, rating, text, user_id, timestamp) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(game_id)
    .bind(review.rating)
    .bind(&review.text)
    .bind(&review.user_id)
    .bind(chrono::Utc::now())
    .execute(&mut *tx)
    .await?;

    let game = sqlx::query_as::<_, Game>(
        "SELECT id, name, genre, release_year, photo, num_ratings, sum_rating, avg_rating, timestamp \
         FROM games WHERE id = ?",
    )
    .bind(game_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(game)
}
