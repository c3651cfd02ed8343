//! Database initialization
//!
//! Creates the catalog database on first run and opens it idempotently
//! thereafter. Schema creation uses `CREATE TABLE IF NOT EXISTS` so
//! multiple concurrent initializers converge on the same state.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    // WAL mode allows concurrent readers while a review transaction holds
    // the writer lock
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    // Writers contending on the same game wait instead of failing fast
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_games_table(&pool).await?;
    create_reviews_table(&pool).await?;

    Ok(pool)
}

/// Create the games table
///
/// Aggregate columns default to zero so a game with no reviews reads as
/// `{num_ratings: 0, sum_rating: 0, avg_rating: 0}`.
pub async fn create_games_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS games (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            genre TEXT NOT NULL,
            release_year INTEGER NOT NULL,
            photo TEXT NOT NULL DEFAULT '',
            num_ratings INTEGER NOT NULL DEFAULT 0,
            sum_rating REAL NOT NULL DEFAULT 0,
            avg_rating REAL NOT NULL DEFAULT 0,
            timestamp TIMESTAMP NOT NULL,
            CHECK (num_ratings >= 0),
            CHECK (release_year > 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Indexes cover the two filter columns and both sort orders
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_games_genre ON games(genre)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_games_release_year ON games(release_year)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_games_avg_rating ON games(avg_rating)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_games_num_ratings ON games(num_ratings)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the reviews table
///
/// Reviews are append-only: nothing in the system updates or deletes a
/// committed review.
pub async fn create_reviews_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reviews (
            id TEXT PRIMARY KEY,
            game_id TEXT NOT NULL REFERENCES games(id) ON DELETE CASCADE,
            rating INTEGER NOT NULL,
            text TEXT NOT NULL,
            user_id TEXT NOT NULL,
            timestamp TIMESTAMP NOT NULL,
            CHECK (rating >= 1 AND rating <= 5)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_reviews_game_id ON reviews(game_id)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_reviews_game_timestamp ON reviews(game_id, timestamp)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
