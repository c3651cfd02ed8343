//! Bulk catalog seeding
//!
//! Inserts ten fixed, named games, each with a handful of synthetic
//! reviews drawn from a fixed phrase pool. Timestamps are randomized into
//! the past with every game's timestamp preceding all of its reviews.
//! Aggregates are computed from the generated reviews, so the seeded
//! catalog satisfies the `avg = sum / count` invariant from the start.

use crate::db::models::Game;
use crate::events::{CatalogEvent, EventBus};
use crate::Result;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

/// Fixed game roster: (name, genre, release year)
const SEED_GAMES: [(&str, &str, i64); 10] = [
    ("World of Warcraft", "MMORPG", 2004),
    ("The Legend of Zelda: Breath of the Wild", "Action-Adventure", 2017),
    ("The Witcher 3: Wild Hunt", "RPG", 2015),
    ("Red Dead Redemption 2", "Action-Adventure", 2018),
    ("The Last of Us", "Action-Adventure", 2013),
    ("Portal 2", "Puzzle", 2011),
    ("Half-Life 2", "FPS", 2004),
    ("Dark Souls", "RPG", 2011),
    ("Super Mario 64", "Platformer", 1996),
    ("Minecraft", "Sandbox", 2011),
];

/// Fixed review phrase pool: (rating, text)
const REVIEW_POOL: [(i64, &str); 14] = [
    (5, "An absolute masterpiece, I lost a whole weekend to it."),
    (5, "Best game I have played in years."),
    (5, "The soundtrack alone is worth the price."),
    (4, "Great fun, though the late game drags a little."),
    (4, "Solid mechanics and a world that rewards exploring."),
    (4, "Really enjoyed it, would recommend to a friend."),
    (3, "Decent, but it never quite grabbed me."),
    (3, "Good ideas, uneven execution."),
    (3, "Fine for a few evenings."),
    (2, "The controls fought me the entire time."),
    (2, "Too many fetch quests, not enough story."),
    (1, "Crashed twice in the first hour."),
    (5, "Still holds up after all these years."),
    (4, "The kind of game you think about at work."),
];

/// Seed record for one game plus its generated reviews
struct SeedGame {
    game: Game,
    reviews: Vec<SeedReview>,
}

struct SeedReview {
    rating: i64,
    text: String,
    user_id: String,
    timestamp: DateTime<Utc>,
}

/// Generate the seed data set in memory
fn generate_seed_games(rng: &mut StdRng) -> Vec<SeedGame> {
    let now = Utc::now();

    SEED_GAMES
        .iter()
        .map(|(name, genre, release_year)| {
            // Game created between one and two years ago
            let game_age_days = rng.gen_range(365..730);
            let game_timestamp = now - Duration::days(game_age_days);

            let num_reviews = rng.gen_range(3..=8);
            let reviews: Vec<SeedReview> = (0..num_reviews)
                .map(|_| {
                    let (rating, text) = REVIEW_POOL[rng.gen_range(0..REVIEW_POOL.len())];
                    // Strictly after the game, strictly before now
                    let offset_minutes = rng.gen_range(60..game_age_days * 24 * 60);
                    SeedReview {
                        rating,
                        text: text.to_string(),
                        user_id: format!("User #{}", rng.gen_range(1000..10000)),
                        timestamp: game_timestamp + Duration::minutes(offset_minutes),
                    }
                })
                .collect();

            let sum_rating: f64 = reviews.iter().map(|r| r.rating as f64).sum();
            let num_ratings = reviews.len() as i64;

            SeedGame {
                game: Game {
                    id: Uuid::new_v4().to_string(),
                    name: name.to_string(),
                    genre: genre.to_string(),
                    release_year: *release_year,
                    photo: String::new(),
                    num_ratings,
                    sum_rating,
                    avg_rating: sum_rating / num_ratings as f64,
                    timestamp: game_timestamp,
                },
                reviews,
            }
        })
        .collect()
}

/// Seed the catalog with the fixed roster
///
/// Idempotent: an already populated catalog is left untouched and the
/// existing game count is returned. The whole seed runs in one
/// transaction.
pub async fn seed_catalog(pool: &SqlitePool, bus: &EventBus) -> Result<usize> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM games")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        info!("Catalog already has {} games, skipping seed", existing);
        return Ok(existing as usize);
    }

    let mut rng = StdRng::from_entropy();
    let seed_games = generate_seed_games(&mut rng);
    let count = seed_games.len();

    let mut tx = pool.begin().await?;

    for entry in &seed_games {
        let game = &entry.game;
        sqlx::query(
            "INSERT INTO games \
             (id, name, genre, release_year, photo, num_ratings, sum_rating, avg_rating, timestamp) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&game.id)
        .bind(&game.name)
        .bind(&game.genre)
        .bind(game.release_year)
        .bind(&game.photo)
        .bind(game.num_ratings)
        .bind(game.sum_rating)
        .bind(game.avg_rating)
        .bind(game.timestamp)
        .execute(&mut *tx)
        .await?;

        for review in &entry.reviews {
            sqlx::query(
                "INSERT INTO reviews (id, game_id, rating, text, user_id, timestamp) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&game.id)
            .bind(review.rating)
            .bind(&review.text)
            .bind(&review.user_id)
            .bind(review.timestamp)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;

    info!("Seeded catalog with {} games", count);
    bus.emit(CatalogEvent::CatalogSeeded {
        games: count,
        timestamp: Utc::now(),
    });

    Ok(count)
}
