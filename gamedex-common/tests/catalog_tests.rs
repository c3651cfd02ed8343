//! Tests for the catalog query builder and game read paths

use gamedex_common::db::{
    get_game_by_id, get_games, init_database, update_game_photo, GameFilters, SortKey,
};
use gamedex_common::Error;
use sqlx::SqlitePool;
use std::path::PathBuf;

async fn setup(tag: &str) -> (SqlitePool, PathBuf) {
    let db_path = PathBuf::from(format!(
        "/tmp/gamedex-test-catalog-{}-{}.db",
        tag,
        std::process::id()
    ));
    let _ = std::fs::remove_file(&db_path);
    let pool = init_database(&db_path).await.unwrap();
    (pool, db_path)
}

async fn insert_game(
    pool: &SqlitePool,
    id: &str,
    name: &str,
    genre: &str,
    year: i64,
    num_ratings: i64,
    avg_rating: f64,
) {
    sqlx::query(
        "INSERT INTO games \
         (id, name, genre, release_year, num_ratings, sum_rating, avg_rating, timestamp) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(name)
    .bind(genre)
    .bind(year)
    .bind(num_ratings)
    .bind(avg_rating * num_ratings as f64)
    .bind(avg_rating)
    .bind(chrono::Utc::now())
    .execute(pool)
    .await
    .unwrap();
}

#[tokio::test]
async fn test_unfiltered_list_sorts_by_avg_rating_desc() {
    let (pool, db_path) = setup("rating-sort").await;

    insert_game(&pool, "g1", "Dark Souls", "RPG", 2011, 10, 4.6).await;
    insert_game(&pool, "g2", "Minecraft", "Sandbox", 2011, 50, 4.5).await;
    insert_game(&pool, "g3", "World of Warcraft", "MMORPG", 2004, 30, 5.0).await;

    let games = get_games(&pool, &GameFilters::default()).await.unwrap();
    let ids: Vec<&str> = games.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids, vec!["g3", "g1", "g2"]);

    drop(pool);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_review_sort_orders_by_num_ratings_desc() {
    let (pool, db_path) = setup("review-sort").await;

    insert_game(&pool, "g1", "Dark Souls", "RPG", 2011, 10, 4.6).await;
    insert_game(&pool, "g2", "Minecraft", "Sandbox", 2011, 50, 4.5).await;
    insert_game(&pool, "g3", "World of Warcraft", "MMORPG", 2004, 30, 5.0).await;

    let filters = GameFilters {
        sort: SortKey::Review,
        ..Default::default()
    };
    let games = get_games(&pool, &filters).await.unwrap();
    let ids: Vec<&str> = games.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids, vec!["g2", "g3", "g1"]);

    drop(pool);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_genre_and_year_filters_compose() {
    let (pool, db_path) = setup("compose").await;

    insert_game(&pool, "g1", "Dark Souls", "RPG", 2011, 10, 4.6).await;
    insert_game(&pool, "g2", "The Witcher 3", "RPG", 2015, 40, 4.9).await;
    insert_game(&pool, "g3", "Portal 2", "Puzzle", 2011, 20, 4.7).await;

    // Same result set regardless of which filter is considered first:
    // the builder canonicalizes clause order
    let filters = GameFilters::from_params(Some("RPG"), Some("2011"), None);
    let games = get_games(&pool, &filters).await.unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].id, "g1");

    drop(pool);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_genre_only_filter_applies_no_year_constraint() {
    let (pool, db_path) = setup("genre-only").await;

    insert_game(&pool, "g1", "Dark Souls", "RPG", 2011, 10, 4.6).await;
    insert_game(&pool, "g2", "The Witcher 3", "RPG", 2015, 40, 4.9).await;
    insert_game(&pool, "g3", "Portal 2", "Puzzle", 2011, 20, 4.7).await;

    let filters = GameFilters::from_params(Some("RPG"), Some(""), Some(""));
    let games = get_games(&pool, &filters).await.unwrap();
    let ids: Vec<&str> = games.iter().map(|g| g.id.as_str()).collect();
    // Both RPGs, rating-descending
    assert_eq!(ids, vec!["g2", "g1"]);

    drop(pool);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_unrecognized_filter_values_yield_empty_set() {
    let (pool, db_path) = setup("unmatched").await;

    insert_game(&pool, "g1", "Dark Souls", "RPG", 2011, 10, 4.6).await;

    let filters = GameFilters::from_params(Some("Polka"), None, None);
    assert!(get_games(&pool, &filters).await.unwrap().is_empty());

    let filters = GameFilters::from_params(None, Some("not-a-year"), None);
    assert!(get_games(&pool, &filters).await.unwrap().is_empty());

    drop(pool);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_get_game_by_id_returns_record() {
    let (pool, db_path) = setup("by-id").await;

    insert_game(&pool, "g1", "Dark Souls", "RPG", 2011, 10, 4.6).await;

    let game = get_game_by_id(&pool, "g1").await.unwrap();
    assert_eq!(game.name, "Dark Souls");
    assert_eq!(game.release_year, 2011);
    assert_eq!(game.num_ratings, 10);

    drop(pool);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_empty_id_fails_without_store_access() {
    let (pool, db_path) = setup("empty-id").await;

    let result = get_game_by_id(&pool, "").await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));

    // The pool stays usable: nothing touched the store
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM games")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);

    drop(pool);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let (pool, db_path) = setup("unknown-id").await;

    let result = get_game_by_id(&pool, "no-such-game").await;
    assert!(matches!(result, Err(Error::NotFound(_))));

    drop(pool);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_update_game_photo_rewrites_reference() {
    let (pool, db_path) = setup("photo").await;

    insert_game(&pool, "g1", "Dark Souls", "RPG", 2011, 10, 4.6).await;

    update_game_photo(&pool, "g1", "/images/g1/cover.png")
        .await
        .unwrap();

    let game = get_game_by_id(&pool, "g1").await.unwrap();
    assert_eq!(game.photo, "/images/g1/cover.png");

    // Unknown game: typed failure, nothing written
    let result = update_game_photo(&pool, "missing", "/images/missing/x.png").await;
    assert!(matches!(result, Err(Error::NotFound(_))));

    drop(pool);
    let _ = std::fs::remove_file(&db_path);
}
