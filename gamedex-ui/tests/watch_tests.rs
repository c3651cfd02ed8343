//! Tests for live subscriptions

use gamedex_common::db::{add_review, init_database, GameFilters, NewReview};
use gamedex_common::events::EventBus;
use gamedex_ui::watch::{watch_game, watch_games, watch_reviews};
use gamedex_ui::AppState;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(2);

async fn setup() -> (AppState, TempDir) {
    let root = tempfile::tempdir().unwrap();
    let db = init_database(&root.path().join("gamedex.db")).await.unwrap();
    let state = AppState::new(db, EventBus::new(100), root.path().to_path_buf());
    (state, root)
}

async fn insert_game(state: &AppState, id: &str, name: &str) {
    sqlx::query(
        "INSERT INTO games (id, name, genre, release_year, timestamp) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(name)
    .bind("RPG")
    .bind(2011_i64)
    .bind(chrono::Utc::now())
    .execute(&state.db)
    .await
    .unwrap();
}

fn review(rating: i64) -> NewReview {
    NewReview {
        rating,
        text: "Still holds up.".to_string(),
        user_id: "User #42".to_string(),
    }
}

#[tokio::test]
async fn test_game_list_subscription_rematerializes_on_change() {
    let (state, _root) = setup().await;
    insert_game(&state, "g1", "Dark Souls").await;

    let (tx, mut rx) = mpsc::channel(8);
    let _registration = watch_games(&state, GameFilters::default(), tx);

    // Initial snapshot on registration
    let initial = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(initial.len(), 1);
    assert_eq!(initial[0].num_ratings, 0);

    // A committed review triggers a full re-materialization
    add_review(&state.db, &state.event_bus, "g1", &review(5))
        .await
        .unwrap();

    let refreshed = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(refreshed.len(), 1);
    assert_eq!(refreshed[0].num_ratings, 1);
    assert_eq!(refreshed[0].avg_rating, 5.0);
}

#[tokio::test]
async fn test_single_game_subscription_delivers_updated_record() {
    let (state, _root) = setup().await;
    insert_game(&state, "g1", "Dark Souls").await;
    insert_game(&state, "g2", "Portal 2").await;

    let (tx, mut rx) = mpsc::channel(8);
    let _registration = watch_game(&state, "g1".to_string(), tx);

    let initial = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(initial.id, "g1");

    // A change to an unrelated game must not wake this subscription;
    // a change to g1 must
    add_review(&state.db, &state.event_bus, "g2", &review(3))
        .await
        .unwrap();
    add_review(&state.db, &state.event_bus, "g1", &review(4))
        .await
        .unwrap();

    let updated = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(updated.id, "g1");
    assert_eq!(updated.num_ratings, 1);
    assert_eq!(updated.sum_rating, 4.0);
}

#[tokio::test]
async fn test_review_subscription_delivers_full_list() {
    let (state, _root) = setup().await;
    insert_game(&state, "g1", "Dark Souls").await;

    let (tx, mut rx) = mpsc::channel(8);
    let _registration = watch_reviews(&state, "g1".to_string(), tx);

    let initial = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert!(initial.is_empty());

    add_review(&state.db, &state.event_bus, "g1", &review(5))
        .await
        .unwrap();

    // Full current result set, not a diff
    let refreshed = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(refreshed.len(), 1);
    assert_eq!(refreshed[0].rating, 5);
}

#[tokio::test]
async fn test_dropping_subscription_deregisters_listener() {
    let (state, _root) = setup().await;
    insert_game(&state, "g1", "Dark Souls").await;

    let (tx, mut rx) = mpsc::channel(8);
    let registration = watch_games(&state, GameFilters::default(), tx);

    // Drain the initial snapshot, then tear the consumer down
    timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    drop(registration);

    // The aborted worker releases its bus receiver
    timeout(WAIT, async {
        while state.event_bus.subscriber_count() > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("standing listener leaked after deregistration");

    assert!(rx.recv().await.is_none());
}
