//! Catalog queries: composable game-list filtering and game read paths

use crate::db::models::{Game, GameFilters, SortKey};
use crate::{Error, Result};
use sqlx::SqlitePool;

const GAME_COLUMNS: &str =
    "id, name, genre, release_year, photo, num_ratings, sum_rating, avg_rating, timestamp";

/// Composable game-list query
///
/// Constraints are emitted in a canonical column order, so applying genre
/// then year produces the same SQL as year then genre. Exactly one ORDER BY
/// is ever active; ties are left to store order.
#[derive(Debug, Clone, Default)]
pub struct GamesQuery {
    genre: Option<String>,
    release_year: Option<i64>,
    sort: SortKey,
}

impl GamesQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Equality constraint on the genre column
    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// Equality constraint on the release-year column
    pub fn release_year(mut self, year: i64) -> Self {
        self.release_year = Some(year);
        self
    }

    pub fn sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// Apply a request-scoped filter set
    pub fn from_filters(filters: &GameFilters) -> Self {
        let mut query = Self::new().sort(filters.sort);
        if let Some(genre) = &filters.genre {
            query = query.genre(genre.clone());
        }
        if let Some(year) = filters.release_year {
            query = query.release_year(year);
        }
        query
    }

    /// Render the composed SQL
    pub fn sql(&self) -> String {
        let mut sql = format!("SELECT {} FROM games", GAME_COLUMNS);

        let mut clauses = Vec::new();
        if self.genre.is_some() {
            clauses.push("genre = ?");
        }
        if self.release_year.is_some() {
            clauses.push("release_year = ?");
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        match self.sort {
            SortKey::Rating => sql.push_str(" ORDER BY avg_rating DESC"),
            SortKey::Review => sql.push_str(" ORDER BY num_ratings DESC"),
        }

        sql
    }

    /// Execute the query, returning display records
    pub async fn fetch_all(&self, pool: &SqlitePool) -> Result<Vec<Game>> {
        let sql = self.sql();
        let mut query = sqlx::query_as::<_, Game>(&sql);
        if let Some(genre) = &self.genre {
            query = query.bind(genre);
        }
        if let Some(year) = self.release_year {
            query = query.bind(year);
        }
        Ok(query.fetch_all(pool).await?)
    }
}

/// Shared query-and-project path for per-game record lists
///
/// Both the game and review read paths are this one operation over a
/// timestamp-bearing row shape.
pub(crate) async fn fetch_records_for_game<T>(
    pool: &SqlitePool,
    sql: &str,
    game_id: &str,
) -> Result<Vec<T>>
where
    T: for<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> + Send + Unpin,
{
    Ok(sqlx::query_as::<_, T>(sql)
        .bind(game_id)
        .fetch_all(pool)
        .await?)
}

/// Fetch the game list with the supplied filter set applied
pub async fn get_games(pool: &SqlitePool, filters: &GameFilters) -> Result<Vec<Game>> {
    GamesQuery::from_filters(filters).fetch_all(pool).await
}

/// Fetch a single game by identifier
///
/// An empty identifier is rejected before any store access.
pub async fn get_game_by_id(pool: &SqlitePool, game_id: &str) -> Result<Game> {
    if game_id.is_empty() {
        return Err(Error::InvalidInput("No game ID has been provided".to_string()));
    }

    let sql = format!("SELECT {} FROM games WHERE id = ?", GAME_COLUMNS);
    let game = sqlx::query_as::<_, Game>(&sql)
        .bind(game_id)
        .fetch_optional(pool)
        .await?;

    game.ok_or_else(|| Error::NotFound(format!("game {}", game_id)))
}

/// Rewrite a game's stored image-reference field
///
/// Used by the image update flow after the replacement image has been
/// written to object storage.
pub async fn update_game_photo(pool: &SqlitePool, game_id: &str, photo_url: &str) -> Result<()> {
    if game_id.is_empty() {
        return Err(Error::InvalidInput("No game ID has been provided".to_string()));
    }

    let updated = sqlx::query("UPDATE games SET photo = ? WHERE id = ?")
        .bind(photo_url)
        .bind(game_id)
        .execute(pool)
        .await?
        .rows_affected();

    if updated == 0 {
        return Err(Error::NotFound(format!("game {}", game_id)));
    }

    Ok(())
}
