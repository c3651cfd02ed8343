//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog game record with its running rating aggregate
///
/// Invariant: `avg_rating == sum_rating / num_ratings` whenever
/// `num_ratings > 0`. With no reviews all three aggregate fields are zero.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    pub name: String,
    pub genre: String,
    pub release_year: i64,
    pub photo: String,
    pub num_ratings: i64,
    pub sum_rating: f64,
    pub avg_rating: f64,
    pub timestamp: DateTime<Utc>,
}

/// A committed review; immutable once created
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub game_id: String,
    pub rating: i64,
    pub text: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
}

/// A review submission payload; the timestamp is server-assigned at commit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub rating: i64,
    #[serde(default)]
    pub text: String,
    pub user_id: String,
}

/// Sort order for the game listing; exactly one is ever active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Average rating, descending (default)
    #[default]
    Rating,
    /// Review count, descending
    Review,
}

impl SortKey {
    /// Parse the `sort` query parameter; anything other than "Review"
    /// (including absent or empty) is the rating sort
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("Review") => SortKey::Review,
            _ => SortKey::Rating,
        }
    }
}

/// Transient, request-scoped filter selection for the game listing
///
/// Reconstructed per request from the `genre`, `releaseYear` and `sort`
/// query parameters; never persisted.
#[derive(Debug, Clone, Default)]
pub struct GameFilters {
    pub genre: Option<String>,
    pub release_year: Option<i64>,
    pub sort: SortKey,
}

impl GameFilters {
    /// Build a filter set from raw query-parameter values
    ///
    /// Empty strings mean "no filter". A release year that does not parse
    /// coerces to a sentinel that matches no stored game, so bad input
    /// yields an empty result set rather than an error.
    pub fn from_params(
        genre: Option<&str>,
        release_year: Option<&str>,
        sort: Option<&str>,
    ) -> Self {
        let genre = genre
            .filter(|g| !g.is_empty())
            .map(|g| g.to_string());
        let release_year = release_year
            .filter(|y| !y.is_empty())
            .map(|y| y.parse::<i64>().unwrap_or(-1));
        Self {
            genre,
            release_year,
            sort: SortKey::from_param(sort),
        }
    }
}
