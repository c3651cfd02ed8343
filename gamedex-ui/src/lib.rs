//! GameDex web service
//!
//! JSON endpoints, SSE live subscriptions and static assets for the
//! game catalog. Persistence and the rating-aggregation transaction live
//! in `gamedex-common`.

pub mod api;
pub mod state;
pub mod storage;
pub mod watch;

pub use state::AppState;
