//! Database models and queries

pub mod catalog;
pub mod init;
pub mod models;
pub mod reviews;
pub mod seed;

pub use catalog::*;
pub use init::*;
pub use models::*;
pub use reviews::*;
pub use seed::*;
