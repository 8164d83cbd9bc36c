//! Data transfer objects shared by the backend routes and the dashboard.
//!
//! - `news`: Repository, Commit as served by `GET /api/news`
//! - `record`: RepositoryRecord, CommitSha, ViewedQuery for the viewed store

pub mod news;
pub mod record;

pub use news::*;
pub use record::*;
