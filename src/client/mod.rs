//! Backend access for the dashboard.
//!
//! `NewsBackend` is the seam between the dashboard and the service behind
//! `/api/news` and `/api/viewed`. `HttpBackend` is the real implementation;
//! tests substitute their own.

pub mod http;

use async_trait::async_trait;

use crate::dashboard::BindingEntry;
use crate::error::ClientResult;
use crate::models::Repository;

pub use http::HttpBackend;

/// Change requested for one viewed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewedMutation {
    /// `POST /api/viewed`
    MarkViewed,
    /// `DELETE /api/viewed`
    MarkUnviewed,
}

impl ViewedMutation {
    /// Mutation a checkbox asks for once it has become `checked`.
    pub fn for_checked(checked: bool) -> Self {
        if checked {
            ViewedMutation::MarkViewed
        } else {
            ViewedMutation::MarkUnviewed
        }
    }

    pub fn method(self) -> reqwest::Method {
        match self {
            ViewedMutation::MarkViewed => reqwest::Method::POST,
            ViewedMutation::MarkUnviewed => reqwest::Method::DELETE,
        }
    }
}

#[async_trait]
pub trait NewsBackend: Send + Sync {
    /// `GET /api/news`
    async fn fetch_news(&self) -> ClientResult<Vec<Repository>>;

    /// `POST` or `DELETE /api/viewed` for one `{repo_id, commit_sha}` pair.
    async fn send_viewed(&self, mutation: ViewedMutation, target: &BindingEntry) -> ClientResult<()>;
}
