//! API route handlers - maps HTTP endpoints to the repository store.
//!
//! - `news`: GET /api/news, the dashboard snapshot
//! - `viewed`: POST/DELETE /api/viewed, per-commit viewed state

pub mod news;
pub mod viewed;

use axum::Router;

use crate::store::SharedStore;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    /// Most commits walked per repository and request
    pub history_limit: usize,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(news::routes(state.clone()))
        .merge(viewed::routes(state))
}
