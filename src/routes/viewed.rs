//! Viewed-state endpoints.
//!
//! - POST /api/viewed?repo_id=&commit_sha=
//!   Adds the commit to the repository's viewed set.
//!
//! - DELETE /api/viewed?repo_id=&commit_sha=
//!   Removes it again.
//!
//! Both return the updated repository record. Unknown repositories are 404,
//! a malformed `repo_id` or `commit_sha` is rejected by the query extractor.

use axum::{
    extract::{Query, State},
    routing::post,
    Json, Router,
};

use crate::error::Result;
use crate::models::{RepositoryRecord, ViewedQuery};
use crate::routes::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/viewed", post(set_viewed).delete(unset_viewed))
        .with_state(state)
}

async fn set_viewed(
    State(state): State<AppState>,
    Query(query): Query<ViewedQuery>,
) -> Result<Json<RepositoryRecord>> {
    tracing::debug!(repo_id = %query.repo_id, sha = %query.commit_sha, "mark viewed");
    let record = state.store.set_viewed(query.repo_id, query.commit_sha)?;
    Ok(Json(record))
}

async fn unset_viewed(
    State(state): State<AppState>,
    Query(query): Query<ViewedQuery>,
) -> Result<Json<RepositoryRecord>> {
    tracing::debug!(repo_id = %query.repo_id, sha = %query.commit_sha, "mark unviewed");
    let record = state.store.unset_viewed(query.repo_id, &query.commit_sha)?;
    Ok(Json(record))
}
