//! News endpoint.
//!
//! GET /api/news
//!
//! Returns every stored repository with the commits the user has not yet
//! folded away, newest first, each flagged `viewed` or not. Walks that end on
//! viewed commits advance the repository's `latest_commit` as a side effect.

use axum::{extract::State, routing::get, Json, Router};

use crate::error::Result;
use crate::git::GitRepository;
use crate::models::{Commit, Repository, RepositoryRecord};
use crate::routes::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/news", get(get_news))
        .with_state(state)
}

async fn get_news(State(state): State<AppState>) -> Result<Json<Vec<Repository>>> {
    let records = state.store.get_repositories()?;
    let mut news = Vec::with_capacity(records.len());

    for record in records {
        let commits = match walk_record(&state, &record) {
            Ok(commits) => commits,
            Err(e) => {
                tracing::warn!(repo = %record.name, path = %record.path, "Failed to read history: {}", e);
                Vec::new()
            }
        };

        news.push(Repository {
            id: record.id.to_string(),
            name: record.name,
            url: record.url,
            commits,
        });
    }

    Ok(Json(news))
}

fn walk_record(state: &AppState, record: &RepositoryRecord) -> Result<Vec<Commit>> {
    let git = GitRepository::open(&record.path)?;
    let walk = git.news_since(record, state.history_limit)?;

    if let Some(fold) = &walk.fold {
        tracing::info!(repo = %record.name, latest = %fold.latest_commit, folded = fold.folded.len(), "folding viewed commits");
        state.store.apply_fold(record.id, fold)?;
    }

    Ok(walk.commits)
}
