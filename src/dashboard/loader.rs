use crate::client::NewsBackend;
use crate::error::ClientResult;
use crate::models::Repository;

/// Fetches the snapshot once. Failures go back to the caller untouched.
pub async fn load_snapshot(backend: &dyn NewsBackend) -> ClientResult<Vec<Repository>> {
    let snapshot = backend.fetch_news().await?;

    tracing::info!(
        repositories = snapshot.len(),
        commits = snapshot.iter().map(|r| r.commits.len()).sum::<usize>(),
        "snapshot loaded"
    );

    Ok(snapshot)
}
