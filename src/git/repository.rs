use git2::Repository;
use std::path::Path;
use std::sync::Mutex;

use crate::error::{AppError, Result};

pub struct GitRepository {
    pub repo: Mutex<Repository>,
}

impl GitRepository {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(&path)
            .map_err(|_| AppError::RepoNotFound(path.as_ref().to_string_lossy().to_string()))?;

        Ok(Self {
            repo: Mutex::new(repo),
        })
    }

    pub fn with_repo<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Repository) -> Result<T>,
    {
        let repo = self.repo.lock().map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
        f(&repo)
    }
}

/// Commit time as shown in the dashboard, e.g. `2024-03-01 12:30:00 UTC`.
pub fn format_commit_time(timestamp: i64) -> Option<String> {
    chrono::DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}

/// Lines added and removed by a commit relative to its first parent.
pub fn commit_line_stats(repo: &Repository, commit: &git2::Commit) -> Result<(u64, u64)> {
    let tree = commit.tree()?;

    let parent_tree = if commit.parent_count() > 0 {
        Some(commit.parent(0)?.tree()?)
    } else {
        None
    };

    let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;
    let stats = diff.stats()?;

    Ok((stats.insertions() as u64, stats.deletions() as u64))
}
