//! Repository store backed by a single JSON file.
//!
//! Holds the monitored repositories and their viewed state. Every mutation
//! rewrites the whole file through a temp file and a rename, while holding
//! the write lock, so readers never see a half-written store.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::git::ViewedFold;
use crate::models::{CommitSha, RepositoryRecord};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    repositories: Vec<RepositoryRecord>,
}

pub struct RepoStore {
    path: PathBuf,
    state: RwLock<StoreFile>,
}

pub type SharedStore = Arc<RepoStore>;

impl RepoStore {
    /// Loads the store; a missing file is an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreFile::default(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    pub fn get_repositories(&self) -> Result<Vec<RepositoryRecord>> {
        let state = self.state.read().map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
        Ok(state.repositories.clone())
    }

    pub fn add_repository(&self, name: &str, url: &str, path: &str) -> Result<RepositoryRecord> {
        let record = RepositoryRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            url: url.to_string(),
            path: path.to_string(),
            latest_commit: None,
            viewed_commits: BTreeSet::new(),
        };

        let mut state = self.state.write().map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
        state.repositories.push(record.clone());
        self.persist(&state)?;
        Ok(record)
    }

    pub fn set_viewed(&self, id: Uuid, sha: CommitSha) -> Result<RepositoryRecord> {
        self.update(id, |record| {
            record.viewed_commits.insert(sha);
        })
    }

    pub fn unset_viewed(&self, id: Uuid, sha: &CommitSha) -> Result<RepositoryRecord> {
        self.update(id, |record| {
            record.viewed_commits.remove(sha);
        })
    }

    /// Applies a fold found by a news walk, leaving unrelated viewed shas alone.
    ///
    /// The fold is dropped when the record moved on since the walk: a folded
    /// sha was unmarked, or `latest_commit` changed. The record is returned
    /// unchanged in that case.
    pub fn apply_fold(&self, id: Uuid, fold: &ViewedFold) -> Result<RepositoryRecord> {
        let mut state = self.state.write().map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
        let record = state
            .repositories
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::RepoNotFound(id.to_string()))?;

        let still_viewed = fold.folded.iter().all(|sha| record.viewed_commits.contains(sha));
        if record.latest_commit != fold.since || !still_viewed {
            tracing::debug!(repo = %record.name, "stale fold skipped");
            return Ok(record.clone());
        }

        record.latest_commit = Some(fold.latest_commit.clone());
        for sha in &fold.folded {
            record.viewed_commits.remove(sha);
        }
        let updated = record.clone();

        self.persist(&state)?;
        Ok(updated)
    }

    fn update<F>(&self, id: Uuid, f: F) -> Result<RepositoryRecord>
    where
        F: FnOnce(&mut RepositoryRecord),
    {
        let mut state = self.state.write().map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
        let record = state
            .repositories
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::RepoNotFound(id.to_string()))?;
        f(record);
        let updated = record.clone();

        self.persist(&state)?;
        Ok(updated)
    }

    fn persist(&self, state: &StoreFile) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(state)?)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "store persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::history::tests::repo_with_commits;
    use crate::git::GitRepository;

    fn sha(c: char) -> CommitSha {
        CommitSha::try_from(c.to_string().repeat(40)).unwrap()
    }

    #[test]
    fn missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = RepoStore::open(dir.path().join("store.json")).unwrap();
        assert!(store.get_repositories().unwrap().is_empty());
    }

    #[test]
    fn mutations_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = RepoStore::open(&path).unwrap();
        let record = store.add_repository("demo", "https://github.com/acme/demo", "/src/demo").unwrap();
        store.set_viewed(record.id, sha('a')).unwrap();
        store.set_viewed(record.id, sha('b')).unwrap();
        store.unset_viewed(record.id, &sha('a')).unwrap();

        let reopened = RepoStore::open(&path).unwrap();
        let loaded = reopened.get_repositories().unwrap().remove(0);
        assert_eq!(loaded.id, record.id);
        assert_eq!(loaded.name, "demo");
        assert_eq!(loaded.viewed_commits.into_iter().collect::<Vec<_>>(), vec![sha('b')]);
    }

    #[test]
    fn unknown_repository_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = RepoStore::open(dir.path().join("store.json")).unwrap();
        let err = store.set_viewed(Uuid::new_v4(), sha('a')).unwrap_err();
        assert!(matches!(err, AppError::RepoNotFound(_)));
    }

    #[test]
    fn fold_keeps_unrelated_viewed_shas() {
        let dir = tempfile::tempdir().unwrap();
        let store = RepoStore::open(dir.path().join("store.json")).unwrap();
        let record = store.add_repository("demo", "https://github.com/acme/demo", "/src/demo").unwrap();
        for c in ['a', 'b', 'c'] {
            store.set_viewed(record.id, sha(c)).unwrap();
        }

        let fold = ViewedFold {
            since: None,
            latest_commit: sha('a'),
            folded: vec![sha('a'), sha('b')],
        };
        let updated = store.apply_fold(record.id, &fold).unwrap();

        assert_eq!(updated.latest_commit, Some(sha('a')));
        assert_eq!(updated.viewed_commits.into_iter().collect::<Vec<_>>(), vec![sha('c')]);
    }

    #[test]
    fn fold_is_dropped_when_a_folded_sha_was_unmarked() {
        let dir = tempfile::tempdir().unwrap();
        let clone = dir.path().join("clone");
        std::fs::create_dir(&clone).unwrap();
        let shas = repo_with_commits(&clone, 3);
        let git = GitRepository::open(&clone).unwrap();

        let store = RepoStore::open(dir.path().join("store.json")).unwrap();
        let record = store
            .add_repository("demo", "https://github.com/acme/demo", &clone.to_string_lossy())
            .unwrap();
        store.set_viewed(record.id, shas[0].clone()).unwrap();

        // News request walks its copy, then the oldest commit is unmarked
        // before the fold lands.
        let snapshot = store.get_repositories().unwrap().remove(0);
        let fold = git.news_since(&snapshot, 100).unwrap().fold.unwrap();
        store.unset_viewed(record.id, &shas[0]).unwrap();
        let after = store.apply_fold(record.id, &fold).unwrap();

        assert_eq!(after.latest_commit, None);
        assert!(after.viewed_commits.is_empty());

        let reopened = RepoStore::open(dir.path().join("store.json")).unwrap();
        let current = reopened.get_repositories().unwrap().remove(0);
        let news = git.news_since(&current, 100).unwrap();
        assert_eq!(news.commits.len(), 3);
        assert!(news.commits.iter().all(|c| !c.viewed));
    }

    #[test]
    fn fold_is_dropped_when_latest_commit_moved() {
        let dir = tempfile::tempdir().unwrap();
        let store = RepoStore::open(dir.path().join("store.json")).unwrap();
        let record = store.add_repository("demo", "https://github.com/acme/demo", "/src/demo").unwrap();
        for c in ['a', 'b', 'c'] {
            store.set_viewed(record.id, sha(c)).unwrap();
        }

        let first = ViewedFold {
            since: None,
            latest_commit: sha('c'),
            folded: vec![sha('c')],
        };
        store.apply_fold(record.id, &first).unwrap();

        // Computed by a walk that still saw no latest_commit.
        let stale = ViewedFold {
            since: None,
            latest_commit: sha('a'),
            folded: vec![sha('a'), sha('b')],
        };
        let after = store.apply_fold(record.id, &stale).unwrap();

        assert_eq!(after.latest_commit, Some(sha('c')));
        assert_eq!(after.viewed_commits.into_iter().collect::<Vec<_>>(), vec![sha('a'), sha('b')]);
    }
}
