//! Backend-side records for monitored repositories and their viewed state.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// A full 40-digit hexadecimal commit id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitSha(String);

impl CommitSha {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CommitSha {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.len() == 40 && value.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Self(value.to_ascii_lowercase()))
        } else {
            Err(AppError::InvalidSha(value))
        }
    }
}

impl From<CommitSha> for String {
    fn from(sha: CommitSha) -> Self {
        sha.0
    }
}

impl From<git2::Oid> for CommitSha {
    fn from(oid: git2::Oid) -> Self {
        Self(oid.to_string())
    }
}

impl fmt::Display for CommitSha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    /// Local clone the history is read from
    pub path: String,
    #[serde(default)]
    pub latest_commit: Option<CommitSha>,
    #[serde(default)]
    pub viewed_commits: BTreeSet<CommitSha>,
}

impl RepositoryRecord {
    pub fn commit_link(&self, sha: &CommitSha) -> String {
        format!("{}/commit/{}", self.url.trim_end_matches('/'), sha)
    }
}

/// Query string of `POST /api/viewed` and `DELETE /api/viewed`.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewedQuery {
    pub repo_id: Uuid,
    pub commit_sha: CommitSha,
}
