//! Snapshot DTOs for `GET /api/news`.
//!
//! The dashboard deserializes these leniently: a repository without a usable
//! `commits` field is a repository with zero commits.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub commits: Vec<Commit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub name: String,
    pub link: String,
    pub additions: u64,
    pub deletions: u64,
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub viewed: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
