//! Checkbox id → `{repo_id, commit_sha}` bindings.
//!
//! Ids are positional (`r{repo}-c{commit}-chb`) and only meaningful for the
//! snapshot they were rendered from. The index is rebuilt on every load and
//! never persisted.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CheckboxId(String);

impl CheckboxId {
    pub fn for_commit(repo_index: usize, commit_index: usize) -> Self {
        Self(format!("r{}-c{}-chb", repo_index, commit_index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CheckboxId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Borrow<str> for CheckboxId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CheckboxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The backend address of one viewed record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BindingEntry {
    pub repo_id: String,
    pub commit_sha: String,
}

#[derive(Debug, Default)]
pub struct BindingIndex {
    entries: HashMap<CheckboxId, BindingEntry>,
}

impl BindingIndex {
    pub fn get(&self, id: &str) -> Option<&BindingEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Synthesizes the id for a commit and records its binding in one step.
    pub(super) fn bind(&mut self, repo_index: usize, commit_index: usize, entry: BindingEntry) -> CheckboxId {
        let id = CheckboxId::for_commit(repo_index, commit_index);
        self.entries.insert(id.clone(), entry);
        id
    }
}
