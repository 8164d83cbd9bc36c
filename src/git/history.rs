//! News walk over a repository's history.
//!
//! Walks from HEAD, newest first, down to the record's `latest_commit`.
//! Viewed commits are held back until an unviewed commit shows up, then
//! emitted ahead of it. A trailing run of viewed commits is not emitted at
//! all: it becomes a `ViewedFold` that moves `latest_commit` forward so the
//! next walk stops earlier.

use git2::{Oid, Repository, Sort};

use crate::error::Result;
use crate::git::repository::{commit_line_stats, format_commit_time, GitRepository};
use crate::models::{Commit, CommitSha, RepositoryRecord};

#[derive(Debug, Default)]
pub struct NewsWalk {
    pub commits: Vec<Commit>,
    pub fold: Option<ViewedFold>,
}

/// Store update produced when a walk ends on viewed commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewedFold {
    /// `latest_commit` the walk started from
    pub since: Option<CommitSha>,
    pub latest_commit: CommitSha,
    /// Shas leaving the viewed set, newest first
    pub folded: Vec<CommitSha>,
}

impl GitRepository {
    pub fn news_since(&self, record: &RepositoryRecord, limit: usize) -> Result<NewsWalk> {
        self.with_repo(|repo| {
            if repo.is_empty()? {
                return Ok(NewsWalk::default());
            }

            let mut revwalk = repo.revwalk()?;
            revwalk.set_sorting(Sort::TIME)?;
            revwalk.push_head()?;

            let mut commits = Vec::new();
            let mut held: Vec<Oid> = Vec::new();
            let mut walked = 0;
            let mut truncated = false;

            for oid in revwalk {
                let oid = oid?;
                let sha = CommitSha::from(oid);

                if record.latest_commit.as_ref() == Some(&sha) {
                    break;
                }
                if walked == limit {
                    truncated = true;
                    break;
                }
                walked += 1;

                if record.viewed_commits.contains(&sha) {
                    held.push(oid);
                    continue;
                }

                for held_oid in held.drain(..) {
                    commits.push(news_commit(repo, record, held_oid, true)?);
                }
                commits.push(news_commit(repo, record, oid, false)?);
            }

            // Older history was never looked at, so nothing can be folded.
            if truncated {
                for held_oid in held.drain(..) {
                    commits.push(news_commit(repo, record, held_oid, true)?);
                }
            }

            let fold = held.first().map(|newest| ViewedFold {
                since: record.latest_commit.clone(),
                latest_commit: CommitSha::from(*newest),
                folded: held.iter().map(|oid| CommitSha::from(*oid)).collect(),
            });

            Ok(NewsWalk { commits, fold })
        })
    }
}

fn news_commit(repo: &Repository, record: &RepositoryRecord, oid: Oid, viewed: bool) -> Result<Commit> {
    let commit = repo.find_commit(oid)?;
    let (additions, deletions) = commit_line_stats(repo, &commit)?;
    let sha = CommitSha::from(oid);

    Ok(Commit {
        link: record.commit_link(&sha),
        sha: sha.into(),
        name: commit.message().unwrap_or("").trim().to_string(),
        additions,
        deletions,
        last_modified: format_commit_time(commit.time().seconds()),
        viewed,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use git2::{Signature, Time};
    use std::collections::BTreeSet;
    use std::path::Path;
    use uuid::Uuid;

    /// Creates `count` commits, oldest first; returns their shas oldest first.
    pub(crate) fn repo_with_commits(dir: &Path, count: usize) -> Vec<CommitSha> {
        let repo = Repository::init(dir).unwrap();
        let mut shas = Vec::new();

        for i in 0..count {
            let file = format!("file{}.txt", i);
            std::fs::write(dir.join(&file), "one\ntwo\n").unwrap();

            let mut index = repo.index().unwrap();
            index.add_path(Path::new(&file)).unwrap();
            index.write().unwrap();
            let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

            let sig = Signature::new("Tester", "tester@example.com", &Time::new(1_700_000_000 + i as i64 * 60, 0)).unwrap();
            let parents: Vec<git2::Commit> = repo
                .head()
                .ok()
                .and_then(|h| h.peel_to_commit().ok())
                .into_iter()
                .collect();
            let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

            let oid = repo
                .commit(Some("HEAD"), &sig, &sig, &format!("commit {}", i), &tree, &parent_refs)
                .unwrap();
            shas.push(CommitSha::from(oid));
        }

        shas
    }

    fn record(dir: &Path, viewed: &[&CommitSha], latest: Option<&CommitSha>) -> RepositoryRecord {
        RepositoryRecord {
            id: Uuid::new_v4(),
            name: "demo".to_string(),
            url: "https://github.com/acme/demo".to_string(),
            path: dir.to_string_lossy().to_string(),
            latest_commit: latest.cloned(),
            viewed_commits: viewed.iter().map(|s| (*s).clone()).collect::<BTreeSet<_>>(),
        }
    }

    fn shas_of(walk: &NewsWalk) -> Vec<(String, bool)> {
        walk.commits.iter().map(|c| (c.sha.clone(), c.viewed)).collect()
    }

    #[test]
    fn lists_history_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let shas = repo_with_commits(dir.path(), 3);
        let git = GitRepository::open(dir.path()).unwrap();

        let walk = git.news_since(&record(dir.path(), &[], None), 100).unwrap();

        let expected: Vec<(String, bool)> = shas.iter().rev().map(|s| (s.to_string(), false)).collect();
        assert_eq!(shas_of(&walk), expected);
        assert_eq!(walk.fold, None);

        let newest = &walk.commits[0];
        assert_eq!(newest.name, "commit 2");
        assert_eq!(newest.additions, 2);
        assert_eq!(newest.deletions, 0);
        assert_eq!(newest.link, format!("https://github.com/acme/demo/commit/{}", shas[2]));
        assert!(newest.last_modified.as_deref().unwrap().ends_with("UTC"));
    }

    #[test]
    fn viewed_commits_are_emitted_before_the_next_unviewed() {
        let dir = tempfile::tempdir().unwrap();
        let s = repo_with_commits(dir.path(), 4);
        let git = GitRepository::open(dir.path()).unwrap();

        let walk = git.news_since(&record(dir.path(), &[&s[3], &s[1]], None), 100).unwrap();

        assert_eq!(
            shas_of(&walk),
            vec![
                (s[3].to_string(), true),
                (s[2].to_string(), false),
                (s[1].to_string(), true),
                (s[0].to_string(), false),
            ]
        );
        assert_eq!(walk.fold, None);
    }

    #[test]
    fn trailing_viewed_commits_fold() {
        let dir = tempfile::tempdir().unwrap();
        let s = repo_with_commits(dir.path(), 4);
        let git = GitRepository::open(dir.path()).unwrap();

        let walk = git.news_since(&record(dir.path(), &[&s[1], &s[0]], None), 100).unwrap();

        assert_eq!(
            shas_of(&walk),
            vec![(s[3].to_string(), false), (s[2].to_string(), false)]
        );
        assert_eq!(
            walk.fold,
            Some(ViewedFold {
                since: None,
                latest_commit: s[1].clone(),
                folded: vec![s[1].clone(), s[0].clone()],
            })
        );
    }

    #[test]
    fn walk_stops_at_latest_commit() {
        let dir = tempfile::tempdir().unwrap();
        let s = repo_with_commits(dir.path(), 4);
        let git = GitRepository::open(dir.path()).unwrap();

        let walk = git.news_since(&record(dir.path(), &[], Some(&s[1])), 100).unwrap();

        assert_eq!(
            shas_of(&walk),
            vec![(s[3].to_string(), false), (s[2].to_string(), false)]
        );
    }

    #[test]
    fn limited_walk_never_folds() {
        let dir = tempfile::tempdir().unwrap();
        let s = repo_with_commits(dir.path(), 4);
        let git = GitRepository::open(dir.path()).unwrap();

        let walk = git.news_since(&record(dir.path(), &[&s[2]], None), 2).unwrap();

        assert_eq!(
            shas_of(&walk),
            vec![(s[3].to_string(), false), (s[2].to_string(), true)]
        );
        assert_eq!(walk.fold, None);
    }

    #[test]
    fn empty_repository_has_no_news() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();
        let git = GitRepository::open(dir.path()).unwrap();

        let walk = git.news_since(&record(dir.path(), &[], None), 100).unwrap();

        assert!(walk.commits.is_empty());
        assert_eq!(walk.fold, None);
    }
}
