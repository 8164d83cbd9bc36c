//! Checkbox changes → backend mutations.
//!
//! Every change event becomes its own task. Tasks are not queued, coalesced
//! or ordered against each other, and their outcome never touches the page:
//! a failed call leaves the checkbox as the user set it.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::client::{NewsBackend, ViewedMutation};
use crate::dashboard::index::{BindingEntry, BindingIndex};
use crate::dashboard::page::{ChangeEvent, Page};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    pub target: BindingEntry,
    pub mutation: ViewedMutation,
    /// `None` when the backend accepted the mutation
    pub error: Option<String>,
}

impl MutationOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Clone)]
pub struct Synchronizer {
    index: Arc<BindingIndex>,
    backend: Arc<dyn NewsBackend>,
    outcomes: Option<UnboundedSender<MutationOutcome>>,
}

impl Synchronizer {
    pub fn new(index: BindingIndex, backend: Arc<dyn NewsBackend>) -> Self {
        Self {
            index: Arc::new(index),
            backend,
            outcomes: None,
        }
    }

    /// Every finished mutation is also sent here.
    pub fn with_outcome_sink(mut self, sink: UnboundedSender<MutationOutcome>) -> Self {
        self.outcomes = Some(sink);
        self
    }

    pub fn index(&self) -> &BindingIndex {
        &self.index
    }

    /// Dispatches the mutation for one change event. Unbound ids are ignored.
    pub fn handle_change(&self, event: &ChangeEvent) -> Option<JoinHandle<MutationOutcome>> {
        let Some(target) = self.index.get(event.target.as_str()).cloned() else {
            tracing::debug!(id = %event.target, "change on unbound checkbox ignored");
            return None;
        };

        let mutation = ViewedMutation::for_checked(event.checked);
        let backend = Arc::clone(&self.backend);
        let sink = self.outcomes.clone();

        Some(tokio::spawn(async move {
            let result = backend.send_viewed(mutation, &target).await;

            let outcome = MutationOutcome {
                error: result.err().map(|e| e.to_string()),
                target,
                mutation,
            };

            match &outcome.error {
                None => tracing::info!(
                    repo_id = %outcome.target.repo_id,
                    sha = %outcome.target.commit_sha,
                    ?mutation,
                    "updated"
                ),
                Some(e) => tracing::warn!(
                    repo_id = %outcome.target.repo_id,
                    sha = %outcome.target.commit_sha,
                    ?mutation,
                    "Failed to update viewed state: {}",
                    e
                ),
            }

            if let Some(sink) = sink {
                if sink.send(outcome.clone()).is_err() {
                    tracing::debug!(
                        sha = %outcome.target.commit_sha,
                        "outcome receiver closed, outcome dropped"
                    );
                }
            }
            outcome
        }))
    }

    /// Becomes the page's change observer.
    pub fn attach(&self, page: &mut Page) -> bool {
        let synchronizer = self.clone();
        page.attach_change_observer(Box::new(move |event: &ChangeEvent| {
            synchronizer.handle_change(event);
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::index::CheckboxId;
    use crate::dashboard::render::render;
    use crate::dashboard::render::tests::{commit, repo, sample_snapshot};
    use crate::dashboard::testing::FakeBackend;

    fn synchronizer(backend: &Arc<FakeBackend>) -> Synchronizer {
        let index = render(sample_snapshot()).index;
        Synchronizer::new(index, Arc::clone(backend) as Arc<dyn NewsBackend>)
    }

    fn event(id: &str, checked: bool) -> ChangeEvent {
        ChangeEvent {
            target: CheckboxId::from(id),
            checked,
        }
    }

    fn entry(repo_id: &str, sha: &str) -> BindingEntry {
        BindingEntry {
            repo_id: repo_id.to_string(),
            commit_sha: sha.to_string(),
        }
    }

    #[tokio::test]
    async fn checking_marks_viewed() {
        let backend = Arc::new(FakeBackend::serving(vec![]));
        let sync = synchronizer(&backend);

        let outcome = sync.handle_change(&event("r0-c0-chb", true)).unwrap().await.unwrap();

        assert!(outcome.is_ok());
        assert_eq!(backend.calls(), vec![(ViewedMutation::MarkViewed, entry("alpha", "a1"))]);
    }

    #[tokio::test]
    async fn unchecking_marks_unviewed() {
        let backend = Arc::new(FakeBackend::serving(vec![]));
        let sync = synchronizer(&backend);

        sync.handle_change(&event("r2-c0-chb", false)).unwrap().await.unwrap();

        assert_eq!(backend.calls(), vec![(ViewedMutation::MarkUnviewed, entry("beta", "b1"))]);
    }

    #[tokio::test]
    async fn unbound_id_sends_nothing() {
        let backend = Arc::new(FakeBackend::serving(vec![]));
        let sync = synchronizer(&backend);

        assert!(sync.handle_change(&event("r1-c0-chb", true)).is_none());
        assert!(sync.handle_change(&event("not-a-checkbox", false)).is_none());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn repeated_toggles_are_independent_calls() {
        let backend = Arc::new(FakeBackend::serving(vec![]));
        let sync = synchronizer(&backend);

        let first = sync.handle_change(&event("r0-c2-chb", true)).unwrap();
        let second = sync.handle_change(&event("r0-c2-chb", false)).unwrap();
        first.await.unwrap();
        second.await.unwrap();

        let mut calls = backend.calls();
        calls.sort_by_key(|(m, _)| *m == ViewedMutation::MarkUnviewed);
        assert_eq!(
            calls,
            vec![
                (ViewedMutation::MarkViewed, entry("alpha", "a3")),
                (ViewedMutation::MarkUnviewed, entry("alpha", "a3")),
            ]
        );
    }

    #[tokio::test]
    async fn failure_is_reported_and_does_not_block_others() {
        let backend = Arc::new(FakeBackend::serving(vec![]).failing_for("a1"));
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let sync = synchronizer(&backend).with_outcome_sink(tx);

        let failed = sync.handle_change(&event("r0-c0-chb", true)).unwrap().await.unwrap();
        let ok = sync.handle_change(&event("r0-c1-chb", false)).unwrap().await.unwrap();

        assert!(!failed.is_ok());
        assert!(ok.is_ok());
        assert_eq!(rx.recv().await.unwrap(), failed);
        assert_eq!(rx.recv().await.unwrap(), ok);
        assert_eq!(backend.calls().len(), 2);
    }

    #[tokio::test]
    async fn closed_outcome_receiver_does_not_lose_the_call() {
        let backend = Arc::new(FakeBackend::serving(vec![]));
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        drop(rx);
        let sync = synchronizer(&backend).with_outcome_sink(tx);

        let outcome = sync.handle_change(&event("r0-c0-chb", true)).unwrap().await.unwrap();

        assert!(outcome.is_ok());
        assert_eq!(backend.calls(), vec![(ViewedMutation::MarkViewed, entry("alpha", "a1"))]);
    }

    #[tokio::test]
    async fn shared_sha_is_addressed_per_repository() {
        let backend = Arc::new(FakeBackend::serving(vec![]));
        let index = render(vec![
            repo("one", vec![commit("deadbeef", false)]),
            repo("two", vec![commit("deadbeef", false)]),
        ])
        .index;
        let sync = Synchronizer::new(index, Arc::clone(&backend) as Arc<dyn NewsBackend>);

        sync.handle_change(&event("r1-c0-chb", true)).unwrap().await.unwrap();

        assert_eq!(backend.calls(), vec![(ViewedMutation::MarkViewed, entry("two", "deadbeef"))]);
    }
}
