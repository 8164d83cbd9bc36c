//! Dashboard client core.
//!
//! The pipeline runs once per page load:
//! - `loader`: fetch the news snapshot
//! - `render`: build table rows and the checkbox binding index together
//! - `sync`: turn checkbox changes into viewed/unviewed backend calls
//!
//! `page` holds the rendered rows and plays the browser's part; `markup` is
//! the element tree the rows are built from.

pub mod index;
pub mod loader;
pub mod markup;
pub mod page;
pub mod render;
pub mod sync;

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::client::NewsBackend;
use crate::error::ClientError;

pub use index::{BindingEntry, BindingIndex};
pub use page::Page;
pub use render::{document, render, RenderedView};
pub use sync::{MutationOutcome, Synchronizer};

/// One page load: the rendered page with its synchronizer attached.
pub struct Dashboard {
    pub page: Page,
    synchronizer: Synchronizer,
    outcomes: UnboundedReceiver<MutationOutcome>,
    load_error: Option<ClientError>,
}

impl Dashboard {
    /// Loads, renders and wires up the page. A failed load yields an empty
    /// table; the error is logged and kept for inspection.
    pub async fn open(backend: Arc<dyn NewsBackend>) -> Self {
        let (snapshot, load_error) = match loader::load_snapshot(backend.as_ref()).await {
            Ok(snapshot) => (snapshot, None),
            Err(e) => {
                tracing::error!("Failed to load news: {}", e);
                (Vec::new(), Some(e))
            }
        };

        let RenderedView { tbody, index } = render(snapshot);
        let mut page = Page::new(tbody);

        let (sink, outcomes) = mpsc::unbounded_channel();
        let synchronizer = Synchronizer::new(index, backend).with_outcome_sink(sink);
        synchronizer.attach(&mut page);

        Self {
            page,
            synchronizer,
            outcomes,
            load_error,
        }
    }

    pub fn load_error(&self) -> Option<&ClientError> {
        self.load_error.as_ref()
    }

    pub fn index(&self) -> &BindingIndex {
        self.synchronizer.index()
    }

    /// Waits for the next finished mutation.
    pub async fn next_outcome(&mut self) -> Option<MutationOutcome> {
        self.outcomes.recv().await
    }
}
