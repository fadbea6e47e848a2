//! Mock graph store for testing.
//!
//! Records every save and serves a configurable document on load.
//! Failures are injected per call: each queued error is consumed by
//! exactly one operation.
//!
//! Only available with the `test-utils` feature:
//!
//! ```toml
//! [dev-dependencies]
//! flowboard-store = { version = "...", features = ["test-utils"] }
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use flowboard_graph::GraphDocument;

use crate::{GraphStore, SaveReceipt, StoreError, StoreResult};

#[derive(Default)]
struct MockState {
    document: GraphDocument,
    saved: Vec<GraphDocument>,
    load_failures: VecDeque<StoreError>,
    save_failures: VecDeque<StoreError>,
    failed_saves: usize,
}

/// In-memory [`GraphStore`] double.
///
/// A successful save replaces the mock's document, matching the
/// full-replace semantics of the real backend.
#[derive(Clone, Default)]
pub struct MockGraphStore {
    state: Arc<Mutex<MockState>>,
}

impl std::fmt::Debug for MockGraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockGraphStore").finish_non_exhaustive()
    }
}

impl MockGraphStore {
    /// Creates a mock serving an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock serving the given document on load.
    pub fn with_document(document: GraphDocument) -> Self {
        let mock = Self::default();
        mock.lock().document = document;
        mock
    }

    /// Queues an error for the next load call.
    pub fn push_load_failure(&self, error: StoreError) {
        self.lock().load_failures.push_back(error);
    }

    /// Queues an error for the next save call.
    pub fn push_save_failure(&self, error: StoreError) {
        self.lock().save_failures.push_back(error);
    }

    /// Returns every successfully saved document, oldest first.
    pub fn saved(&self) -> Vec<GraphDocument> {
        self.lock().saved.clone()
    }

    /// Returns the number of successful saves.
    pub fn save_count(&self) -> usize {
        self.lock().saved.len()
    }

    /// Returns the number of failed save attempts.
    pub fn failed_save_count(&self) -> usize {
        self.lock().failed_saves
    }

    /// Returns the most recently saved document.
    pub fn last_saved(&self) -> Option<GraphDocument> {
        self.lock().saved.last().cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait::async_trait]
impl GraphStore for MockGraphStore {
    async fn load(&self) -> StoreResult<GraphDocument> {
        let mut state = self.lock();
        if let Some(error) = state.load_failures.pop_front() {
            return Err(error);
        }
        Ok(state.document.clone())
    }

    async fn save(&self, document: &GraphDocument) -> StoreResult<SaveReceipt> {
        let mut state = self.lock();
        if let Some(error) = state.save_failures.pop_front() {
            state.failed_saves += 1;
            return Err(error);
        }
        state.document = document.clone();
        state.saved.push(document.clone());
        Ok(SaveReceipt::new(200))
    }
}
