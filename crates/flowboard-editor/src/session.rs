//! Editor session state: one explicitly owned document per session.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use flowboard_graph::{GraphDocument, GraphResult};
use flowboard_store::{GraphStore, StoreResult};
use tokio::sync::watch;

use crate::TRACING_TARGET;

struct SessionState {
    document: GraphDocument,
    /// Whether the initial load has been applied. Gates autosave so
    /// a not-yet-loaded empty document can never overwrite the
    /// backend's copy.
    loaded: bool,
    /// Revision last written to the store (or applied from it).
    persisted_revision: u64,
}

struct SessionInner {
    state: RwLock<SessionState>,
    revision: watch::Sender<u64>,
}

/// Shared handle to one editing session's document.
///
/// The session is the single owner of the in-memory graph; the remote
/// store only mirrors it. Every successful mutation bumps a revision
/// counter published on a watch channel, which is what the autosave
/// controller subscribes to. Clones share the same session.
#[derive(Clone)]
pub struct EditorSession {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("revision", &self.revision())
            .field("loaded", &self.is_ready())
            .finish_non_exhaustive()
    }
}

impl EditorSession {
    /// Creates a session with an empty, not-yet-loaded document.
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(SessionInner {
                state: RwLock::new(SessionState {
                    document: GraphDocument::new(),
                    loaded: false,
                    persisted_revision: 0,
                }),
                revision,
            }),
        }
    }

    /// Subscribes to revision changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Returns the current revision counter.
    pub fn revision(&self) -> u64 {
        *self.inner.revision.borrow()
    }

    /// Whether the initial load has completed.
    pub fn is_ready(&self) -> bool {
        self.read_state().loaded
    }

    /// Whether local edits exist that the store has not seen yet.
    pub fn is_dirty(&self) -> bool {
        let state = self.read_state();
        state.loaded && state.persisted_revision != self.revision()
    }

    /// Clones the current document.
    pub fn document(&self) -> GraphDocument {
        self.read_state().document.clone()
    }

    /// Runs a read-only closure against the document.
    pub fn read<T>(&self, op: impl FnOnce(&GraphDocument) -> T) -> T {
        op(&self.read_state().document)
    }

    /// Applies a mutation, bumping the revision only when it succeeds.
    ///
    /// A failed mutation leaves the document untouched (guaranteed by
    /// [`GraphDocument`]) and schedules nothing.
    pub fn mutate<T>(&self, op: impl FnOnce(&mut GraphDocument) -> GraphResult<T>) -> GraphResult<T> {
        let mut state = self.write_state();
        let value = op(&mut state.document)?;
        drop(state);
        self.inner.revision.send_modify(|revision| *revision += 1);
        Ok(value)
    }

    /// Replaces the document with a freshly loaded copy and opens the
    /// autosave gate. The loaded state is in sync with the store, so
    /// no revision change is published and nothing gets scheduled.
    pub fn apply_loaded(&self, document: GraphDocument) {
        let mut state = self.write_state();
        tracing::debug!(
            target: TRACING_TARGET,
            nodes = document.node_count(),
            edges = document.edge_count(),
            "applying loaded document"
        );
        state.document = document;
        state.loaded = true;
        state.persisted_revision = self.revision();
    }

    /// Loads the document from a store and applies it.
    ///
    /// On failure the session is left unpopulated and not ready; the
    /// caller decides whether to retry or surface the error.
    pub async fn load_from(&self, store: &dyn GraphStore) -> StoreResult<()> {
        let document = store.load().await?;
        self.apply_loaded(document);
        Ok(())
    }

    /// Records that the given revision has been persisted.
    pub fn mark_saved(&self, revision: u64) {
        self.write_state().persisted_revision = revision;
    }

    /// Captures the state a save should carry: the document as of
    /// now, with its revision. `None` while the session is not ready.
    pub fn snapshot_for_save(&self) -> Option<(GraphDocument, u64)> {
        // Revision is read before the document so a racing mutation
        // can only leave the session looking dirtier than it is,
        // never cleaner.
        let revision = self.revision();
        let state = self.read_state();
        state.loaded.then(|| (state.document.clone(), revision))
    }

    fn read_state(&self) -> RwLockReadGuard<'_, SessionState> {
        self.inner
            .state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use flowboard_graph::Node;
    use flowboard_store::StoreError;
    use flowboard_store::mock::MockGraphStore;

    use super::*;

    #[test]
    fn test_new_session_is_gated() {
        let session = EditorSession::new();
        assert!(!session.is_ready());
        assert!(!session.is_dirty());
        assert!(session.snapshot_for_save().is_none());
    }

    #[test]
    fn test_mutations_bump_revision_only_on_success() {
        let session = EditorSession::new();
        session
            .mutate(|doc| doc.add_node(Node::new("default")))
            .unwrap();
        assert_eq!(session.revision(), 1);

        let node = session.read(|doc| doc.nodes().next().unwrap().clone());
        assert!(session.mutate(|doc| doc.add_node(node)).is_err());
        assert_eq!(session.revision(), 1);
    }

    #[test]
    fn test_apply_loaded_opens_gate_without_dirtying() {
        let session = EditorSession::new();
        let mut rx = session.subscribe();
        rx.mark_unchanged();

        session.apply_loaded(GraphDocument::new());
        assert!(session.is_ready());
        assert!(!session.is_dirty());
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_dirty_until_marked_saved() {
        let session = EditorSession::new();
        session.apply_loaded(GraphDocument::new());
        session
            .mutate(|doc| doc.add_node(Node::new("default")))
            .unwrap();
        assert!(session.is_dirty());

        let (_, revision) = session.snapshot_for_save().unwrap();
        session.mark_saved(revision);
        assert!(!session.is_dirty());
    }

    #[tokio::test]
    async fn test_load_from_failure_keeps_session_unpopulated() {
        let session = EditorSession::new();
        let store = MockGraphStore::new();
        store.push_load_failure(StoreError::Status { status: 502 });

        assert!(session.load_from(&store).await.is_err());
        assert!(!session.is_ready());

        session.load_from(&store).await.unwrap();
        assert!(session.is_ready());
    }
}
