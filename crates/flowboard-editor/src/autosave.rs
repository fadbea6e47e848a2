//! Debounced autosave: decouples "the user mutated the document"
//! from "persist now".

use std::sync::Arc;
use std::time::Duration;

use flowboard_store::GraphStore;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::TRACING_TARGET;
use crate::session::EditorSession;

/// Default quiet period between the last mutation and the save: 1 second.
pub const DEFAULT_QUIET_PERIOD_MS: u64 = 1_000;

/// Default backoff before the single retry of a failed save: 5 seconds.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 5_000;

/// Autosave policy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutosaveConfig {
    /// Quiet period in milliseconds. Every mutation resets the
    /// pending deadline to now plus this value.
    pub quiet_period_ms: u64,

    /// Backoff in milliseconds before retrying a failed save once.
    /// `None` disables the retry: the controller stays idle until
    /// the next mutation.
    pub retry_backoff_ms: Option<u64>,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            quiet_period_ms: DEFAULT_QUIET_PERIOD_MS,
            retry_backoff_ms: Some(DEFAULT_RETRY_BACKOFF_MS),
        }
    }
}

impl AutosaveConfig {
    /// Returns the quiet period as a Duration.
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }

    /// Returns the retry backoff as a Duration, when enabled.
    pub fn retry_backoff(&self) -> Option<Duration> {
        self.retry_backoff_ms.map(Duration::from_millis)
    }

    /// Sets the quiet period in milliseconds.
    #[must_use]
    pub fn with_quiet_period(mut self, quiet_period_ms: u64) -> Self {
        self.quiet_period_ms = quiet_period_ms;
        self
    }

    /// Sets the retry backoff in milliseconds, or disables the retry.
    #[must_use]
    pub fn with_retry_backoff(mut self, retry_backoff_ms: Option<u64>) -> Self {
        self.retry_backoff_ms = retry_backoff_ms;
        self
    }
}

/// Handle to a running autosave task.
///
/// Dropping the handle leaves the task running for the life of the
/// runtime; use [`AutosaveHandle::shutdown`] for an orderly stop.
#[derive(Debug)]
pub struct AutosaveHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl AutosaveHandle {
    /// Signals the task to stop and waits for it to finish. Pending
    /// deadlines are discarded; an in-flight save completes first.
    pub async fn shutdown(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        let _ = self.task.await;
    }

    /// Aborts the task immediately.
    pub fn abort(&self) {
        self.task.abort();
    }
}

/// Debounces document mutations into store saves.
///
/// One pending deadline at a time: every revision change re-arms it
/// to now plus the quiet period. When it elapses uninterrupted, the
/// controller snapshots the document *at fire time* and issues
/// exactly one save. A mutation arriving while a save is in flight
/// is picked up by the next cycle, so the latest state always wins.
/// Nothing is saved before the session's initial load completes.
///
/// Save failures are logged; when the error is retryable and a
/// backoff is configured, exactly one retry is scheduled, after
/// which the controller stays idle until the next mutation.
pub struct AutosaveController {
    session: EditorSession,
    store: Arc<dyn GraphStore>,
    config: AutosaveConfig,
}

impl std::fmt::Debug for AutosaveController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutosaveController")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AutosaveController {
    /// Creates a controller for the given session and store.
    pub fn new(session: EditorSession, store: Arc<dyn GraphStore>, config: AutosaveConfig) -> Self {
        Self {
            session,
            store,
            config,
        }
    }

    /// Spawns the autosave task on the current runtime.
    pub fn spawn(self) -> AutosaveHandle {
        // Subscribe before spawning so mutations between spawn and
        // the task's first poll are not missed.
        let revisions = self.session.subscribe();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(self.run(revisions, shutdown_rx));
        AutosaveHandle {
            shutdown: Some(shutdown_tx),
            task,
        }
    }

    async fn run(self, mut revisions: watch::Receiver<u64>, mut shutdown: oneshot::Receiver<()>) {
        let quiet_period = self.config.quiet_period();
        let mut deadline: Option<Instant> = None;
        let mut retries_left: u32 = 0;

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::debug!(target: TRACING_TARGET, "autosave stopping");
                    break;
                }
                changed = revisions.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    // Gate until the initial load completes, so a
                    // pre-load (empty) document never reaches the
                    // store.
                    if self.session.is_ready() {
                        deadline = Some(Instant::now() + quiet_period);
                        retries_left = u32::from(self.config.retry_backoff_ms.is_some());
                    }
                }
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    deadline = None;
                    if let Some(backoff) = self.flush(&mut retries_left).await {
                        deadline = Some(Instant::now() + backoff);
                    }
                }
            }
        }
    }

    /// Performs one save with a fire-time snapshot. Returns the
    /// backoff to re-arm with when a retry should happen.
    async fn flush(&self, retries_left: &mut u32) -> Option<Duration> {
        let (document, revision) = self.session.snapshot_for_save()?;

        match self.store.save(&document).await {
            Ok(receipt) => {
                self.session.mark_saved(revision);
                tracing::debug!(
                    target: TRACING_TARGET,
                    revision,
                    status = receipt.status,
                    nodes = document.node_count(),
                    edges = document.edge_count(),
                    "autosave flushed"
                );
                None
            }
            Err(error) if error.is_retryable() && *retries_left > 0 => {
                *retries_left -= 1;
                let backoff = self.config.retry_backoff()?;
                tracing::warn!(
                    target: TRACING_TARGET,
                    revision,
                    error = %error,
                    backoff_ms = backoff.as_millis(),
                    "autosave failed, retrying once"
                );
                Some(backoff)
            }
            Err(error) => {
                // Local edits are never discarded; the next mutation
                // schedules the next attempt.
                tracing::warn!(
                    target: TRACING_TARGET,
                    revision,
                    error = %error,
                    "autosave failed, waiting for next mutation"
                );
                None
            }
        }
    }
}
