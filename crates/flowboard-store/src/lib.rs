#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod error;
mod http;
mod payload;
mod receipt;

#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;

pub use config::StoreConfig;
pub use error::{StoreError, StoreErrorKind, StoreResult};
pub use http::HttpGraphStore;
pub use payload::GraphEnvelope;
pub use receipt::SaveReceipt;

use flowboard_graph::GraphDocument;

/// Tracing target for store operations.
pub const TRACING_TARGET: &str = "flowboard_store";

/// Capability trait for loading and saving graph documents.
///
/// Implementations perform no merging, no optimistic concurrency
/// checks, and no versioning: `save` replaces the whole persisted
/// document and the last writer wins. A failed operation must never
/// leave a partially applied document on either side.
#[async_trait::async_trait]
pub trait GraphStore: Send + Sync {
    /// Fetches the persisted document. All-or-nothing: any transport
    /// or decode failure surfaces as a [`StoreError`] and yields no
    /// partial document.
    async fn load(&self) -> StoreResult<GraphDocument>;

    /// Persists the full document, replacing the previous copy.
    async fn save(&self, document: &GraphDocument) -> StoreResult<SaveReceipt>;
}
