//! Graph document error types.

use thiserror::Error;

use crate::id::{EdgeId, NodeId};

/// Result type for graph document operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Validation errors raised by graph document mutations.
///
/// Every variant is recoverable: a failed mutation leaves the
/// document exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// An edge endpoint does not resolve to a node in the document.
    #[error("node {0} does not exist in the document")]
    MissingEndpoint(NodeId),

    /// An edge id does not resolve to an edge in the document.
    #[error("edge {0} does not exist in the document")]
    MissingEdge(EdgeId),

    /// A handle has reached its declared connection capacity.
    #[error("handle {handle} on node {node} is at capacity ({capacity})")]
    HandleAtCapacity {
        /// Node owning the saturated handle.
        node: NodeId,
        /// Handle identifier.
        handle: String,
        /// Declared capacity of the handle.
        capacity: u32,
    },

    /// A node with the same id already exists.
    #[error("node id {0} is already present in the document")]
    DuplicateNode(NodeId),

    /// An edge with the same id already exists.
    #[error("edge id {0} is already present in the document")]
    DuplicateEdge(EdgeId),
}
