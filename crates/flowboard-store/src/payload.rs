//! Wire envelope for the backend graph endpoint.

use flowboard_graph::GraphDocument;
use serde::{Deserialize, Serialize};

/// The envelope both endpoints speak:
/// `{ "data": { "nodes": [...], "edges": [...] } }`.
///
/// Deserializing the inner document validates referential integrity,
/// so a response carrying a dangling edge fails as a whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphEnvelope {
    /// The full graph document.
    pub data: GraphDocument,
}

impl GraphEnvelope {
    /// Wraps a document for transmission.
    pub fn new(data: GraphDocument) -> Self {
        Self { data }
    }
}

/// Borrowing variant used on the save path to avoid cloning the
/// document just to serialize it.
#[derive(Debug, Serialize)]
pub(crate) struct GraphEnvelopeRef<'a> {
    pub data: &'a GraphDocument,
}
