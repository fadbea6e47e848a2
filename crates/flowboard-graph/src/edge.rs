//! Edge and connection-gesture types.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::id::{EdgeId, NodeId};

/// A directed edge between two nodes' handles.
///
/// Wire field names (`sourceHandle`, `targetHandle`) follow the
/// rendering library's connection events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique edge id.
    pub id: EdgeId,
    /// Source node id.
    pub source: NodeId,
    /// Target node id.
    pub target: NodeId,
    /// Handle on the source node, when it exposes several.
    #[serde(rename = "sourceHandle", default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    /// Handle on the target node, when it exposes several.
    #[serde(rename = "targetHandle", default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

impl Edge {
    /// Creates an edge with a fresh random id from a connection gesture.
    pub fn from_connection(connection: Connection) -> Self {
        Self {
            id: EdgeId::random(),
            source: connection.source,
            target: connection.target,
            source_handle: connection.source_handle,
            target_handle: connection.target_handle,
        }
    }
}

/// A connect gesture: the endpoints of an edge before it exists.
///
/// Emitted by the editor surface when the user drags from one node's
/// output to another node's input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(
    name = "ConnectionBuilder",
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct Connection {
    /// Source node id.
    pub source: NodeId,
    /// Target node id.
    pub target: NodeId,
    /// Handle on the source node.
    #[builder(default)]
    pub source_handle: Option<String>,
    /// Handle on the target node.
    #[builder(default)]
    pub target_handle: Option<String>,
}

impl ConnectionBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.source.is_none() {
            return Err("source is required".into());
        }
        if self.target.is_none() {
            return Err("target is required".into());
        }
        Ok(())
    }
}

impl Connection {
    /// Creates a connection between two nodes without handle names.
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
        }
    }

    /// Returns a builder for creating a connection.
    pub fn builder() -> ConnectionBuilder {
        ConnectionBuilder::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_wire_format() {
        let edge = Edge {
            id: EdgeId::new("e1-2"),
            source: NodeId::new("1"),
            target: NodeId::new("2"),
            source_handle: Some("out".into()),
            target_handle: None,
        };
        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(json["id"], "e1-2");
        assert_eq!(json["source"], "1");
        assert_eq!(json["target"], "2");
        assert_eq!(json["sourceHandle"], "out");
        assert!(json.get("targetHandle").is_none());
    }

    #[test]
    fn test_builder_requires_endpoints() {
        let err = Connection::builder().with_source(NodeId::new("1")).build();
        assert!(err.is_err());
    }

    #[test]
    fn test_from_connection_assigns_fresh_id() {
        let conn = Connection::new("a", "b");
        let e1 = Edge::from_connection(conn.clone());
        let e2 = Edge::from_connection(conn);
        assert_ne!(e1.id, e2.id);
        assert_eq!(e1.source, e2.source);
    }
}
