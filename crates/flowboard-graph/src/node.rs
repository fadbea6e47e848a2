//! Node types: payload data, connection handles, and the node itself.

use std::collections::HashMap;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

use crate::id::NodeId;
use crate::position::Position;

/// Opaque node payload: a string-keyed map of JSON values.
///
/// Carries at minimum a display label under the `"label"` key;
/// arbitrary additional keys are preserved through serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeData(HashMap<String, Value>);

impl NodeData {
    /// Creates an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a payload containing only a display label.
    pub fn with_label(label: impl Into<String>) -> Self {
        let mut data = Self::default();
        data.set_label(label);
        data
    }

    /// Returns the display label, if present.
    pub fn label(&self) -> Option<&str> {
        self.0.get("label").and_then(Value::as_str)
    }

    /// Sets the display label.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.0.insert("label".to_owned(), Value::String(label.into()));
    }

    /// Returns the value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Stores a value under `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Returns whether the payload holds no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Which end of an edge a handle accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum HandleDirection {
    /// Outgoing connections originate here.
    Source,
    /// Incoming connections terminate here.
    Target,
}

/// A named connection point on a node.
///
/// `capacity` of `None` means the handle accepts any number of
/// connections; `Some(n)` caps it at `n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleSpec {
    /// Handle identifier, unique per direction within the node.
    pub id: String,
    /// Direction of the handle.
    pub direction: HandleDirection,
    /// Maximum number of connections, unlimited when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
}

impl HandleSpec {
    /// Creates an unlimited source handle.
    pub fn source(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            direction: HandleDirection::Source,
            capacity: None,
        }
    }

    /// Creates an unlimited target handle.
    pub fn target(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            direction: HandleDirection::Target,
            capacity: None,
        }
    }

    /// Caps the handle at the given number of connections.
    #[must_use]
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }
}

/// A node in the graph document.
///
/// The serde representation matches the editor wire format: `id`,
/// `type`, `data`, `position`. Handle declarations serialize only
/// when present; the backend treats the document as opaque JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(
    name = "NodeBuilder",
    pattern = "owned",
    setter(into, strip_option, prefix = "with")
)]
pub struct Node {
    /// Unique node id, stable for the document's lifetime.
    #[builder(default = "NodeId::random()")]
    pub id: NodeId,
    /// Type tag selecting the node's visual/behavioral variant.
    #[serde(rename = "type")]
    pub type_tag: String,
    /// Opaque payload, at minimum a display label.
    #[serde(default)]
    #[builder(default)]
    pub data: NodeData,
    /// Position on the editor canvas.
    #[serde(default)]
    #[builder(default)]
    pub position: Position,
    /// Declared connection handles; empty means unlimited connections.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub handles: Vec<HandleSpec>,
}

impl Node {
    /// Creates a node of the given type with a fresh random id.
    pub fn new(type_tag: impl Into<String>) -> Self {
        Self {
            id: NodeId::random(),
            type_tag: type_tag.into(),
            data: NodeData::default(),
            position: Position::default(),
            handles: Vec::new(),
        }
    }

    /// Returns a builder for creating a node.
    pub fn builder() -> NodeBuilder {
        NodeBuilder::default()
    }

    /// Resolves a connection endpoint to a declared handle.
    ///
    /// A named endpoint matches the handle with that id and direction.
    /// An unnamed endpoint resolves to the node's sole handle in that
    /// direction; nodes with zero or several candidates resolve to
    /// `None`, which callers treat as unconstrained.
    pub fn handle(&self, direction: HandleDirection, name: Option<&str>) -> Option<&HandleSpec> {
        match name {
            Some(name) => self
                .handles
                .iter()
                .find(|h| h.direction == direction && h.id == name),
            None => {
                let mut candidates = self.handles.iter().filter(|h| h.direction == direction);
                let first = candidates.next()?;
                candidates.next().is_none().then_some(first)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_wire_format() {
        let mut node = Node::new("custom");
        node.id = NodeId::new("node-1");
        node.data.set_label("Node 1");
        node.position = Position::new(100.0, 150.0);

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["id"], "node-1");
        assert_eq!(json["type"], "custom");
        assert_eq!(json["data"]["label"], "Node 1");
        assert_eq!(json["position"]["x"], 100.0);
        // No handles declared, so the field is omitted entirely.
        assert!(json.get("handles").is_none());
    }

    #[test]
    fn test_node_deserializes_without_optional_fields() {
        let node: Node =
            serde_json::from_str(r#"{"id":"1","type":"default","position":{"x":0.0,"y":0.0}}"#)
                .unwrap();
        assert_eq!(node.id, NodeId::new("1"));
        assert!(node.data.is_empty());
        assert!(node.handles.is_empty());
    }

    #[test]
    fn test_builder_generates_id() {
        let a = Node::builder().with_type_tag("default").build().unwrap();
        let b = Node::builder().with_type_tag("default").build().unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_handle_resolution() {
        let node = Node::builder()
            .with_type_tag("custom")
            .with_handles(vec![
                HandleSpec::source("out").with_capacity(1),
                HandleSpec::target("in").with_capacity(1),
            ])
            .build()
            .unwrap();

        let by_name = node.handle(HandleDirection::Source, Some("out")).unwrap();
        assert_eq!(by_name.capacity, Some(1));

        // Unnamed endpoints resolve to the sole handle per direction.
        let sole = node.handle(HandleDirection::Target, None).unwrap();
        assert_eq!(sole.id, "in");

        assert!(node.handle(HandleDirection::Source, Some("missing")).is_none());
    }

    #[test]
    fn test_handle_resolution_ambiguous() {
        let node = Node::builder()
            .with_type_tag("fanout")
            .with_handles(vec![HandleSpec::source("a"), HandleSpec::source("b")])
            .build()
            .unwrap();
        assert!(node.handle(HandleDirection::Source, None).is_none());
    }

    #[test]
    fn test_extra_payload_keys_preserved() {
        let mut data = NodeData::with_label("n");
        data.insert("weight", 3);
        let json = serde_json::to_string(&data).unwrap();
        let back: NodeData = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get("weight"), Some(&Value::from(3)));
        assert_eq!(back.label(), Some("n"));
    }
}
