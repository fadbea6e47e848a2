//! The graph document: the aggregate of nodes and edges that forms
//! the unit of load/save.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::TRACING_TARGET;
use crate::edge::{Connection, Edge};
use crate::error::{GraphError, GraphResult};
use crate::id::{EdgeId, NodeId};
use crate::node::{HandleDirection, Node};
use crate::position::Position;

/// An editable graph of nodes and edges.
///
/// Invariants upheld by every mutation:
/// - node ids and edge ids are each unique within the document;
/// - every edge's endpoints resolve to nodes in the same document;
/// - a failed mutation leaves the document untouched.
///
/// Internally backed by a `StableDiGraph` so indices survive node
/// removal, with id-to-index maps for lookup by wire id.
#[derive(Debug, Clone, Default)]
pub struct GraphDocument {
    graph: StableDiGraph<Node, Edge>,
    node_indices: HashMap<NodeId, NodeIndex>,
    edge_indices: HashMap<EdgeId, EdgeIndex>,
}

impl GraphDocument {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a document from node and edge sets, validating the
    /// referential invariant and id uniqueness. All-or-nothing.
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> GraphResult<Self> {
        let mut document = Self::new();
        for node in nodes {
            document.add_node(node)?;
        }
        for edge in edges {
            document.insert_edge(edge)?;
        }
        Ok(document)
    }

    /// Returns the node and edge sets as owned vectors.
    pub fn to_parts(&self) -> (Vec<Node>, Vec<Edge>) {
        (
            self.graph.node_weights().cloned().collect(),
            self.graph.edge_weights().cloned().collect(),
        )
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns whether the document has no nodes and no edges.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0 && self.graph.edge_count() == 0
    }

    /// Returns whether a node with the given id exists.
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node_indices.contains_key(id)
    }

    /// Returns whether an edge with the given id exists.
    pub fn contains_edge(&self, id: &EdgeId) -> bool {
        self.edge_indices.contains_key(id)
    }

    /// Returns a reference to a node.
    pub fn get_node(&self, id: &NodeId) -> Option<&Node> {
        let index = self.node_indices.get(id)?;
        self.graph.node_weight(*index)
    }

    /// Returns a reference to an edge.
    pub fn get_edge(&self, id: &EdgeId) -> Option<&Edge> {
        let index = self.edge_indices.get(id)?;
        self.graph.edge_weight(*index)
    }

    /// Returns an iterator over all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// Returns an iterator over all edges.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.graph.edge_weights()
    }

    /// Adds a node, failing when its id is already taken.
    pub fn add_node(&mut self, node: Node) -> GraphResult<NodeId> {
        if self.node_indices.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        let id = node.id.clone();
        let index = self.graph.add_node(node);
        self.node_indices.insert(id.clone(), index);
        Ok(id)
    }

    /// Validates a connection gesture without mutating the document.
    ///
    /// Checks that both endpoints exist and that neither resolved
    /// handle is at its declared capacity.
    pub fn check_connection(&self, connection: &Connection) -> GraphResult<()> {
        let source = self.node_index(&connection.source)?;
        let target = self.node_index(&connection.target)?;
        self.check_capacity(source, HandleDirection::Source, connection.source_handle.as_deref())?;
        self.check_capacity(target, HandleDirection::Target, connection.target_handle.as_deref())?;
        Ok(())
    }

    /// Connects two nodes, assigning a fresh edge id.
    ///
    /// Fails with [`GraphError::MissingEndpoint`] when an endpoint is
    /// absent and [`GraphError::HandleAtCapacity`] when a declared
    /// connection cap would be exceeded.
    pub fn add_edge(&mut self, connection: Connection) -> GraphResult<EdgeId> {
        self.check_connection(&connection)?;
        let source = self.node_index(&connection.source)?;
        let target = self.node_index(&connection.target)?;
        let edge = Edge::from_connection(connection);
        let id = edge.id.clone();
        let index = self.graph.add_edge(source, target, edge);
        self.edge_indices.insert(id.clone(), index);
        Ok(id)
    }

    /// Inserts a fully formed edge (the load path).
    ///
    /// Honors only id uniqueness and the referential invariant;
    /// capacity is an editing-time constraint and is not re-checked
    /// against persisted documents.
    pub fn insert_edge(&mut self, edge: Edge) -> GraphResult<EdgeId> {
        if self.edge_indices.contains_key(&edge.id) {
            return Err(GraphError::DuplicateEdge(edge.id));
        }
        let source = self.node_index(&edge.source)?;
        let target = self.node_index(&edge.target)?;
        let id = edge.id.clone();
        let index = self.graph.add_edge(source, target, edge);
        self.edge_indices.insert(id.clone(), index);
        Ok(id)
    }

    /// Removes a node and all its incident edges.
    pub fn remove_node(&mut self, id: &NodeId) -> Option<Node> {
        let index = self.node_indices.remove(id)?;
        let incident: Vec<EdgeId> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .chain(self.graph.edges_directed(index, Direction::Incoming))
            .map(|edge| edge.weight().id.clone())
            .collect();
        for edge_id in &incident {
            self.edge_indices.remove(edge_id);
        }
        self.graph.remove_node(index)
    }

    /// Removes an edge.
    pub fn remove_edge(&mut self, id: &EdgeId) -> Option<Edge> {
        let index = self.edge_indices.remove(id)?;
        self.graph.remove_edge(index)
    }

    /// Updates a node's position, returning whether the node exists.
    pub fn set_position(&mut self, id: &NodeId, position: Position) -> bool {
        let Some(index) = self.node_indices.get(id) else {
            return false;
        };
        match self.graph.node_weight_mut(*index) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    /// Atomically replaces the entire node and edge sets (the reload
    /// path). On any validation failure the prior state is kept.
    pub fn replace_all(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) -> GraphResult<()> {
        let next = Self::from_parts(nodes, edges)?;
        tracing::debug!(
            target: TRACING_TARGET,
            nodes = next.node_count(),
            edges = next.edge_count(),
            "replacing graph document"
        );
        *self = next;
        Ok(())
    }

    fn node_index(&self, id: &NodeId) -> GraphResult<NodeIndex> {
        self.node_indices
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::MissingEndpoint(id.clone()))
    }

    fn check_capacity(
        &self,
        index: NodeIndex,
        direction: HandleDirection,
        handle_name: Option<&str>,
    ) -> GraphResult<()> {
        let Some(node) = self.graph.node_weight(index) else {
            return Ok(());
        };
        // Unresolved handles are unconstrained: nodes declare caps by
        // listing handles, and undeclared handles accept anything.
        let Some(handle) = node.handle(direction, handle_name) else {
            return Ok(());
        };
        let Some(capacity) = handle.capacity else {
            return Ok(());
        };
        let occupied = self.occupancy(index, direction, &handle.id);
        if occupied as u32 >= capacity {
            return Err(GraphError::HandleAtCapacity {
                node: node.id.clone(),
                handle: handle.id.clone(),
                capacity,
            });
        }
        Ok(())
    }

    /// Counts edges attached to the given handle of a node. Edge
    /// endpoints without a handle name count against the node's sole
    /// handle in that direction, mirroring how they were resolved at
    /// connect time.
    fn occupancy(&self, index: NodeIndex, direction: HandleDirection, handle_id: &str) -> usize {
        let petgraph_dir = match direction {
            HandleDirection::Source => Direction::Outgoing,
            HandleDirection::Target => Direction::Incoming,
        };
        self.graph
            .edges_directed(index, petgraph_dir)
            .filter(|edge| {
                let named = match direction {
                    HandleDirection::Source => edge.weight().source_handle.as_deref(),
                    HandleDirection::Target => edge.weight().target_handle.as_deref(),
                };
                named.is_none_or(|name| name == handle_id)
            })
            .count()
    }
}

/// Order-independent set equality over nodes and edges, keyed by id.
impl PartialEq for GraphDocument {
    fn eq(&self, other: &Self) -> bool {
        self.node_count() == other.node_count()
            && self.edge_count() == other.edge_count()
            && self.nodes().all(|node| other.get_node(&node.id) == Some(node))
            && self.edges().all(|edge| other.get_edge(&edge.id) == Some(edge))
    }
}

#[derive(Default, Serialize, Deserialize)]
struct DocumentParts {
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    edges: Vec<Edge>,
}

impl Serialize for GraphDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (nodes, edges) = self.to_parts();
        DocumentParts { nodes, edges }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GraphDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let parts = DocumentParts::deserialize(deserializer)?;
        Self::from_parts(parts.nodes, parts.edges).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::HandleSpec;

    fn capped_node(id: &str) -> Node {
        let mut node = Node::new("custom");
        node.id = NodeId::new(id);
        node.handles = vec![
            HandleSpec::source("out").with_capacity(1),
            HandleSpec::target("in").with_capacity(1),
        ];
        node
    }

    fn plain_node(id: &str) -> Node {
        let mut node = Node::new("default");
        node.id = NodeId::new(id);
        node
    }

    #[test]
    fn test_add_node_ids_unique() {
        let mut doc = GraphDocument::new();
        let ids: Vec<NodeId> = (0..16)
            .map(|_| doc.add_node(Node::new("default")).unwrap())
            .collect();
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(doc.node_count(), 16);
    }

    #[test]
    fn test_add_node_rejects_duplicate_id() {
        let mut doc = GraphDocument::new();
        doc.add_node(plain_node("a")).unwrap();
        let err = doc.add_node(plain_node("a")).unwrap_err();
        assert_eq!(err, GraphError::DuplicateNode(NodeId::new("a")));
        assert_eq!(doc.node_count(), 1);
    }

    #[test]
    fn test_add_edge_missing_endpoint() {
        let mut doc = GraphDocument::new();
        doc.add_node(plain_node("a")).unwrap();

        let err = doc.add_edge(Connection::new("a", "ghost")).unwrap_err();
        assert_eq!(err, GraphError::MissingEndpoint(NodeId::new("ghost")));
        assert_eq!(doc.edge_count(), 0);

        let err = doc.add_edge(Connection::new("ghost", "a")).unwrap_err();
        assert_eq!(err, GraphError::MissingEndpoint(NodeId::new("ghost")));
        assert_eq!(doc.edge_count(), 0);
    }

    #[test]
    fn test_add_edge_capacity_cap_of_one() {
        let mut doc = GraphDocument::new();
        doc.add_node(capped_node("a")).unwrap();
        doc.add_node(capped_node("b")).unwrap();
        doc.add_node(capped_node("c")).unwrap();

        doc.add_edge(Connection::new("a", "b")).unwrap();
        assert_eq!(doc.edge_count(), 1);

        // Source handle on "a" is saturated.
        let err = doc.add_edge(Connection::new("a", "c")).unwrap_err();
        assert!(matches!(err, GraphError::HandleAtCapacity { capacity: 1, .. }));
        assert_eq!(doc.edge_count(), 1);

        // Target handle on "b" is saturated too.
        let err = doc.add_edge(Connection::new("c", "b")).unwrap_err();
        assert!(matches!(err, GraphError::HandleAtCapacity { .. }));
        assert_eq!(doc.edge_count(), 1);
    }

    #[test]
    fn test_handleless_nodes_accept_unlimited_connections() {
        let mut doc = GraphDocument::new();
        doc.add_node(plain_node("hub")).unwrap();
        for i in 0..5 {
            doc.add_node(plain_node(&format!("n{i}"))).unwrap();
            doc.add_edge(Connection::new("hub", format!("n{i}").as_str()))
                .unwrap();
        }
        assert_eq!(doc.edge_count(), 5);
    }

    #[test]
    fn test_named_handle_capacity() {
        let mut doc = GraphDocument::new();
        doc.add_node(capped_node("a")).unwrap();
        doc.add_node(capped_node("b")).unwrap();
        doc.add_node(capped_node("c")).unwrap();

        let conn = Connection::builder()
            .with_source(NodeId::new("a"))
            .with_target(NodeId::new("b"))
            .with_source_handle("out".to_owned())
            .build()
            .unwrap();
        doc.add_edge(conn).unwrap();

        // The named handle and the sole-handle fallback saturate
        // the same connection point.
        let err = doc.add_edge(Connection::new("a", "c")).unwrap_err();
        assert!(matches!(err, GraphError::HandleAtCapacity { .. }));
    }

    #[test]
    fn test_replace_all_atomicity() {
        let mut doc = GraphDocument::new();
        doc.add_node(plain_node("keep")).unwrap();

        let dangling = Edge {
            id: EdgeId::new("e"),
            source: NodeId::new("x"),
            target: NodeId::new("ghost"),
            source_handle: None,
            target_handle: None,
        };
        let err = doc
            .replace_all(vec![plain_node("x")], vec![dangling])
            .unwrap_err();
        assert!(matches!(err, GraphError::MissingEndpoint(_)));

        // Prior state intact.
        assert_eq!(doc.node_count(), 1);
        assert!(doc.contains_node(&NodeId::new("keep")));
    }

    #[test]
    fn test_replace_all_rejects_duplicate_node_ids() {
        let mut doc = GraphDocument::new();
        doc.add_node(plain_node("keep")).unwrap();
        let err = doc
            .replace_all(vec![plain_node("x"), plain_node("x")], vec![])
            .unwrap_err();
        assert_eq!(err, GraphError::DuplicateNode(NodeId::new("x")));
        assert!(doc.contains_node(&NodeId::new("keep")));
    }

    #[test]
    fn test_replace_all_swaps_state() {
        let mut doc = GraphDocument::new();
        doc.add_node(plain_node("old")).unwrap();

        let edge = Edge {
            id: EdgeId::new("e1"),
            source: NodeId::new("a"),
            target: NodeId::new("b"),
            source_handle: None,
            target_handle: None,
        };
        doc.replace_all(vec![plain_node("a"), plain_node("b")], vec![edge])
            .unwrap();

        assert!(!doc.contains_node(&NodeId::new("old")));
        assert_eq!(doc.node_count(), 2);
        assert_eq!(doc.edge_count(), 1);
    }

    #[test]
    fn test_remove_node_drops_incident_edges() {
        let mut doc = GraphDocument::new();
        doc.add_node(plain_node("a")).unwrap();
        doc.add_node(plain_node("b")).unwrap();
        doc.add_node(plain_node("c")).unwrap();
        doc.add_edge(Connection::new("a", "b")).unwrap();
        let kept = doc.add_edge(Connection::new("b", "c")).unwrap();

        doc.remove_node(&NodeId::new("a")).unwrap();
        assert_eq!(doc.node_count(), 2);
        assert_eq!(doc.edge_count(), 1);
        assert!(doc.contains_edge(&kept));

        // Removal never recycles ids; re-adding gets a fresh one.
        let readded = doc.add_node(Node::new("default")).unwrap();
        assert_ne!(readded, NodeId::new("a"));
    }

    #[test]
    fn test_set_position() {
        let mut doc = GraphDocument::new();
        let id = doc.add_node(plain_node("a")).unwrap();
        assert!(doc.set_position(&id, Position::new(300.0, 120.0)));
        assert_eq!(doc.get_node(&id).unwrap().position, Position::new(300.0, 120.0));
        assert!(!doc.set_position(&NodeId::new("ghost"), Position::default()));
    }

    #[test]
    fn test_serde_round_trip_set_equality() {
        let mut doc = GraphDocument::new();
        doc.add_node(capped_node("1")).unwrap();
        doc.add_node(plain_node("2")).unwrap();
        doc.add_edge(Connection::new("1", "2")).unwrap();

        let json = serde_json::to_string(&doc).unwrap();
        let back: GraphDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_deserialize_missing_arrays_default_to_empty() {
        let doc: GraphDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_deserialize_dangling_edge_is_all_or_nothing() {
        let payload = r#"{
            "nodes": [{"id": "1", "type": "default", "position": {"x": 0.0, "y": 0.0}}],
            "edges": [{"id": "e", "source": "1", "target": "ghost"}]
        }"#;
        assert!(serde_json::from_str::<GraphDocument>(payload).is_err());
    }
}
