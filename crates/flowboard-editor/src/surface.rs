//! Gesture adapter: turns canvas interactions into document mutations.

use flowboard_graph::{
    Connection, EdgeId, GraphDocument, GraphError, GraphResult, Node, NodeData, NodeId, Position,
};
use rand::RngExt;

use crate::TRACING_TARGET;
use crate::plugins::RendererRegistry;
use crate::session::EditorSession;

/// Where the first node lands on an empty canvas.
const DEFAULT_POSITION: Position = Position { x: 100.0, y: 150.0 };

/// Horizontal gap between the rightmost node and a new one.
const HORIZONTAL_SPACING: f32 = 200.0;

/// Vertical jitter applied relative to the topmost node.
const VERTICAL_JITTER: f32 = 50.0;

/// Adapts user gestures from the rendering library into validated
/// [`GraphDocument`] mutations on an [`EditorSession`].
///
/// Gesture rejections (capacity violations, stale endpoints) are
/// routine user actions, so they surface as logged no-ops rather
/// than errors.
#[derive(Debug, Clone)]
pub struct EditorSurface {
    session: EditorSession,
    renderers: RendererRegistry,
}

impl EditorSurface {
    /// Creates a surface over a session with the given renderers.
    pub fn new(session: EditorSession, renderers: RendererRegistry) -> Self {
        Self { session, renderers }
    }

    /// Returns the session this surface mutates.
    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    /// Returns the renderer registry.
    pub fn renderers(&self) -> &RendererRegistry {
        &self.renderers
    }

    /// Handles the "add node" gesture.
    ///
    /// Places the node past the rightmost existing node with a small
    /// vertical jitter, labels it `Node <n>`, and gives it the
    /// handles declared by the renderer for `type_tag`.
    pub fn add_node(&self, type_tag: &str) -> GraphResult<NodeId> {
        let (position, ordinal) = self
            .session
            .read(|doc| (next_position(doc), doc.node_count() + 1));

        let mut node = Node::new(type_tag);
        node.data = NodeData::with_label(format!("Node {ordinal}"));
        node.position = position;
        node.handles = self.renderers.get(type_tag).handles();

        let id = self.session.mutate(|doc| doc.add_node(node))?;
        tracing::debug!(
            target: TRACING_TARGET,
            node = %id,
            type_tag,
            x = position.x,
            y = position.y,
            "node added"
        );
        Ok(id)
    }

    /// Handles the connect gesture.
    ///
    /// Connections violating an endpoint's declared capacity, or
    /// referencing nodes that no longer exist, are rejected as
    /// no-ops before any mutation happens.
    pub fn connect(&self, connection: Connection) -> Option<EdgeId> {
        if let Err(error) = self.session.read(|doc| doc.check_connection(&connection)) {
            tracing::debug!(
                target: TRACING_TARGET,
                error = %error,
                "connection rejected"
            );
            return None;
        }
        match self.session.mutate(|doc| doc.add_edge(connection)) {
            Ok(id) => {
                tracing::debug!(target: TRACING_TARGET, edge = %id, "edge connected");
                Some(id)
            }
            Err(error) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    error = %error,
                    "connection rejected"
                );
                None
            }
        }
    }

    /// Handles a node drag: updates the position, returning whether
    /// the node still exists.
    pub fn move_node(&self, id: &NodeId, position: Position) -> bool {
        self.session
            .mutate(|doc| {
                if doc.set_position(id, position) {
                    Ok(())
                } else {
                    Err(GraphError::MissingEndpoint(id.clone()))
                }
            })
            .is_ok()
    }

    /// Handles node deletion, dropping incident edges.
    pub fn remove_node(&self, id: &NodeId) -> bool {
        self.session
            .mutate(|doc| {
                doc.remove_node(id)
                    .map(|_| ())
                    .ok_or_else(|| GraphError::MissingEndpoint(id.clone()))
            })
            .is_ok()
    }

    /// Handles edge deletion.
    pub fn remove_edge(&self, id: &EdgeId) -> bool {
        self.session
            .mutate(|doc| {
                doc.remove_edge(id)
                    .map(|_| ())
                    .ok_or_else(|| GraphError::MissingEdge(id.clone()))
            })
            .is_ok()
    }
}

/// Placement heuristic: offset horizontally past the rightmost node,
/// jittered vertically around the topmost one; fixed default on an
/// empty canvas.
fn next_position(document: &GraphDocument) -> Position {
    if document.node_count() == 0 {
        return DEFAULT_POSITION;
    }
    let max_x = document
        .nodes()
        .map(|n| n.position.x)
        .fold(f32::NEG_INFINITY, f32::max);
    let min_y = document
        .nodes()
        .map(|n| n.position.y)
        .fold(f32::INFINITY, f32::min);
    let jitter = rand::rng().random_range(-VERTICAL_JITTER..VERTICAL_JITTER);
    Position::new(max_x + HORIZONTAL_SPACING, min_y + jitter)
}
