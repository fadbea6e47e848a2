//! Pluggable node appearances, keyed by type tag.
//!
//! The canvas library dispatches each node to a renderer by its type
//! tag. A renderer also declares the node's connection handles, which
//! is where per-handle capacity limits come from.

use std::collections::HashMap;
use std::sync::Arc;

use flowboard_graph::{HandleSpec, NodeData};

/// What a renderer produces for the canvas to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeVisual {
    /// Primary text shown on the node body.
    pub label: String,
    /// Secondary line, e.g. a constraint hint.
    pub detail: Option<String>,
}

impl NodeVisual {
    /// Creates a visual with just a label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            detail: None,
        }
    }

    /// Adds a detail line.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Capability implemented by each node appearance variant.
pub trait NodeRenderer: Send + Sync {
    /// Type tag this renderer is registered under.
    fn type_tag(&self) -> &str;

    /// Connection handles a node of this type exposes.
    fn handles(&self) -> Vec<HandleSpec>;

    /// Produces the visual for a node's payload.
    fn render(&self, data: &NodeData) -> NodeVisual;
}

/// Generic appearance: one unlimited input and one unlimited output.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRenderer;

impl NodeRenderer for DefaultRenderer {
    fn type_tag(&self) -> &str {
        "default"
    }

    fn handles(&self) -> Vec<HandleSpec> {
        vec![HandleSpec::target("in"), HandleSpec::source("out")]
    }

    fn render(&self, data: &NodeData) -> NodeVisual {
        NodeVisual::new(data.label().unwrap_or("node"))
    }
}

/// Appearance capped at one connection per side.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleConnectionRenderer;

impl NodeRenderer for SingleConnectionRenderer {
    fn type_tag(&self) -> &str {
        "custom"
    }

    fn handles(&self) -> Vec<HandleSpec> {
        vec![
            HandleSpec::target("in").with_capacity(1),
            HandleSpec::source("out").with_capacity(1),
        ]
    }

    fn render(&self, data: &NodeData) -> NodeVisual {
        NodeVisual::new(data.label().unwrap_or("node")).with_detail("connection limit 1")
    }
}

/// Registry mapping type tags to renderers.
///
/// Lookup never fails: unknown tags fall back to a generic renderer.
#[derive(Clone)]
pub struct RendererRegistry {
    renderers: HashMap<String, Arc<dyn NodeRenderer>>,
    fallback: Arc<dyn NodeRenderer>,
}

impl std::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("tags", &self.tags().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl RendererRegistry {
    /// Creates an empty registry with [`DefaultRenderer`] as fallback.
    pub fn new() -> Self {
        Self {
            renderers: HashMap::new(),
            fallback: Arc::new(DefaultRenderer),
        }
    }

    /// Creates a registry preloaded with the built-in renderers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DefaultRenderer));
        registry.register(Arc::new(SingleConnectionRenderer));
        registry
    }

    /// Registers a renderer under its own type tag, replacing any
    /// previous registration for that tag.
    pub fn register(&mut self, renderer: Arc<dyn NodeRenderer>) {
        self.renderers
            .insert(renderer.type_tag().to_owned(), renderer);
    }

    /// Looks up the renderer for a tag, falling back to the generic
    /// renderer for unknown tags.
    pub fn get(&self, type_tag: &str) -> &Arc<dyn NodeRenderer> {
        self.renderers.get(type_tag).unwrap_or(&self.fallback)
    }

    /// Returns whether a tag has an explicit registration.
    pub fn contains(&self, type_tag: &str) -> bool {
        self.renderers.contains_key(type_tag)
    }

    /// Iterates over the registered tags.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.renderers.keys().map(String::as_str)
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
