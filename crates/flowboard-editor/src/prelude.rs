//! Prelude module for convenient imports.
//!
//! ```rust
//! use flowboard_editor::prelude::*;
//! ```

pub use crate::autosave::{AutosaveConfig, AutosaveController, AutosaveHandle};
pub use crate::plugins::{NodeRenderer, NodeVisual, RendererRegistry};
pub use crate::session::EditorSession;
pub use crate::surface::EditorSurface;
