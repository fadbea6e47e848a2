//! Prelude module for convenient imports.
//!
//! ```rust
//! use flowboard_graph::prelude::*;
//! ```

pub use crate::document::GraphDocument;
pub use crate::edge::{Connection, Edge};
pub use crate::error::{GraphError, GraphResult};
pub use crate::id::{EdgeId, NodeId};
pub use crate::node::{HandleDirection, HandleSpec, Node, NodeData};
pub use crate::position::Position;
