#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod document;
mod edge;
mod error;
mod id;
mod node;
mod position;

#[doc(hidden)]
pub mod prelude;

pub use document::GraphDocument;
pub use edge::{Connection, ConnectionBuilder, Edge};
pub use error::{GraphError, GraphResult};
pub use id::{EdgeId, NodeId};
pub use node::{HandleDirection, HandleSpec, Node, NodeBuilder, NodeData};
pub use position::Position;

/// Tracing target for graph document operations.
pub const TRACING_TARGET: &str = "flowboard_graph";
