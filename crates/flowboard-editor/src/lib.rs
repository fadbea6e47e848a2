#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod autosave;
mod session;
mod surface;

pub mod plugins;

#[doc(hidden)]
pub mod prelude;

pub use autosave::{AutosaveConfig, AutosaveController, AutosaveHandle};
pub use session::EditorSession;
pub use surface::EditorSurface;

/// Tracing target for editor operations.
pub const TRACING_TARGET: &str = "flowboard_editor";
