//! Core abstractions for walkthrough playback
//!
//! Configuration, the rendered-scene model and its selector language, the
//! renderer and control-surface seams, errors and logging.

mod config;
mod container;
mod controls;
mod document;
mod error;
pub mod logging;
mod renderer;
mod selector;
mod text;
mod types;

pub use config::*;
pub use container::*;
pub use controls::*;
pub use document::*;
pub use error::*;
pub use logging::*;
pub use renderer::*;
pub use selector::*;
pub use text::*;
pub use types::*;
