//! Stepwise - step-sequenced walkthroughs over rendered diagrams
//!
//! A [`Controller`](controller::Controller) waits for an external renderer to
//! put its output into a container, then walks through a list of steps. Each
//! step emphasizes the scene elements its selectors match and dims the rest.
//! Navigation comes from bound buttons and keys, or from timed playback.
//!
//! # Quick Start
//!
//! ```rust
//! use stepwise::prelude::*;
//!
//! let config = WalkthroughConfig::new(
//!     "diagram",
//!     vec![
//!         Step::new("intro", "The entry point").with_element("#A"),
//!         Step::new("flow", "Where it goes").with_element("#B"),
//!     ],
//! );
//!
//! let mut scene = GraphicDocument::new();
//! let svg = scene.append(None, GraphicElement::new("svg"));
//! scene.append(Some(svg), GraphicElement::node("A"));
//! scene.append(Some(svg), GraphicElement::node("B"));
//!
//! let container = Container::new("diagram");
//! container.insert_rendered(scene);
//!
//! let panel = ControlPanel::for_controls(&config.controls);
//! let mut controller = Controller::new(config, &container, panel).unwrap();
//! assert!(controller.next());
//! assert_eq!(controller.surface().text("step-counter"), Some("Step 2 of 2"));
//! ```

pub mod controller;
pub mod core;

pub use core::*;

use anyhow::Context;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::controller::{
        Activity, ControlBinder, Controller, KeyResponse, Progress, StyleReport,
    };
    pub use crate::core::{
        Command, Container, ControlIds, ControlPanel, ControlSurface, GraphicDocument,
        GraphicElement, Key, KeyPress, SceneRenderer, Step, WalkthroughConfig,
        WalkthroughError,
    };
}

/// Check every selector of a configuration against a scene
///
/// Both inputs are JSON. Returns the selectors that are malformed or match
/// nothing; an empty list means every step will style cleanly.
///
/// # Example
/// ```rust
/// let config = r##"{ "containerId": "d", "steps": [
///     { "id": "one", "elements": ["#A", "#ghost"] } ] }"##;
/// let scene = r#"{ "elements": [ { "tag": "g", "id": "A", "kind": "node" } ] }"#;
///
/// let failures = stepwise::audit(config, scene).unwrap();
/// assert_eq!(failures.len(), 1);
/// assert_eq!(failures[0].selector, "#ghost");
/// ```
pub fn audit(config_json: &str, scene_json: &str) -> anyhow::Result<Vec<controller::SelectorFailure>> {
    let config =
        WalkthroughConfig::from_json(config_json).context("Failed to load walkthrough configuration")?;
    let scene = GraphicDocument::from_json(scene_json).context("Failed to load scene")?;
    Ok(controller::check_selectors(&config.steps, &scene))
}
