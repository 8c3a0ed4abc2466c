//! Renderer capability interface
//!
//! The controller never touches a scene directly. Everything it needs from
//! the rendered output goes through [`SceneRenderer`], so the same stepping
//! logic can drive a class-toggled vector document, a canvas, or a remote
//! presentation layer.

use std::fmt;

use crate::core::Result;

/// Emphasis operations over a rendered scene
pub trait SceneRenderer {
    /// Handle to one element of the scene
    type Element: Clone + fmt::Debug;

    /// Every element classified as a diagram node or connector
    fn graphic_elements(&self) -> Vec<Self::Element>;

    /// Every element a style pass must reset
    ///
    /// Graphic elements plus any other element still carrying a marker
    /// (a label matched by an earlier step, for instance).
    fn styled_elements(&self) -> Vec<Self::Element> {
        self.graphic_elements()
    }

    /// Resolve a selector pattern
    ///
    /// A malformed pattern is `InvalidSelector`; zero matches is `NoMatches`.
    fn resolve(&self, pattern: &str) -> Result<Vec<Self::Element>>;

    /// Drop every emphasis, de-emphasis and pulse marker
    fn clear_emphasis(&mut self, elements: &[Self::Element]);

    /// Put elements into the de-emphasized state
    fn de_emphasize(&mut self, elements: &[Self::Element]);

    /// Put elements into the emphasized state
    fn emphasize(&mut self, elements: &[Self::Element]);

    /// Add the attention marker used for a step's primary subject
    fn pulse(&mut self, elements: &[Self::Element]);
}
