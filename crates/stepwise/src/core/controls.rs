//! UI affordances the controller drives
//!
//! [`ControlSurface`] is whatever hosts the buttons, counter and progress
//! indicator. [`ControlPanel`] is the in-memory implementation used by the
//! terminal host and tests.

use std::collections::BTreeMap;

use crate::core::ControlIds;

/// Host-side widgets addressed by id
pub trait ControlSurface {
    /// Whether `id` resolves to a widget
    fn has_control(&self, id: &str) -> bool;

    fn set_disabled(&mut self, id: &str, disabled: bool);

    fn set_text(&mut self, id: &str, text: &str);

    /// Set a proportional indicator, in percent
    fn set_progress(&mut self, id: &str, percent: f64);
}

/// State of one widget in a [`ControlPanel`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Widget {
    pub text: String,
    pub disabled: bool,
    pub progress: f64,
}

/// In-memory control surface
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ControlPanel {
    widgets: BTreeMap<String, Widget>,
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// A panel with one widget per configured id, progress included if set
    pub fn for_controls(controls: &ControlIds) -> Self {
        let mut panel = Self::new();
        for (_, id) in controls.required() {
            panel.add(id);
        }
        if let Some(progress) = &controls.progress {
            panel.add(progress);
        }
        panel
    }

    pub fn with_control(mut self, id: &str) -> Self {
        self.add(id);
        self
    }

    pub fn without_control(mut self, id: &str) -> Self {
        self.widgets.remove(id);
        self
    }

    pub fn add(&mut self, id: &str) {
        self.widgets.entry(id.to_string()).or_default();
    }

    pub fn widget(&self, id: &str) -> Option<&Widget> {
        self.widgets.get(id)
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.widgets.get(id).map(|w| w.text.as_str())
    }

    pub fn is_disabled(&self, id: &str) -> Option<bool> {
        self.widgets.get(id).map(|w| w.disabled)
    }

    pub fn progress(&self, id: &str) -> Option<f64> {
        self.widgets.get(id).map(|w| w.progress)
    }
}

impl ControlSurface for ControlPanel {
    fn has_control(&self, id: &str) -> bool {
        self.widgets.contains_key(id)
    }

    fn set_disabled(&mut self, id: &str, disabled: bool) {
        if let Some(widget) = self.widgets.get_mut(id) {
            widget.disabled = disabled;
        }
    }

    fn set_text(&mut self, id: &str, text: &str) {
        if let Some(widget) = self.widgets.get_mut(id) {
            widget.text = text.to_string();
        }
    }

    fn set_progress(&mut self, id: &str, percent: f64) {
        if let Some(widget) = self.widgets.get_mut(id) {
            widget.progress = percent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_for_default_controls() {
        let panel = ControlPanel::for_controls(&ControlIds::default());
        for id in [
            "prev-btn",
            "next-btn",
            "reset-btn",
            "play-btn",
            "step-counter",
            "step-description",
            "progress-bar",
        ] {
            assert!(panel.has_control(id), "missing {}", id);
        }
    }

    #[test]
    fn test_updates_ignore_unknown_ids() {
        let mut panel = ControlPanel::new().with_control("counter");
        panel.set_text("counter", "Step 1 of 2");
        panel.set_text("ghost", "ignored");
        assert_eq!(panel.text("counter"), Some("Step 1 of 2"));
        assert_eq!(panel.text("ghost"), None);
    }
}
