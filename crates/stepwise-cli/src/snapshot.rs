//! Text snapshots of a walkthrough's visible state
//!
//! A snapshot is what a host would show after a transition: the control
//! panel and the emphasis state of every graphic element.

use crossterm::style::{Color, Stylize};
use serde::Serialize;

use stepwise::controller::{Controller, SelectorFailure};
use stepwise::{
    display_width, truncate, wrap_text, ControlIds, ControlPanel, ElementKind, EmphasisState,
    GraphicDocument, SceneRenderer,
};

/// Widest element id shown before truncation
const ID_COLUMN: usize = 28;

/// One graphic element's state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementState {
    pub id: String,
    pub kind: ElementKind,
    pub state: EmphasisState,
    pub pulse: bool,
}

/// Visible walkthrough state after one action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub action: String,
    pub index: Option<usize>,
    pub counter: String,
    pub progress: Option<f64>,
    pub description: String,
    pub playing: bool,
    pub play_label: String,
    pub previous_disabled: bool,
    pub next_disabled: bool,
    pub elements: Vec<ElementState>,
    pub failures: Vec<SelectorFailure>,
}

impl Snapshot {
    pub fn capture(controller: &Controller<GraphicDocument, ControlPanel>, action: &str) -> Self {
        let panel = controller.surface();
        let controls: &ControlIds = controller.controls();
        let text = |id: &str| panel.text(id).unwrap_or_default().to_string();

        let elements = controller
            .document()
            .map(|document| {
                let doc = document.borrow();
                doc.graphic_elements()
                    .into_iter()
                    .filter_map(|handle| {
                        let element = doc.element(handle)?;
                        Some(ElementState {
                            id: element
                                .id
                                .clone()
                                .unwrap_or_else(|| format!("<{} {}>", element.tag, handle)),
                            kind: element.kind,
                            state: doc.emphasis_state(handle)?,
                            pulse: doc.is_pulsing(handle),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            action: action.to_string(),
            index: controller.current_index(),
            counter: text(&controls.counter),
            progress: controls.progress.as_deref().and_then(|id| panel.progress(id)),
            description: text(&controls.description),
            playing: controller.is_playing(),
            play_label: text(&controls.play),
            previous_disabled: panel.is_disabled(&controls.previous).unwrap_or(true),
            next_disabled: panel.is_disabled(&controls.next).unwrap_or(true),
            elements,
            failures: controller
                .last_style_report()
                .map(|report| report.failures.clone())
                .unwrap_or_default(),
        }
    }

    /// Plain or colored text block, descriptions wrapped to `width`
    pub fn render(&self, width: usize, color: bool) -> Vec<String> {
        let mut lines = Vec::new();

        let progress = self
            .progress
            .map(|percent| format!(" ({:.0}%)", percent))
            .unwrap_or_default();
        let header = format!("[{}] {}{}", self.action, self.counter, progress);
        lines.push(if color {
            header.bold().to_string()
        } else {
            header
        });

        lines.push(format!(
            "  {}  {}  {}",
            button("< Prev", self.previous_disabled, color),
            button(&self.play_label, false, color),
            button("Next >", self.next_disabled, color),
        ));

        for line in wrap_text(&self.description, width.saturating_sub(2)) {
            lines.push(format!("  {}", line));
        }

        for element in &self.elements {
            lines.push(element_line(element, color));
        }

        for failure in &self.failures {
            let line = format!("  ! {}: {}", failure.selector, failure.message);
            lines.push(if color {
                line.with(Color::Red).to_string()
            } else {
                line
            });
        }
        lines
    }
}

fn button(label: &str, disabled: bool, color: bool) -> String {
    let text = format!("[{}]", label);
    match (disabled, color) {
        (true, true) => text.with(Color::DarkGrey).to_string(),
        (true, false) => format!("({})", label),
        (false, _) => text,
    }
}

fn element_line(element: &ElementState, color: bool) -> String {
    let marker = match (element.state, element.pulse) {
        (_, true) => '*',
        (EmphasisState::Emphasized, false) => '+',
        (EmphasisState::DeEmphasized, false) => '-',
        _ => '?',
    };
    let id = truncate(&element.id, ID_COLUMN);
    let padding = " ".repeat(ID_COLUMN.saturating_sub(display_width(&id)));
    let line = format!(
        "  {} {}{} {:<9} {}",
        marker,
        id,
        padding,
        element.kind.to_string(),
        element.state
    );
    if !color {
        return line;
    }
    match element.state {
        EmphasisState::Emphasized if element.pulse => line.with(Color::Yellow).bold().to_string(),
        EmphasisState::Emphasized => line.with(Color::Yellow).to_string(),
        EmphasisState::DeEmphasized => line.with(Color::DarkGrey).to_string(),
        _ => line.with(Color::Red).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Snapshot {
        Snapshot {
            action: "next".to_string(),
            index: Some(1),
            counter: "Step 2 of 3".to_string(),
            progress: Some(66.666),
            description: "The gateway routes every request".to_string(),
            playing: false,
            play_label: "Play".to_string(),
            previous_disabled: false,
            next_disabled: false,
            elements: vec![
                ElementState {
                    id: "gateway".to_string(),
                    kind: ElementKind::Node,
                    state: EmphasisState::Emphasized,
                    pulse: true,
                },
                ElementState {
                    id: "client".to_string(),
                    kind: ElementKind::Node,
                    state: EmphasisState::DeEmphasized,
                    pulse: false,
                },
            ],
            failures: Vec::new(),
        }
    }

    #[test]
    fn test_plain_render() {
        let lines = snapshot().render(80, false);
        assert_eq!(lines[0], "[next] Step 2 of 3 (67%)");
        assert_eq!(lines[1], "  [< Prev]  [Play]  [Next >]");
        assert_eq!(lines[2], "  The gateway routes every request");
        assert!(lines[3].starts_with("  * gateway"));
        assert!(lines[4].starts_with("  - client"));
    }

    #[test]
    fn test_description_wraps() {
        let lines = snapshot().render(16, false);
        assert_eq!(lines[2], "  The gateway");
        assert_eq!(lines[3], "  routes every");
    }

    #[test]
    fn test_disabled_buttons_in_plain_text() {
        let mut snapshot = snapshot();
        snapshot.previous_disabled = true;
        assert_eq!(
            snapshot.render(80, false)[1],
            "  (< Prev)  [Play]  [Next >]"
        );
    }
}
