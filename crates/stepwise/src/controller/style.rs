//! Style applier: turns "current step" into emphasis on the scene
//!
//! Every pass starts from a clean slate: every element loses previous
//! markers and all graphic elements become de-emphasized. Then each selector of the step is
//! resolved in order and its matches are emphasized. The first selector's
//! matches also pulse. A selector that fails is logged and skipped.

use serde::Serialize;
use tracing::{debug, error, span, Level};

use crate::core::{SceneRenderer, Step, WalkthroughError};

/// A selector that could not be applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorFailure {
    pub step: String,
    /// Position of the selector within the step
    pub position: usize,
    pub selector: String,
    /// True for syntax errors, false for patterns that matched nothing
    pub malformed: bool,
    pub message: String,
}

impl SelectorFailure {
    fn new(step: &Step, position: usize, selector: &str, error: &WalkthroughError) -> Self {
        Self {
            step: step.id.clone(),
            position,
            selector: selector.to_string(),
            malformed: matches!(error, WalkthroughError::InvalidSelector { .. }),
            message: error.to_string(),
        }
    }
}

/// Outcome of one style pass
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct StyleReport {
    pub step: Option<String>,
    /// Graphic elements reset to de-emphasized
    pub graphic_elements: usize,
    /// Matches emphasized, counted per selector
    pub emphasized: usize,
    pub pulsed: usize,
    pub failures: Vec<SelectorFailure>,
}

impl StyleReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Applies a step's emphasis through a [`SceneRenderer`]
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleApplier;

impl StyleApplier {
    pub fn new() -> Self {
        Self
    }

    /// Restyle the scene for `step` (`None` leaves everything de-emphasized)
    pub fn apply<R: SceneRenderer>(&self, renderer: &mut R, step: Option<&Step>) -> StyleReport {
        let style_span = span!(
            Level::DEBUG,
            "apply_style",
            step = step.map(|s| s.id.as_str()).unwrap_or("<none>")
        );
        let _enter = style_span.enter();

        let stale = renderer.styled_elements();
        renderer.clear_emphasis(&stale);
        let graphic = renderer.graphic_elements();
        renderer.de_emphasize(&graphic);

        let mut report = StyleReport {
            step: step.map(|s| s.id.clone()),
            graphic_elements: graphic.len(),
            ..StyleReport::default()
        };

        let Some(step) = step else {
            return report;
        };

        for (position, pattern) in step.elements.iter().enumerate() {
            match renderer.resolve(pattern) {
                Ok(matched) => {
                    renderer.emphasize(&matched);
                    report.emphasized += matched.len();
                    if position == 0 {
                        renderer.pulse(&matched);
                        report.pulsed += matched.len();
                    }
                }
                Err(e) => {
                    error!(step = %step.id, selector = %pattern, error = %e, "Selector skipped");
                    report
                        .failures
                        .push(SelectorFailure::new(step, position, pattern, &e));
                }
            }
        }

        debug!(
            emphasized = report.emphasized,
            pulsed = report.pulsed,
            failures = report.failures.len(),
            "Style applied"
        );
        report
    }
}

/// Resolve every selector of every step without restyling anything
pub fn check_selectors<R: SceneRenderer>(steps: &[Step], renderer: &R) -> Vec<SelectorFailure> {
    steps
        .iter()
        .flat_map(|step| {
            step.elements
                .iter()
                .enumerate()
                .filter_map(move |(position, pattern)| {
                    renderer
                        .resolve(pattern)
                        .err()
                        .map(|e| SelectorFailure::new(step, position, pattern, &e))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ElementId, EmphasisState, GraphicDocument, GraphicElement, Result};

    /// Records every call so ordering and the pulse rule can be asserted
    #[derive(Default)]
    struct RecordingRenderer {
        calls: Vec<String>,
    }

    impl SceneRenderer for RecordingRenderer {
        type Element = &'static str;

        fn graphic_elements(&self) -> Vec<&'static str> {
            vec!["a", "b", "c"]
        }

        fn resolve(&self, pattern: &str) -> Result<Vec<&'static str>> {
            match pattern {
                "#a" => Ok(vec!["a"]),
                "#b" => Ok(vec!["b"]),
                "#none" => Err(WalkthroughError::no_matches(pattern)),
                _ => Err(WalkthroughError::invalid_selector(pattern, "bad")),
            }
        }

        fn clear_emphasis(&mut self, elements: &[&'static str]) {
            self.calls.push(format!("clear {:?}", elements));
        }

        fn de_emphasize(&mut self, elements: &[&'static str]) {
            self.calls.push(format!("dim {:?}", elements));
        }

        fn emphasize(&mut self, elements: &[&'static str]) {
            self.calls.push(format!("emphasize {:?}", elements));
        }

        fn pulse(&mut self, elements: &[&'static str]) {
            self.calls.push(format!("pulse {:?}", elements));
        }
    }

    fn step(elements: &[&str]) -> Step {
        elements
            .iter()
            .fold(Step::new("s", "desc"), |step, e| step.with_element(*e))
    }

    #[test]
    fn test_reset_precedes_emphasis_and_only_first_pulses() {
        let mut renderer = RecordingRenderer::default();
        let report = StyleApplier::new().apply(&mut renderer, Some(&step(&["#a", "#b"])));

        assert_eq!(
            renderer.calls,
            vec![
                r#"clear ["a", "b", "c"]"#,
                r#"dim ["a", "b", "c"]"#,
                r#"emphasize ["a"]"#,
                r#"pulse ["a"]"#,
                r#"emphasize ["b"]"#,
            ]
        );
        assert_eq!(report.emphasized, 2);
        assert_eq!(report.pulsed, 1);
        assert!(report.is_clean());
    }

    #[test]
    fn test_failed_first_selector_means_no_pulse() {
        let mut renderer = RecordingRenderer::default();
        let report = StyleApplier::new().apply(&mut renderer, Some(&step(&["#none", "#b"])));

        assert!(!renderer.calls.iter().any(|c| c.starts_with("pulse")));
        assert_eq!(report.failures.len(), 1);
        assert!(!report.failures[0].malformed);
        assert_eq!(report.emphasized, 1);
    }

    #[test]
    fn test_no_step_dims_everything() {
        let mut renderer = RecordingRenderer::default();
        let report = StyleApplier::new().apply(&mut renderer, None);
        assert_eq!(renderer.calls.len(), 2);
        assert_eq!(report.step, None);
        assert_eq!(report.graphic_elements, 3);
    }

    fn document() -> GraphicDocument {
        let mut doc = GraphicDocument::new();
        let svg = doc.append(None, GraphicElement::new("svg"));
        doc.append(Some(svg), GraphicElement::node("valid"));
        doc.append(Some(svg), GraphicElement::node("other"));
        doc.append(Some(svg), GraphicElement::connector("valid-other"));
        doc
    }

    #[test]
    fn test_bad_selector_does_not_abort_step() {
        let mut doc = document();
        let report = StyleApplier::new().apply(&mut doc, Some(&step(&["#valid", "???bad"])));

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].selector, "???bad");
        assert!(report.failures[0].malformed);
        assert_eq!(
            doc.emphasis_state(ElementId(1)),
            Some(EmphasisState::Emphasized)
        );
        assert!(doc.is_pulsing(ElementId(1)));
    }

    #[test]
    fn test_every_graphic_element_in_exactly_one_state() {
        let mut doc = document();
        let applier = StyleApplier::new();
        for elements in [
            vec!["#valid", "path"],
            vec!["#other"],
            vec![],
            vec!["???", "#ghost"],
        ] {
            applier.apply(&mut doc, Some(&step(&elements)));
            for handle in doc.graphic_elements() {
                let state = doc.emphasis_state(handle).unwrap();
                assert!(
                    matches!(
                        state,
                        EmphasisState::Emphasized | EmphasisState::DeEmphasized
                    ),
                    "{:?} was {:?}",
                    handle,
                    state
                );
            }
        }
        // the last pass emphasized nothing and pulses were cleared
        assert!(doc.graphic_elements().iter().all(|h| !doc.is_pulsing(*h)));
    }

    #[test]
    fn test_label_markers_cleared_when_step_moves_on() {
        let mut doc = document();
        let label = doc.append(
            Some(ElementId(1)),
            GraphicElement::new("text").with_id("label-valid"),
        );
        let applier = StyleApplier::new();

        applier.apply(&mut doc, Some(&step(&["#label-valid"])));
        assert!(doc.is_pulsing(label));
        assert_eq!(doc.emphasis_state(label), Some(EmphasisState::Emphasized));

        applier.apply(&mut doc, Some(&step(&["#other"])));
        assert!(!doc.is_pulsing(label));
        assert_eq!(doc.emphasis_state(label), Some(EmphasisState::Unstyled));
        assert!(doc.element(label).unwrap().classes().is_empty());
        assert!(doc.is_pulsing(ElementId(2)));
    }

    #[test]
    fn test_check_selectors_reports_without_mutating() {
        let doc = document();
        let before = doc.clone();
        let steps = vec![step(&["#valid", "#ghost"]), step(&["[oops"])];
        let failures = check_selectors(&steps, &doc);

        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].position, 1);
        assert!(!failures[0].malformed);
        assert!(failures[1].malformed);
        assert_eq!(doc, before);
    }
}
