//! Position feedback: counter, progress indicator, description, listener

use serde::Serialize;
use tracing::{debug, trace};

use crate::controller::StepStore;
use crate::core::{ControlIds, ControlSurface, Step};

/// Description shown when there are no steps
pub const EMPTY_DESCRIPTION: &str = "No steps defined";
pub const PLAY_LABEL: &str = "Play";
pub const PAUSE_LABEL: &str = "Pause";

/// Caller-supplied step change hook, called with `(index, step)`
pub type StepListener = Box<dyn FnMut(usize, &Step)>;

/// Externally visible position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
    pub index: Option<usize>,
    pub total: usize,
    pub counter: String,
    pub percent: f64,
    pub description: String,
}

impl Progress {
    pub fn of(store: &StepStore) -> Self {
        let total = store.len();
        match (store.index(), store.current()) {
            (Some(index), Some(step)) => Self {
                index: Some(index),
                total,
                counter: format!("Step {} of {}", index + 1, total),
                percent: (index + 1) as f64 / total as f64 * 100.0,
                description: step.description.clone(),
            },
            _ => Self {
                index: None,
                total: 0,
                counter: "Step 0 of 0".to_string(),
                percent: 0.0,
                description: EMPTY_DESCRIPTION.to_string(),
            },
        }
    }
}

/// Enabled state of the navigation affordances and the play label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Affordances {
    pub previous_disabled: bool,
    pub next_disabled: bool,
    pub play_label: &'static str,
}

impl Affordances {
    pub fn of(store: &StepStore, playing: bool) -> Self {
        Self {
            previous_disabled: store.is_first(),
            next_disabled: store.is_last(),
            play_label: if playing { PAUSE_LABEL } else { PLAY_LABEL },
        }
    }

    pub fn apply<S: ControlSurface>(&self, surface: &mut S, controls: &ControlIds) {
        surface.set_disabled(&controls.previous, self.previous_disabled);
        surface.set_disabled(&controls.next, self.next_disabled);
        surface.set_text(&controls.play, self.play_label);
    }
}

/// Writes [`Progress`] to the control surface and notifies the listener
pub struct ProgressReporter {
    counter: String,
    description: String,
    indicator: Option<String>,
    listener: Option<StepListener>,
}

impl ProgressReporter {
    pub fn new(controls: &ControlIds) -> Self {
        Self {
            counter: controls.counter.clone(),
            description: controls.description.clone(),
            indicator: controls.progress.clone(),
            listener: None,
        }
    }

    pub fn with_listener(mut self, listener: StepListener) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn has_listener(&self) -> bool {
        self.listener.is_some()
    }

    pub fn report<S: ControlSurface>(&mut self, surface: &mut S, store: &StepStore) -> Progress {
        let progress = Progress::of(store);
        surface.set_text(&self.counter, &progress.counter);
        surface.set_text(&self.description, &progress.description);

        if let Some(indicator) = &self.indicator {
            if surface.has_control(indicator) {
                surface.set_progress(indicator, progress.percent);
            } else {
                debug!(control = %indicator, "Progress indicator not present");
            }
        }

        if let (Some(listener), Some(index), Some(step)) =
            (self.listener.as_mut(), store.index(), store.current())
        {
            trace!(index, step = %step.id, "Notifying step listener");
            listener(index, step);
        }
        progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ControlPanel;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn store(count: usize) -> StepStore {
        StepStore::new(
            (0..count)
                .map(|i| Step::new(format!("s{}", i), format!("Description {}", i)))
                .collect(),
        )
    }

    #[test]
    fn test_progress_values() {
        let mut steps = store(4);
        steps.next();
        let progress = Progress::of(&steps);
        assert_eq!(progress.counter, "Step 2 of 4");
        assert_eq!(progress.percent, 50.0);
        assert_eq!(progress.description, "Description 1");
    }

    #[test]
    fn test_empty_state() {
        let progress = Progress::of(&store(0));
        assert_eq!(progress.counter, "Step 0 of 0");
        assert_eq!(progress.percent, 0.0);
        assert_eq!(progress.description, EMPTY_DESCRIPTION);
    }

    #[test]
    fn test_report_writes_controls_and_notifies() {
        let controls = ControlIds::default();
        let mut panel = ControlPanel::for_controls(&controls);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut reporter = ProgressReporter::new(&controls)
            .with_listener(Box::new(move |index, step| {
                sink.borrow_mut().push((index, step.id.clone()))
            }));

        let mut steps = store(3);
        steps.next();
        steps.next();
        reporter.report(&mut panel, &steps);

        assert_eq!(panel.text("step-counter"), Some("Step 3 of 3"));
        assert_eq!(panel.text("step-description"), Some("Description 2"));
        assert_eq!(panel.progress("progress-bar"), Some(100.0));
        assert_eq!(*seen.borrow(), vec![(2, "s2".to_string())]);
    }

    #[test]
    fn test_empty_report_skips_listener() {
        let controls = ControlIds::default();
        let mut panel = ControlPanel::for_controls(&controls);
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        let mut reporter = ProgressReporter::new(&controls)
            .with_listener(Box::new(move |_, _| *counter.borrow_mut() += 1));

        reporter.report(&mut panel, &store(0));
        assert_eq!(*calls.borrow(), 0);
        assert_eq!(panel.text("step-description"), Some(EMPTY_DESCRIPTION));
    }

    #[test]
    fn test_affordances() {
        let mut steps = store(3);
        assert_eq!(
            Affordances::of(&steps, false),
            Affordances {
                previous_disabled: true,
                next_disabled: false,
                play_label: PLAY_LABEL,
            }
        );
        steps.next();
        steps.next();
        let state = Affordances::of(&steps, true);
        assert!(!state.previous_disabled && state.next_disabled);
        assert_eq!(state.play_label, PAUSE_LABEL);

        let empty = Affordances::of(&store(0), false);
        assert!(empty.previous_disabled && empty.next_disabled);
    }
}
