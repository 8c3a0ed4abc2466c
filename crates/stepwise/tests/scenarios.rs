//! End-to-end walkthrough scenarios
//!
//! Navigation, playback and empty-state behavior observed through the
//! control surface and the scene's emphasis classes.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use stepwise::controller::{Activity, EMPTY_DESCRIPTION};
use stepwise::prelude::*;
use stepwise::{ElementId, EmphasisState};

fn scene() -> GraphicDocument {
    let mut doc = GraphicDocument::new();
    let svg = doc.append(None, GraphicElement::new("svg"));
    for id in ["A", "B", "C"] {
        doc.append(Some(svg), GraphicElement::node(id));
    }
    doc.append(Some(svg), GraphicElement::connector("A-B"));
    doc.append(Some(svg), GraphicElement::connector("B-C"));
    doc
}

fn steps(count: usize) -> Vec<Step> {
    ["A", "B", "C"]
        .iter()
        .cycle()
        .take(count)
        .enumerate()
        .map(|(i, id)| Step::new(format!("step-{}", i), format!("Look at {}", id)).with_element(format!("#{}", id)))
        .collect()
}

fn controller(
    count: usize,
) -> (
    Controller<GraphicDocument, ControlPanel>,
    Container<GraphicDocument>,
) {
    let config = WalkthroughConfig::new("diagram", steps(count)).with_play_interval_ms(1000);
    let container = Container::new("diagram");
    container.insert_rendered(scene());
    let panel = ControlPanel::for_controls(&config.controls);
    let controller = Controller::new(config, &container, panel).unwrap();
    (controller, container)
}

fn state_of(controller: &Controller<GraphicDocument, ControlPanel>, id: &str) -> EmphasisState {
    let document = controller.document().unwrap();
    let doc = document.borrow();
    let handle = doc.find_by_id(id).unwrap();
    doc.emphasis_state(handle).unwrap()
}

// =============================================================================
// Navigation
// =============================================================================

mod navigation {
    use super::*;

    #[test]
    fn test_next_from_first_enables_previous() {
        let (mut controller, _container) = controller(3);
        assert_eq!(controller.surface().is_disabled("prev-btn"), Some(true));

        assert!(controller.next());
        assert_eq!(controller.current_index(), Some(1));
        assert_eq!(controller.surface().is_disabled("prev-btn"), Some(false));
        assert_eq!(controller.surface().is_disabled("next-btn"), Some(false));
        assert_eq!(state_of(&controller, "B"), EmphasisState::Emphasized);
        assert_eq!(state_of(&controller, "A"), EmphasisState::DeEmphasized);
    }

    #[test]
    fn test_previous_back_to_first_disables_previous() {
        let (mut controller, _container) = controller(3);
        controller.next();
        controller.next();
        assert_eq!(controller.current_index(), Some(2));
        assert_eq!(controller.surface().is_disabled("next-btn"), Some(true));

        assert!(controller.previous());
        assert!(controller.previous());
        assert_eq!(controller.current_index(), Some(0));
        assert_eq!(controller.surface().is_disabled("prev-btn"), Some(true));
        assert!(!controller.previous());
        assert_eq!(controller.current_index(), Some(0));
    }

    #[test]
    fn test_next_at_last_is_noop() {
        let (mut controller, _container) = controller(2);
        controller.next();
        assert!(!controller.next());
        assert_eq!(controller.current_index(), Some(1));
    }

    #[test]
    fn test_counter_description_and_progress() {
        let (mut controller, _container) = controller(4);
        controller.next();
        let panel = controller.surface();
        assert_eq!(panel.text("step-counter"), Some("Step 2 of 4"));
        assert_eq!(panel.text("step-description"), Some("Look at B"));
        assert_eq!(panel.progress("progress-bar"), Some(50.0));
    }

    #[test]
    fn test_listener_sees_every_render() {
        let config = WalkthroughConfig::new("diagram", steps(3));
        let container = Container::new("diagram");
        container.insert_rendered(scene());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let panel = ControlPanel::for_controls(&config.controls);
        let mut controller =
            Controller::with_step_listener(config, &container, panel, move |index, step| {
                sink.borrow_mut().push((index, step.id.clone()))
            })
            .unwrap();

        controller.next();
        controller.reset();
        assert_eq!(
            *seen.borrow(),
            vec![
                (0, "step-0".to_string()),
                (1, "step-1".to_string()),
                (0, "step-0".to_string()),
            ]
        );
    }
}

// =============================================================================
// Playback
// =============================================================================

mod playback {
    use super::*;

    #[test]
    fn test_play_single_step_stops_within_call() {
        let (mut controller, _container) = controller(1);
        assert!(controller.play());
        assert!(!controller.is_playing());
        assert_eq!(controller.current_index(), Some(0));
        assert!(controller.playback().timer().is_none());
        assert_eq!(controller.surface().text("play-btn"), Some("Play"));
    }

    #[test]
    fn test_play_advances_immediately() {
        let (mut controller, _container) = controller(3);
        assert!(controller.play());
        assert!(controller.is_playing());
        assert_eq!(controller.current_index(), Some(1));
        assert_eq!(controller.surface().text("play-btn"), Some("Pause"));
    }

    #[test]
    fn test_play_while_playing_is_noop() {
        let (mut controller, _container) = controller(3);
        controller.play();
        let timer = *controller.playback().timer().unwrap();
        assert!(!controller.play());
        assert_eq!(controller.playback().timer(), Some(&timer));
        assert_eq!(controller.current_index(), Some(1));
    }

    #[test]
    fn test_pause_is_idempotent() {
        let (mut controller, _container) = controller(3);
        assert!(!controller.pause());
        controller.play();
        assert!(controller.pause());
        assert!(!controller.pause());
        assert_eq!(controller.surface().text("play-btn"), Some("Play"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_advance_until_last_then_stop() {
        let (mut controller, _container) = controller(3);
        let start = tokio::time::Instant::now();
        controller.play();

        assert_eq!(
            controller.step().await,
            Some(Activity::Tick { advanced: true })
        );
        assert_eq!(controller.current_index(), Some(2));
        assert_eq!(start.elapsed(), Duration::from_millis(1000));

        assert_eq!(
            controller.step().await,
            Some(Activity::Tick { advanced: false })
        );
        assert!(!controller.is_playing());
        assert_eq!(start.elapsed(), Duration::from_millis(2000));

        // no subscription and no timer: nothing left to wait for
        assert_eq!(controller.step().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_cancels_timer() {
        let (mut controller, _container) = controller(3);
        let binder = controller.subscribe();
        controller.play();
        controller.reset();
        assert!(controller.playback().deadline().is_none());

        let waited = tokio::time::timeout(Duration::from_secs(10), controller.step()).await;
        assert!(waited.is_err(), "no tick may fire after reset");
        assert_eq!(controller.current_index(), Some(0));
        drop(binder);
    }
}

// =============================================================================
// Emphasis
// =============================================================================

mod emphasis {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    /// Shared buffer the fmt layer writes formatted events into
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn lines(&self) -> Vec<String> {
            String::from_utf8_lossy(&self.0.lock().unwrap())
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    #[test]
    fn test_bad_selector_logs_exactly_one_error() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::ERROR)
            .with_ansi(false)
            .without_time()
            .finish();

        let config = WalkthroughConfig::new(
            "diagram",
            vec![Step::new("mixed", "One good, one bad")
                .with_element("#A")
                .with_element("???bad")],
        );
        let container = Container::new("diagram");
        container.insert_rendered(scene());
        let panel = ControlPanel::for_controls(&config.controls);

        let controller = tracing::subscriber::with_default(subscriber, || {
            Controller::new(config, &container, panel).unwrap()
        });

        let errors: Vec<String> = captured
            .lines()
            .into_iter()
            .filter(|line| line.contains("ERROR"))
            .collect();
        assert_eq!(errors.len(), 1, "{:#?}", errors);
        assert!(errors[0].contains("???bad"));
        assert_eq!(state_of(&controller, "A"), EmphasisState::Emphasized);
    }

    #[test]
    fn test_label_highlight_does_not_outlive_its_step() {
        let config = WalkthroughConfig::new(
            "diagram",
            vec![
                Step::new("label", "The label of A").with_element("#label-A"),
                Step::new("b", "Now B").with_element("#B"),
            ],
        );
        let mut doc = scene();
        let a = doc.find_by_id("A").unwrap();
        let label = doc.append(Some(a), GraphicElement::new("text").with_id("label-A"));
        let container = Container::new("diagram");
        container.insert_rendered(doc);
        let panel = ControlPanel::for_controls(&config.controls);
        let mut controller = Controller::new(config, &container, panel).unwrap();

        let document = controller.document().unwrap();
        assert!(document.borrow().is_pulsing(label));

        assert!(controller.next());
        let doc = document.borrow();
        assert!(!doc.is_pulsing(label));
        assert!(doc.element(label).unwrap().classes().is_empty());
        assert!(doc.is_pulsing(doc.find_by_id("B").unwrap()));
    }

    #[test]
    fn test_bad_selector_still_renders_step() {
        let config = WalkthroughConfig::new(
            "diagram",
            vec![Step::new("mixed", "One good, one bad")
                .with_element("#valid")
                .with_element("???bad")],
        );
        let mut doc = GraphicDocument::new();
        doc.append(None, GraphicElement::node("valid"));
        doc.append(None, GraphicElement::node("other"));
        let container = Container::new("diagram");
        container.insert_rendered(doc);
        let panel = ControlPanel::for_controls(&config.controls);
        let controller = Controller::new(config, &container, panel).unwrap();

        let report = controller.last_style_report().unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].selector, "???bad");
        assert_eq!(state_of(&controller, "valid"), EmphasisState::Emphasized);
        assert_eq!(state_of(&controller, "other"), EmphasisState::DeEmphasized);
        assert_eq!(
            controller.surface().text("step-description"),
            Some("One good, one bad")
        );
    }

    #[test]
    fn test_pulse_moves_with_primary_subject() {
        let (mut controller, _container) = controller(2);
        let document = controller.document().unwrap();
        assert!(document.borrow().is_pulsing(ElementId(1)));

        controller.next();
        assert!(!document.borrow().is_pulsing(ElementId(1)));
        assert!(document.borrow().is_pulsing(ElementId(2)));
    }
}

// =============================================================================
// Empty configuration
// =============================================================================

mod empty {
    use super::*;

    #[test]
    fn test_zero_steps_render_empty_state() {
        let (mut controller, _container) = controller(0);
        let panel = controller.surface();
        assert_eq!(panel.text("step-counter"), Some("Step 0 of 0"));
        assert_eq!(panel.progress("progress-bar"), Some(0.0));
        assert_eq!(panel.text("step-description"), Some(EMPTY_DESCRIPTION));
        assert_eq!(panel.is_disabled("prev-btn"), Some(true));
        assert_eq!(panel.is_disabled("next-btn"), Some(true));

        assert!(!controller.next());
        assert!(!controller.previous());
        controller.reset();
        assert!(controller.play());
        assert!(!controller.is_playing());
        assert_eq!(controller.current_index(), None);
        assert!(controller.current_step().is_none());
    }

    #[test]
    fn test_zero_steps_dims_all_graphics() {
        let (controller, _container) = controller(0);
        for id in ["A", "B", "C", "A-B", "B-C"] {
            assert_eq!(state_of(&controller, id), EmphasisState::DeEmphasized);
        }
    }

    #[test]
    fn test_missing_progress_indicator_is_tolerated() {
        let config = WalkthroughConfig::new("diagram", steps(2));
        let container = Container::new("diagram");
        container.insert_rendered(scene());
        let panel = ControlPanel::for_controls(&config.controls).without_control("progress-bar");
        let mut controller = Controller::new(config, &container, panel).unwrap();
        assert!(controller.next());
        assert_eq!(controller.surface().progress("progress-bar"), None);
    }
}
