//! Walkthrough state management
//!
//! The pieces of the controller, bottom-up: the step store, the style
//! applier, the playback timer, input bindings, progress reporting and the
//! readiness watcher, composed by [`Controller`].

mod binder;
mod playback;
mod progress;
mod readiness;
mod store;
mod style;
mod walkthrough;

pub use binder::{key_command, ControlBinder, KeyResponse};
pub use playback::{PlaybackScheduler, TimerHandle};
pub(crate) use playback::wait_for;
pub use progress::{
    Affordances, Progress, ProgressReporter, StepListener, EMPTY_DESCRIPTION, PAUSE_LABEL,
    PLAY_LABEL,
};
pub use readiness::ReadinessWatcher;
pub use store::StepStore;
pub use style::{check_selectors, SelectorFailure, StyleApplier, StyleReport};
pub use walkthrough::{Activity, Controller};
