//! The walkthrough controller
//!
//! Owns the step store, the playback timer and the command subscription, and
//! drives the scene and the control surface on every transition. All state
//! lives on one thread; the event loop is [`Controller::step`].

use std::cell::RefCell;
use std::future;
use std::rc::{Rc, Weak};

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, WeakUnboundedSender};
use tracing::{debug, info, span, trace, warn, Level};

use crate::controller::{
    wait_for, Affordances, ControlBinder, PlaybackScheduler, Progress, ProgressReporter,
    ReadinessWatcher, StepStore, StyleApplier, StyleReport,
};
use crate::core::{
    Command, Container, ControlIds, ControlSurface, Result, SceneRenderer, Step, Visibility,
    WalkthroughConfig, WalkthroughError,
};

/// One event processed by the controller loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    /// Rendered output appeared and the initial render ran
    Ready,
    /// A bound input was applied
    Command { command: Command, changed: bool },
    /// The playback timer fired
    Tick { advanced: bool },
}

enum Event<R> {
    Ready(Option<Rc<RefCell<R>>>),
    Command(Option<Command>),
    Tick,
}

/// Step-sequenced walkthrough over a rendered scene
pub struct Controller<R, S> {
    container_id: String,
    controls: ControlIds,
    store: StepStore,
    surface: S,
    document: Option<Weak<RefCell<R>>>,
    watcher: ReadinessWatcher<R>,
    applier: StyleApplier,
    playback: PlaybackScheduler,
    progress: ProgressReporter,
    visibility: Visibility,
    commands: Option<UnboundedReceiver<Command>>,
    subscription: Option<WeakUnboundedSender<Command>>,
    last_report: Option<StyleReport>,
}

impl<R: SceneRenderer, S: ControlSurface> Controller<R, S> {
    /// Build a controller over `container`
    ///
    /// Fails without side effects if the configuration is invalid, the
    /// container is not the configured one, or a required affordance is
    /// missing from `surface`. If the container already holds rendered
    /// output the initial render happens here.
    pub fn new(config: WalkthroughConfig, container: &Container<R>, surface: S) -> Result<Self> {
        Self::build(config, container, surface, None)
    }

    /// Like [`Controller::new`], notifying `listener` with `(index, step)` on every render
    pub fn with_step_listener(
        config: WalkthroughConfig,
        container: &Container<R>,
        surface: S,
        listener: impl FnMut(usize, &Step) + 'static,
    ) -> Result<Self> {
        Self::build(config, container, surface, Some(Box::new(listener)))
    }

    fn build(
        config: WalkthroughConfig,
        container: &Container<R>,
        surface: S,
        listener: Option<crate::controller::StepListener>,
    ) -> Result<Self> {
        config.validate()?;
        if container.id() != config.container_id {
            return Err(WalkthroughError::container_not_found(&config.container_id));
        }
        for (role, id) in config.controls.required() {
            if !surface.has_control(id) {
                return Err(WalkthroughError::missing_control(role, id));
            }
        }

        let mut progress = ProgressReporter::new(&config.controls);
        if let Some(listener) = listener {
            progress = progress.with_listener(listener);
        }

        let mut controller = Self {
            container_id: config.container_id,
            store: StepStore::new(config.steps),
            surface,
            document: None,
            watcher: ReadinessWatcher::attach(container),
            applier: StyleApplier::new(),
            playback: PlaybackScheduler::from_millis(config.play_interval_ms),
            progress,
            visibility: container.visibility(),
            commands: None,
            subscription: None,
            last_report: None,
            controls: config.controls,
        };
        info!(
            container = %controller.container_id,
            steps = controller.store.len(),
            interval_ms = controller.playback.interval().as_millis() as u64,
            "Walkthrough controller created"
        );

        Affordances::of(&controller.store, false).apply(&mut controller.surface, &controller.controls);
        controller.poll_ready();
        Ok(controller)
    }

    // Transitions

    /// Advance one step; at the last step this is a no-op that also ends playback
    pub fn next(&mut self) -> bool {
        let moved = self.store.next();
        if moved {
            self.render();
        } else if self.playback.is_playing() {
            debug!("Already at last step; stopping playback");
            self.pause();
        }
        moved
    }

    pub fn previous(&mut self) -> bool {
        let moved = self.store.previous();
        if moved {
            self.render();
        }
        moved
    }

    /// Stop playback and return to the first step
    pub fn reset(&mut self) {
        self.pause();
        self.store.reset();
        self.render();
    }

    /// Start playback; false if already playing
    ///
    /// Attempts one advance immediately. If that fails playback stops again
    /// before this returns.
    pub fn play(&mut self) -> bool {
        if !self.playback.start() {
            return false;
        }
        info!("Playback started");
        self.refresh_affordances();
        if !self.advance() {
            debug!("Nothing to advance to; playback stopped");
        }
        true
    }

    /// Stop playback; false if it was not playing
    pub fn pause(&mut self) -> bool {
        let stopped = self.playback.stop();
        if stopped {
            info!(index = ?self.store.index(), "Playback stopped");
        }
        self.refresh_affordances();
        stopped
    }

    pub fn toggle_playback(&mut self) -> bool {
        if self.playback.is_playing() {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Apply a bound command; true if it changed the position or playback state
    pub fn dispatch(&mut self, command: Command) -> bool {
        trace!(%command, "Dispatching command");
        match command {
            Command::Next => self.next(),
            Command::Previous => self.previous(),
            Command::Reset => {
                let changed = self.store.index() != Some(0) || self.playback.is_playing();
                self.reset();
                changed
            }
            Command::TogglePlayback => self.toggle_playback(),
            Command::Play => self.play(),
            Command::Pause => self.pause(),
        }
    }

    /// Advance for playback, stopping when the advance fails
    fn advance(&mut self) -> bool {
        if self.store.next() {
            self.render();
            true
        } else {
            self.pause();
            false
        }
    }

    fn tick(&mut self) -> bool {
        let tick_span = span!(Level::DEBUG, "playback_tick", index = ?self.store.index());
        let _enter = tick_span.enter();
        let advanced = self.advance();
        if advanced {
            self.playback.rearm();
        }
        advanced
    }

    // Input subscription

    /// Open (or join) the command subscription
    pub fn subscribe(&mut self) -> ControlBinder {
        let sender = match self.subscription.as_ref().and_then(|weak| weak.upgrade()) {
            Some(sender) if self.commands.is_some() => sender,
            _ => {
                let (sender, receiver) = mpsc::unbounded_channel();
                self.commands = Some(receiver);
                self.subscription = Some(sender.downgrade());
                debug!("Command subscription opened");
                sender
            }
        };
        ControlBinder::new(&self.controls, sender, self.visibility.clone())
    }

    /// Close the command subscription and stop playback
    pub fn unsubscribe(&mut self) {
        if self.commands.take().is_some() {
            debug!("Command subscription closed");
        }
        self.subscription = None;
        self.pause();
    }

    pub fn is_subscribed(&self) -> bool {
        self.commands.is_some()
    }

    // Event loop

    /// Wait for and process the next readiness signal, command or tick
    ///
    /// Returns `None` once the subscription has ended or nothing is left to
    /// wait for.
    pub async fn step(&mut self) -> Option<Activity> {
        loop {
            if !self.watcher.is_pending() && self.commands.is_none() && !self.playback.is_playing()
            {
                return None;
            }

            let event = tokio::select! {
                biased;
                output = self.watcher.ready(), if self.watcher.is_pending() => Event::Ready(output),
                command = recv_command(&mut self.commands) => Event::Command(command),
                _ = wait_for(self.playback.deadline()) => Event::Tick,
            };

            match event {
                Event::Ready(Some(output)) => {
                    self.on_ready(output);
                    return Some(Activity::Ready);
                }
                Event::Ready(None) => continue,
                Event::Command(Some(command)) => {
                    let changed = self.dispatch(command);
                    return Some(Activity::Command { command, changed });
                }
                Event::Command(None) => {
                    debug!("All bindings dropped");
                    self.unsubscribe();
                    return None;
                }
                Event::Tick => {
                    let advanced = self.tick();
                    return Some(Activity::Tick { advanced });
                }
            }
        }
    }

    /// Run the loop until [`Controller::step`] returns `None`
    pub async fn run(&mut self) {
        while let Some(activity) = self.step().await {
            trace!(?activity, "Controller activity");
        }
        debug!("Controller loop finished");
    }

    /// Apply readiness and queued commands without waiting
    pub fn process_pending(&mut self) -> Vec<Activity> {
        let mut activities = Vec::new();
        if self.poll_ready() {
            activities.push(Activity::Ready);
        }
        loop {
            let received = match self.commands.as_mut() {
                Some(receiver) => receiver.try_recv(),
                None => break,
            };
            match received {
                Ok(command) => {
                    let changed = self.dispatch(command);
                    activities.push(Activity::Command { command, changed });
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.unsubscribe();
                    break;
                }
            }
        }
        activities
    }

    /// Probe readiness; true if it fired now
    pub fn poll_ready(&mut self) -> bool {
        match self.watcher.try_ready() {
            Some(output) => {
                self.on_ready(output);
                true
            }
            None => false,
        }
    }

    fn on_ready(&mut self, output: Rc<RefCell<R>>) {
        info!(container = %self.container_id, "Diagram ready");
        self.document = Some(Rc::downgrade(&output));
        self.render();
    }

    // Rendering

    fn render(&mut self) {
        let render_span = span!(
            Level::DEBUG,
            "render_step",
            index = ?self.store.index(),
            step = self.store.current().map(|s| s.id.as_str()).unwrap_or("<none>")
        );
        let _enter = render_span.enter();

        match self.document.as_ref().map(Weak::upgrade) {
            Some(Some(document)) => self.restyle(&document),
            Some(None) => warn!("Rendered document was dropped; styling skipped"),
            None => trace!("Not ready; styling deferred"),
        }

        self.refresh_affordances();
        self.progress.report(&mut self.surface, &self.store);
    }

    fn restyle(&mut self, document: &RefCell<R>) {
        let Ok(mut scene) = document.try_borrow_mut() else {
            warn!("Rendered document is busy; styling skipped");
            return;
        };
        self.last_report = Some(self.applier.apply(&mut *scene, self.store.current()));
    }

    fn refresh_affordances(&mut self) {
        Affordances::of(&self.store, self.playback.is_playing()).apply(&mut self.surface, &self.controls);
    }

    // Accessors

    pub fn current_index(&self) -> Option<usize> {
        self.store.index()
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.store.current()
    }

    pub fn steps(&self) -> &[Step] {
        self.store.steps()
    }

    pub fn step_count(&self) -> usize {
        self.store.len()
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    pub fn playback(&self) -> &PlaybackScheduler {
        &self.playback
    }

    /// Readiness has fired and the scene reference is set
    pub fn is_ready(&self) -> bool {
        self.document.is_some()
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn controls(&self) -> &ControlIds {
        &self.controls
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The rendered scene, while it is still alive
    pub fn document(&self) -> Option<Rc<RefCell<R>>> {
        self.document.as_ref().and_then(Weak::upgrade)
    }

    pub fn last_style_report(&self) -> Option<&StyleReport> {
        self.last_report.as_ref()
    }

    pub fn progress(&self) -> Progress {
        Progress::of(&self.store)
    }

    pub fn affordances(&self) -> Affordances {
        Affordances::of(&self.store, self.playback.is_playing())
    }
}

async fn recv_command(commands: &mut Option<UnboundedReceiver<Command>>) -> Option<Command> {
    match commands {
        Some(receiver) => receiver.recv().await,
        None => future::pending().await,
    }
}
