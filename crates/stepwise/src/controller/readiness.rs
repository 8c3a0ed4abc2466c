//! One-shot readiness signal for the external renderer's output
//!
//! The watcher resolves at most once. After it fires (or after the container
//! goes away) it holds no subscription and never resolves again.

use std::cell::RefCell;
use std::future;
use std::rc::Rc;

use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::debug;

use crate::core::Container;

enum WatchState<R> {
    /// Output found but not yet handed out
    Ready(Rc<RefCell<R>>),
    Observing(oneshot::Receiver<Rc<RefCell<R>>>),
    Fired,
    /// The container was dropped before any output appeared
    Detached,
}

/// Watches a [`Container`] until rendered output appears
pub struct ReadinessWatcher<R> {
    container_id: String,
    state: WatchState<R>,
}

impl<R> ReadinessWatcher<R> {
    /// Check for existing output, otherwise start observing
    pub fn attach(container: &Container<R>) -> Self {
        let state = match container.rendered() {
            Some(output) => {
                debug!(container = %container.id(), "Rendered output already present");
                WatchState::Ready(output)
            }
            None => {
                debug!(container = %container.id(), "Waiting for rendered output");
                WatchState::Observing(container.observe_output())
            }
        };
        Self {
            container_id: container.id().to_string(),
            state,
        }
    }

    /// Still able to fire
    pub fn is_pending(&self) -> bool {
        matches!(self.state, WatchState::Ready(_) | WatchState::Observing(_))
    }

    pub fn has_fired(&self) -> bool {
        matches!(self.state, WatchState::Fired)
    }

    /// Non-blocking probe; returns the output the one time readiness fires
    pub fn try_ready(&mut self) -> Option<Rc<RefCell<R>>> {
        if let Some(output) = self.take_ready() {
            return Some(output);
        }
        let WatchState::Observing(rx) = &mut self.state else {
            return None;
        };
        match rx.try_recv() {
            Ok(output) => Some(self.fire(output)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => {
                self.detach();
                None
            }
        }
    }

    /// Wait for readiness
    ///
    /// Resolves with `None` if the container is dropped first. Once the
    /// watcher has fired or detached the future never completes. The wait
    /// is cancel safe.
    pub async fn ready(&mut self) -> Option<Rc<RefCell<R>>> {
        if let Some(output) = self.take_ready() {
            return Some(output);
        }
        let received = match &mut self.state {
            WatchState::Observing(rx) => rx.await,
            _ => future::pending().await,
        };
        match received {
            Ok(output) => Some(self.fire(output)),
            Err(_) => {
                self.detach();
                None
            }
        }
    }

    fn take_ready(&mut self) -> Option<Rc<RefCell<R>>> {
        match std::mem::replace(&mut self.state, WatchState::Fired) {
            WatchState::Ready(output) => {
                debug!(container = %self.container_id, "Readiness fired");
                Some(output)
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Drops the subscription along with the old state
    fn fire(&mut self, output: Rc<RefCell<R>>) -> Rc<RefCell<R>> {
        self.state = WatchState::Fired;
        debug!(container = %self.container_id, "Readiness fired");
        output
    }

    fn detach(&mut self) {
        debug!(container = %self.container_id, "Container dropped before output appeared");
        self.state = WatchState::Detached;
    }
}
