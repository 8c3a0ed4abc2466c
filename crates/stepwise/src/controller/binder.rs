//! Input bindings
//!
//! A [`ControlBinder`] is the sending half of the controller's command
//! subscription. Clicks on bound affordances and global key presses are
//! translated into [`Command`]s and queued; the controller applies them.
//! Once the controller unsubscribes (or is dropped) every send fails and the
//! binder reports the input as unhandled.

use std::collections::BTreeMap;
use std::rc::Rc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, trace};

use crate::core::{Command, ControlIds, Key, KeyPress, Visibility};

/// What happened to a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyResponse {
    /// The command queued for the controller, if any
    pub command: Option<Command>,
    /// The host should suppress the key's default action
    pub prevent_default: bool,
}

impl KeyResponse {
    fn ignored() -> Self {
        Self::default()
    }
}

/// Command a key maps to
pub fn key_command(key: &Key) -> Option<Command> {
    match key {
        Key::ArrowRight => Some(Command::Next),
        Key::ArrowLeft => Some(Command::Previous),
        Key::Home => Some(Command::Reset),
        Key::Space => Some(Command::TogglePlayback),
        _ => None,
    }
}

/// Translates host input into controller commands
#[derive(Debug, Clone)]
pub struct ControlBinder {
    bindings: Rc<BTreeMap<String, Command>>,
    sender: UnboundedSender<Command>,
    visibility: Visibility,
}

impl ControlBinder {
    pub(crate) fn new(
        controls: &ControlIds,
        sender: UnboundedSender<Command>,
        visibility: Visibility,
    ) -> Self {
        let bindings = [
            (controls.previous.clone(), Command::Previous),
            (controls.next.clone(), Command::Next),
            (controls.reset.clone(), Command::Reset),
            (controls.play.clone(), Command::TogglePlayback),
        ]
        .into_iter()
        .collect();
        Self {
            bindings: Rc::new(bindings),
            sender,
            visibility,
        }
    }

    /// The subscription is still open
    pub fn is_active(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Command bound to an affordance id
    pub fn binding(&self, control_id: &str) -> Option<Command> {
        self.bindings.get(control_id).copied()
    }

    /// A click on the affordance `control_id`; true if a command was queued
    pub fn click(&self, control_id: &str) -> bool {
        match self.binding(control_id) {
            Some(command) => self.send(command),
            None => {
                trace!(control = control_id, "Click on unbound control");
                false
            }
        }
    }

    /// A global key press
    ///
    /// Ignored while focus is in a text-entry control or while the
    /// container is hidden. Space suppresses the default scroll.
    pub fn key_press(&self, press: &KeyPress) -> KeyResponse {
        if press.in_text_entry {
            trace!(key = %press.key, "Key ignored in text entry");
            return KeyResponse::ignored();
        }
        if !self.visibility.is_visible() {
            trace!(key = %press.key, "Key ignored while container hidden");
            return KeyResponse::ignored();
        }
        let Some(command) = key_command(&press.key) else {
            return KeyResponse::ignored();
        };
        if !self.send(command) {
            return KeyResponse::ignored();
        }
        KeyResponse {
            command: Some(command),
            prevent_default: press.key == Key::Space,
        }
    }

    /// Queue a command directly
    pub fn send(&self, command: Command) -> bool {
        match self.sender.send(command) {
            Ok(()) => {
                trace!(%command, "Command queued");
                true
            }
            Err(_) => {
                debug!(%command, "Subscription closed; command dropped");
                false
            }
        }
    }
}
