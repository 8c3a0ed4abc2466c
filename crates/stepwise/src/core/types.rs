//! Core type definitions shared by the controller and its collaborators
//!
//! Element classification, emphasis states, the styling class contract and
//! the input vocabulary (keys and commands).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::WalkthroughError;

/// Handle to an element inside a [`GraphicDocument`](crate::core::GraphicDocument)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub usize);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How the external renderer tagged an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// A diagram node (box, circle, ...)
    Node,
    /// A connecting path between nodes
    Connector,
    /// Anything else: labels, groups, markers
    #[default]
    Other,
}

impl ElementKind {
    /// Nodes and connectors take part in every emphasis pass
    pub fn is_graphic(&self) -> bool {
        matches!(self, ElementKind::Node | ElementKind::Connector)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Node => write!(f, "node"),
            ElementKind::Connector => write!(f, "connector"),
            ElementKind::Other => write!(f, "other"),
        }
    }
}

/// Visual state of a single element after a style pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmphasisState {
    Emphasized,
    DeEmphasized,
    /// Neither class present (never true for graphic elements after a pass)
    Unstyled,
    /// Both classes present (never true for graphic elements after a pass)
    Conflicting,
}

impl fmt::Display for EmphasisState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmphasisState::Emphasized => write!(f, "emphasized"),
            EmphasisState::DeEmphasized => write!(f, "de-emphasized"),
            EmphasisState::Unstyled => write!(f, "unstyled"),
            EmphasisState::Conflicting => write!(f, "conflicting"),
        }
    }
}

/// The three class names the controller assigns
///
/// The stylesheet owns what they look like.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmphasisClasses {
    pub de_emphasized: String,
    pub emphasized: String,
    pub pulse: String,
}

impl Default for EmphasisClasses {
    fn default() -> Self {
        Self {
            de_emphasized: "dimmed".to_string(),
            emphasized: "highlighted".to_string(),
            pulse: "pulse".to_string(),
        }
    }
}

impl EmphasisClasses {
    /// Names must be non-blank, whitespace-free and pairwise distinct
    pub fn validate(&self) -> crate::core::Result<()> {
        let named = [
            ("deEmphasized", &self.de_emphasized),
            ("emphasized", &self.emphasized),
            ("pulse", &self.pulse),
        ];
        for (role, name) in named {
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(WalkthroughError::config_error(format!(
                    "emphasis class '{}' must be a single non-empty class name, got {:?}",
                    role, name
                )));
            }
        }
        for (i, (role, name)) in named.iter().enumerate() {
            if let Some((other, _)) = named[i + 1..].iter().find(|(_, n)| n == name) {
                return Err(WalkthroughError::config_error(format!(
                    "emphasis classes '{}' and '{}' share the name '{}'",
                    role, other, name
                )));
            }
        }
        Ok(())
    }
}

/// Keys the walkthrough understands, named after DOM `KeyboardEvent.key`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowRight,
    ArrowLeft,
    Home,
    Space,
    Character(char),
    Named(String),
}

impl FromStr for Key {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ArrowRight" | "Right" => Key::ArrowRight,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "Home" => Key::Home,
            " " | "Space" | "Spacebar" => Key::Space,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Character(c),
                    _ => Key::Named(other.to_string()),
                }
            }
        })
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::ArrowRight => write!(f, "ArrowRight"),
            Key::ArrowLeft => write!(f, "ArrowLeft"),
            Key::Home => write!(f, "Home"),
            Key::Space => write!(f, "Space"),
            Key::Character(c) => write!(f, "{}", c),
            Key::Named(name) => write!(f, "{}", name),
        }
    }
}

/// A key press as delivered by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    /// Focus is on a text-entry control (input, textarea, editable content)
    pub in_text_entry: bool,
}

impl KeyPress {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            in_text_entry: false,
        }
    }

    pub fn in_text_entry(mut self) -> Self {
        self.in_text_entry = true;
        self
    }
}

/// A controller transition requested through the bound inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Next,
    Previous,
    Reset,
    TogglePlayback,
    Play,
    Pause,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Next => write!(f, "next"),
            Command::Previous => write!(f, "previous"),
            Command::Reset => write!(f, "reset"),
            Command::TogglePlayback => write!(f, "toggle"),
            Command::Play => write!(f, "play"),
            Command::Pause => write!(f, "pause"),
        }
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "next" => Ok(Command::Next),
            "prev" | "previous" => Ok(Command::Previous),
            "reset" => Ok(Command::Reset),
            "toggle" => Ok(Command::TogglePlayback),
            "play" => Ok(Command::Play),
            "pause" => Ok(Command::Pause),
            _ => Err(format!("Unknown command: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!("ArrowRight".parse::<Key>().unwrap(), Key::ArrowRight);
        assert_eq!(" ".parse::<Key>().unwrap(), Key::Space);
        assert_eq!("q".parse::<Key>().unwrap(), Key::Character('q'));
        assert_eq!(
            "Escape".parse::<Key>().unwrap(),
            Key::Named("Escape".to_string())
        );
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!("prev".parse::<Command>().unwrap(), Command::Previous);
        assert_eq!("TOGGLE".parse::<Command>().unwrap(), Command::TogglePlayback);
        assert!("jump".parse::<Command>().is_err());
    }

    #[test]
    fn test_graphic_kinds() {
        assert!(ElementKind::Node.is_graphic());
        assert!(ElementKind::Connector.is_graphic());
        assert!(!ElementKind::Other.is_graphic());
    }
}
