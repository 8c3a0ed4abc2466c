//! Walkthrough configuration as supplied by the content pipeline
//!
//! The serialized form is camelCase JSON. Closures (the step-change
//! listener) are passed to the controller separately.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::core::{Result, WalkthroughError};

/// Default playback interval
pub const DEFAULT_PLAY_INTERVAL_MS: u64 = 3000;

/// One stage of the walkthrough
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    /// Selector patterns; the first one is the step's primary subject
    #[serde(default)]
    pub elements: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl Step {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            elements: Vec::new(),
            description: description.into(),
        }
    }

    pub fn with_element(mut self, pattern: impl Into<String>) -> Self {
        self.elements.push(pattern.into());
        self
    }
}

/// Ids of the affordances the controller drives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControlIds {
    pub previous: String,
    pub next: String,
    pub reset: String,
    pub play: String,
    pub counter: String,
    pub description: String,
    /// Optional proportional indicator
    pub progress: Option<String>,
}

impl Default for ControlIds {
    fn default() -> Self {
        Self {
            previous: "prev-btn".to_string(),
            next: "next-btn".to_string(),
            reset: "reset-btn".to_string(),
            play: "play-btn".to_string(),
            counter: "step-counter".to_string(),
            description: "step-description".to_string(),
            progress: Some("progress-bar".to_string()),
        }
    }
}

impl ControlIds {
    /// Role/id pairs that must resolve at construction
    pub fn required(&self) -> [(&'static str, &str); 6] {
        [
            ("previous", self.previous.as_str()),
            ("next", self.next.as_str()),
            ("reset", self.reset.as_str()),
            ("play", self.play.as_str()),
            ("counter", self.counter.as_str()),
            ("description", self.description.as_str()),
        ]
    }
}

/// Complete walkthrough configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkthroughConfig {
    pub container_id: String,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub controls: ControlIds,
    #[serde(default = "default_play_interval_ms")]
    pub play_interval_ms: u64,
}

fn default_play_interval_ms() -> u64 {
    DEFAULT_PLAY_INTERVAL_MS
}

impl WalkthroughConfig {
    pub fn new(container_id: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            container_id: container_id.into(),
            steps,
            controls: ControlIds::default(),
            play_interval_ms: DEFAULT_PLAY_INTERVAL_MS,
        }
    }

    pub fn with_controls(mut self, controls: ControlIds) -> Self {
        self.controls = controls;
        self
    }

    pub fn with_play_interval_ms(mut self, interval: u64) -> Self {
        self.play_interval_ms = interval;
        self
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        debug!(
            container = %config.container_id,
            steps = config.steps.len(),
            interval_ms = config.play_interval_ms,
            "Configuration loaded"
        );
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check the invariants serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.container_id.trim().is_empty() {
            return Err(WalkthroughError::config_error("containerId must not be empty"));
        }
        if self.play_interval_ms == 0 {
            return Err(WalkthroughError::config_error(
                "playIntervalMs must be a positive number of milliseconds",
            ));
        }
        for (role, id) in self.controls.required() {
            if id.trim().is_empty() {
                return Err(WalkthroughError::config_error(format!(
                    "control id for '{}' must not be empty",
                    role
                )));
            }
        }
        Ok(())
    }
}
