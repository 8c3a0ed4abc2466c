//! Core error types for walkthrough processing
//!
//! Construction errors are fatal and surface from the controller constructor.
//! Selector errors are recoverable: the style pass logs and skips them.

use thiserror::Error;

/// Errors raised while loading or driving a walkthrough
#[derive(Error, Debug)]
pub enum WalkthroughError {
    #[error("Missing control: {role} affordance '{id}' does not resolve to an element")]
    MissingControl { role: String, id: String },

    #[error("Container not found: {id}")]
    ContainerNotFound { id: String },

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Selector matched no elements: {selector}")]
    NoMatches { selector: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("JSON error: {source}")]
    JsonError {
        #[from]
        source: serde_json::Error,
    },

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl WalkthroughError {
    /// Create a missing-control error for the given affordance role
    pub fn missing_control(role: impl Into<String>, id: impl Into<String>) -> Self {
        Self::MissingControl {
            role: role.into(),
            id: id.into(),
        }
    }

    /// Create a container lookup error
    pub fn container_not_found(id: impl Into<String>) -> Self {
        Self::ContainerNotFound { id: id.into() }
    }

    /// Create a selector syntax error
    pub fn invalid_selector(selector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            message: message.into(),
        }
    }

    /// Create an empty-match error
    pub fn no_matches(selector: impl Into<String>) -> Self {
        Self::NoMatches {
            selector: selector.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// True for the errors the style pass recovers from
    pub fn is_selector_error(&self) -> bool {
        matches!(self, Self::InvalidSelector { .. } | Self::NoMatches { .. })
    }
}

/// Result alias used across the library
pub type Result<T, E = WalkthroughError> = std::result::Result<T, E>;
