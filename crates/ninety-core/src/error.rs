//! Core error types for ninety-core.
//!
//! The phase clock and rotation timers never fail; only configuration
//! (text pools, config files) and the collaborators at the edge (audio,
//! host visibility) produce errors.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for ninety-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Text catalog validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Collaborator environment errors (audio, visibility)
    #[error("Environment unavailable: {0}")]
    Environment(#[from] EnvironmentError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Text catalog problems detected before a session may start.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A text category has no entries to pick from
    #[error("Text category '{category}' is empty")]
    EmptyPool { category: &'static str },

    /// One of the waiting-phase message lists is empty
    #[error("Text category '{category}' has an empty message list at index {index}")]
    EmptyCycle { category: &'static str, index: usize },

    /// The selector returned an index outside the pool
    #[error("Selector picked index {index} for '{category}' (length: {len})")]
    OutOfBounds {
        category: &'static str,
        index: usize,
        len: usize,
    },
}

/// Failures of the host environment behind a collaborator.
///
/// These are logged and swallowed at the collaborator boundary; they never
/// reach the phase state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    /// No audio facility exists on this host
    #[error("Audio output is not supported: {0}")]
    AudioUnavailable(String),

    /// Audio exists but the host refused to start it (e.g. autoplay policy)
    #[error("Audio output was blocked: {0}")]
    AudioBlocked(String),

    /// The host cannot report its foreground state
    #[error("Visibility state cannot be queried: {0}")]
    VisibilityUnavailable(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

impl From<toml::de::Error> for CoreError {
    fn from(err: toml::de::Error) -> Self {
        CoreError::Config(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
