//! Error types for playback management

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No track is currently loaded
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Media output rejected a command
    #[error("Media output error: {0}")]
    MediaOutput(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

/// Failure while resolving the candidate tracks of a scope
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScopeError {
    /// Transport failure talking to the backing store
    #[error("Network error: {0}")]
    Network(String),

    /// Backing store answered with an error
    #[error("Backend error: {0}")]
    Backend(String),

    /// The playlist (or other scope target) does not exist
    #[error("Scope not found: {0}")]
    NotFound(String),
}

/// Failure while recording a play
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Failed to report play for {track_id}: {message}")]
pub struct ReportError {
    pub track_id: String,
    pub message: String,
}

impl ReportError {
    pub fn new(track_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            track_id: track_id.into(),
            message: message.into(),
        }
    }
}

impl From<config::ConfigError> for PlaybackError {
    fn from(err: config::ConfigError) -> Self {
        PlaybackError::Config(err.to_string())
    }
}
