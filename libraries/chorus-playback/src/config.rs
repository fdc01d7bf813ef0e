//! Playback configuration

use crate::error::{PlaybackError, Result};
use crate::reporter::DEFAULT_PLAY_COUNT_THRESHOLD;
use crate::types::RepeatMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Fraction of a track that must elapse before a play is reported (default: 0.3)
    #[serde(default = "default_play_count_threshold")]
    pub play_count_threshold: f64,

    /// Initial repeat mode (default: Off)
    #[serde(default)]
    pub repeat: RepeatMode,

    /// Initial shuffle flag (default: false)
    #[serde(default)]
    pub shuffle: bool,
}

impl PlaybackConfig {
    /// Load configuration from an optional TOML file and the environment
    ///
    /// Environment variables are prefixed with `CHORUS_`, e.g.
    /// `CHORUS_PLAY_COUNT_THRESHOLD=0.5`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path.filter(|p| p.exists()) {
            settings = settings.add_source(config::File::from(path));
        }

        settings = settings.add_source(config::Environment::with_prefix("CHORUS").try_parsing(true));

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.play_count_threshold > 0.0 && self.play_count_threshold <= 1.0) {
            return Err(PlaybackError::Config(format!(
                "play_count_threshold must be in (0, 1], got {}",
                self.play_count_threshold
            )));
        }
        Ok(())
    }
}

fn default_play_count_threshold() -> f64 {
    DEFAULT_PLAY_COUNT_THRESHOLD
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            play_count_threshold: default_play_count_threshold(),
            repeat: RepeatMode::Off,
            shuffle: false,
        }
    }
}
