//! Play-count reporting
//!
//! A play counts once the listener has heard more than a fixed fraction of
//! the track. Each "now playing" instance reports at most once; a repeat-one
//! restart is the same instance.

use crate::error::ReportError;
use async_trait::async_trait;
use std::time::Duration;

/// Default fraction of a track that must elapse before a play is recorded
pub const DEFAULT_PLAY_COUNT_THRESHOLD: f64 = 0.3;

/// Records plays in the backing store
#[async_trait]
pub trait PlayReporter: Send + Sync {
    /// Record one play of `track_id`
    async fn report_play(&self, track_id: &str) -> Result<(), ReportError>;
}

/// Tracks whether the current playback instance has been reported
#[derive(Debug, Clone)]
pub struct PlayCountTracker {
    threshold: f64,
    reported: bool,
}

impl PlayCountTracker {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            reported: false,
        }
    }

    /// Start a new playback instance
    pub fn reset(&mut self) {
        self.reported = false;
    }

    pub fn is_reported(&self) -> bool {
        self.reported
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns true exactly once per instance, the first time `elapsed`
    /// passes the threshold fraction of `duration`
    ///
    /// Tracks without a known (non-zero) duration never report.
    pub fn check(&mut self, elapsed: Duration, duration: Option<Duration>) -> bool {
        if self.reported {
            return false;
        }

        let Some(duration) = duration.filter(|d| !d.is_zero()) else {
            return false;
        };

        if elapsed.as_secs_f64() > duration.as_secs_f64() * self.threshold {
            self.reported = true;
            true
        } else {
            false
        }
    }
}

impl Default for PlayCountTracker {
    fn default() -> Self {
        Self::new(DEFAULT_PLAY_COUNT_THRESHOLD)
    }
}
