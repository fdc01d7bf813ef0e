//! Platform-agnostic media output trait
//!
//! Abstracts the audio backend (browser element, native player, ...).

use crate::error::Result;
use std::time::Duration;

/// Media output handle owned by the controller
///
/// Implementors play whatever `set_source` last pointed them at. The host
/// is responsible for delivering the "ended" notification by calling
/// [`PlaybackController::handle_media_ended`](crate::PlaybackController::handle_media_ended).
pub trait MediaOutput: Send {
    /// Point the output at a new media locator
    ///
    /// Playback does not start until `play` is called.
    fn set_source(&mut self, url: &str) -> Result<()>;

    /// Start or resume audible playback
    fn play(&mut self) -> Result<()>;

    /// Pause audible playback
    fn pause(&mut self);

    /// Seek to position in the current source
    fn seek(&mut self, position: Duration) -> Result<()>;

    /// Current playback position
    fn current_time(&self) -> Duration;

    /// Duration reported by the backend, if known
    ///
    /// Used when the track item itself carries no duration.
    fn duration(&self) -> Option<Duration> {
        None
    }
}

/// Recording output for unit tests
#[cfg(test)]
#[derive(Debug, Default)]
pub struct DummyOutput {
    pub source: Option<String>,
    pub playing: bool,
    pub position: Duration,
    pub set_source_calls: usize,
    pub seeks: Vec<Duration>,
    pub reported_duration: Option<Duration>,
}

#[cfg(test)]
impl MediaOutput for DummyOutput {
    fn set_source(&mut self, url: &str) -> Result<()> {
        self.source = Some(url.to_string());
        self.position = Duration::ZERO;
        self.set_source_calls += 1;
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        self.position = position;
        self.seeks.push(position);
        Ok(())
    }

    fn current_time(&self) -> Duration {
        self.position
    }

    fn duration(&self) -> Option<Duration> {
        self.reported_duration
    }
}

#[cfg(test)]
impl MediaOutput for std::sync::Arc<std::sync::Mutex<DummyOutput>> {
    fn set_source(&mut self, url: &str) -> Result<()> {
        self.lock().unwrap().set_source(url)
    }

    fn play(&mut self) -> Result<()> {
        self.lock().unwrap().play()
    }

    fn pause(&mut self) {
        self.lock().unwrap().pause();
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        self.lock().unwrap().seek(position)
    }

    fn current_time(&self) -> Duration {
        self.lock().unwrap().current_time()
    }

    fn duration(&self) -> Option<Duration> {
        self.lock().unwrap().duration()
    }
}
