//! Chorus - Playback Engine
//!
//! Platform-agnostic playback queue and shuffle engine for Chorus.
//!
//! This crate provides:
//! - Queue store with a current-position cursor
//! - Fisher-Yates shuffle that keeps the playing track in place
//! - Scope-aware shuffle (playlist, filter, or whole library)
//! - Repeat modes (Off, All, One)
//! - Play-count reporting (once per playback, past 30% by default)
//! - Observer events for UI and now-playing integration
//!
//! # Architecture
//!
//! `chorus-playback` does not decode audio, talk HTTP or touch the
//! database. Everything external is injected:
//! - [`MediaOutput`] - the audio element / native player
//! - [`ScopeResolver`] - fetches candidate tracks for the active scope
//! - [`PlayReporter`] - records plays
//!
//! # Example: Basic Playback
//!
//! ```rust
//! use chorus_playback::{MediaOutput, PlaybackConfig, PlaybackController, Result, TrackItem};
//! use std::time::Duration;
//!
//! struct SilentOutput;
//!
//! impl MediaOutput for SilentOutput {
//!     fn set_source(&mut self, _url: &str) -> Result<()> { Ok(()) }
//!     fn play(&mut self) -> Result<()> { Ok(()) }
//!     fn pause(&mut self) {}
//!     fn seek(&mut self, _position: Duration) -> Result<()> { Ok(()) }
//!     fn current_time(&self) -> Duration { Duration::ZERO }
//! }
//!
//! let controller = PlaybackController::new(PlaybackConfig::default(), Box::new(SilentOutput));
//!
//! let queue = vec![
//!     TrackItem::new("1", "Amazing Grace", "/media/1.mp3"),
//!     TrackItem::new("2", "Be Thou My Vision", "/media/2.mp3"),
//! ];
//! controller.play(queue[0].clone(), Some(queue));
//! controller.next();
//!
//! assert_eq!(controller.current_item().unwrap().id, "2");
//! ```
//!
//! # Example: Scope-aware Shuffle
//!
//! ```rust,no_run
//! use chorus_playback::{CatalogResolver, PlaybackController, Scope};
//! use std::sync::Arc;
//!
//! # async fn demo(controller: Arc<PlaybackController>, resolver: Arc<CatalogResolver>) {
//! resolver.set_active_scope(Scope::Playlist { id: "sunday".to_string() });
//! controller.set_scope_resolver(Some(resolver));
//!
//! // Reorders the queue around the current track; never interrupts it
//! controller.toggle_shuffle().await;
//! # }
//! ```

mod config;
mod controller;
mod error;
pub mod events;
mod output;
mod queue;
mod reporter;
pub mod scope;
pub mod shuffle;
pub mod types;

// Public exports
pub use config::PlaybackConfig;
pub use controller::PlaybackController;
pub use error::{PlaybackError, ReportError, Result, ScopeError};
pub use events::{EventBus, PlaybackEvent, SubscriptionId};
pub use output::MediaOutput;
pub use queue::Queue;
pub use reporter::{PlayCountTracker, PlayReporter, DEFAULT_PLAY_COUNT_THRESHOLD};
pub use scope::{CatalogResolver, FilterCriteria, Scope, ScopeResolver};
pub use types::{PlaybackSnapshot, RepeatMode, TrackItem};
