//! Playback Events
//!
//! Observer interface for UI synchronization. Consumers subscribe
//! explicitly and receive every event emitted after a state mutation:
//! - Play/pause changes
//! - Now-playing changes (also drives OS media-session surfaces)
//! - Queue replacement and cursor moves
//! - Shuffle/repeat changes
//! - Scope fetch failures and recorded plays

use crate::scope::Scope;
use crate::types::{RepeatMode, TrackItem};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Playing flag changed
    StateChanged {
        is_playing: bool,
    },

    /// Current item changed
    ///
    /// Emitted on every load, including re-selecting the same track.
    NowPlaying {
        /// The new current item
        track: TrackItem,
        /// ID of the previous current item (if any)
        previous_track_id: Option<String>,
    },

    /// Queue contents or cursor changed
    QueueChanged {
        length: usize,
        current_index: usize,
    },

    ShuffleChanged {
        enabled: bool,
    },

    RepeatChanged {
        mode: RepeatMode,
    },

    /// Scope resolution failed and the engine fell back to the local queue
    ScopeFetchFailed {
        scope: Scope,
        message: String,
    },

    /// A play was recorded for this track
    PlayReported {
        track_id: String,
    },
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&PlaybackEvent) + Send + Sync>;

/// Explicit subscribe/unsubscribe event fan-out
///
/// Listeners are called synchronously, in subscription order, on the
/// thread that emitted the event. The controller emits only after releasing
/// its state lock, so listeners may query it.
#[derive(Default)]
pub struct EventBus {
    next_id: AtomicU64,
    listeners: RwLock<BTreeMap<SubscriptionId, Listener>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&PlaybackEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(id, Arc::new(listener));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Deliver events to every listener
    pub fn emit_all(&self, events: &[PlaybackEvent]) {
        if events.is_empty() {
            return;
        }

        // Snapshot so listeners may subscribe/unsubscribe while being called
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        for event in events {
            for listener in &listeners {
                listener(event);
            }
        }
    }

    pub fn emit(&self, event: PlaybackEvent) {
        self.emit_all(std::slice::from_ref(&event));
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
