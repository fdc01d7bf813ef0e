//! Core types for playback management

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::time::Duration;

/// Track information for queue management
///
/// Immutable once built. Two items are equal when their ids are equal,
/// regardless of the remaining fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackItem {
    /// Unique track identifier from storage
    pub id: String,

    /// Track title
    pub title: String,

    /// Artist name (optional)
    pub artist: Option<String>,

    /// Locator handed to the media output
    pub media_url: String,

    /// Cover art locator (optional)
    pub cover_url: Option<String>,

    /// Track duration, when the backing store knows it
    pub duration: Option<Duration>,

    /// Opaque metadata (lyrics, scripture references, ...) carried through unmodified
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl TrackItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        media_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: None,
            media_url: media_url.into(),
            cover_url: None,
            duration: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_cover_url(mut self, cover_url: impl Into<String>) -> Self {
        self.cover_url = Some(cover_url.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

impl PartialEq for TrackItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TrackItem {}

impl Hash for TrackItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Repeat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop when queue ends
    #[default]
    Off,

    /// Loop entire queue
    All,

    /// Loop current track only
    One,
}

impl RepeatMode {
    /// Next mode in the toggle cycle: Off -> All -> One -> Off
    pub fn cycled(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }
}

/// Point-in-time view of the controller for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub current_item: Option<TrackItem>,
    pub is_playing: bool,
    pub is_shuffling: bool,
    pub repeat_mode: RepeatMode,
    pub queue_len: usize,
    pub current_index: usize,
}
