//! Queue store
//!
//! Ordered playback sequence plus a cursor:
//!
//! ```text
//!   index:   0        1        2        3
//!          [ S1 ] [ S2 ] [ S3 ] [ S4 ]
//!                    ^
//!                    current_index
//! ```
//!
//! The queue knows nothing about shuffle or repeat; the controller decides
//! how to reorder it and how to recover when the current item goes missing.

use crate::error::{PlaybackError, Result};
use crate::types::TrackItem;

/// Ordered sequence of tracks with a current-position cursor
#[derive(Debug, Clone, Default)]
pub struct Queue {
    /// Playback order (duplicates allowed)
    tracks: Vec<TrackItem>,

    /// Cursor into `tracks`
    current_index: usize,

    /// Order captured when shuffle was switched on (for restoring)
    original_order: Option<Vec<TrackItem>>,
}

impl Queue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a new ordered sequence
    ///
    /// When `preserve_current_id` is found, the cursor moves to its first
    /// occurrence and `true` is returned. Otherwise the cursor resets to 0 and
    /// the caller applies its own recovery policy.
    pub fn replace(&mut self, tracks: Vec<TrackItem>, preserve_current_id: Option<&str>) -> bool {
        self.tracks = tracks;

        let found = preserve_current_id.and_then(|id| self.position_of(id));
        self.current_index = found.unwrap_or(0);
        found.is_some()
    }

    /// Install a sequence with an explicit cursor position
    ///
    /// The cursor is clamped into range (0 for an empty sequence).
    pub fn install(&mut self, tracks: Vec<TrackItem>, current_index: usize) {
        self.tracks = tracks;
        self.current_index = current_index.min(self.tracks.len().saturating_sub(1));
    }

    /// Move the cursor to `index` and return the track there
    ///
    /// Out-of-range indices leave the cursor untouched.
    pub fn select(&mut self, index: usize) -> Option<&TrackItem> {
        if index < self.tracks.len() {
            self.current_index = index;
        }
        self.tracks.get(index)
    }

    /// Insert a track at the front and point the cursor at it
    pub fn prepend(&mut self, track: TrackItem) {
        self.tracks.insert(0, track);
        self.current_index = 0;
    }

    /// Append a track, returning its index
    pub fn push(&mut self, track: TrackItem) -> usize {
        self.tracks.push(track);
        self.tracks.len() - 1
    }

    /// First index holding a track with this id
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    /// Get track by index
    pub fn get(&self, index: usize) -> Option<&TrackItem> {
        self.tracks.get(index)
    }

    /// Track under the cursor
    pub fn current(&self) -> Option<&TrackItem> {
        self.tracks.get(self.current_index)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Move the cursor
    pub fn set_current_index(&mut self, index: usize) -> Result<()> {
        if index >= self.tracks.len() {
            return Err(PlaybackError::IndexOutOfBounds(index));
        }
        self.current_index = index;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// All tracks in playback order
    pub fn tracks(&self) -> &[TrackItem] {
        &self.tracks
    }

    /// Clear all tracks and any remembered order
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.current_index = 0;
        self.original_order = None;
    }

    /// Remember the unshuffled order so it can be restored later
    pub fn set_original_order(&mut self, tracks: Vec<TrackItem>) {
        self.original_order = Some(tracks);
    }

    /// Take the remembered order, if any
    pub fn take_original_order(&mut self) -> Option<Vec<TrackItem>> {
        self.original_order.take()
    }

    /// Drop the remembered order
    pub fn forget_original_order(&mut self) {
        self.original_order = None;
    }
}
