//! Scope resolution
//!
//! A scope is the externally-owned set of tracks eligible for shuffling:
//! one playlist, the tracks matching a filter, or the whole library. The
//! engine never stores the active scope itself; it asks the registered
//! [`ScopeResolver`] at the moment shuffle is toggled.

use crate::error::ScopeError;
use crate::types::TrackItem;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

/// Set of candidate tracks for shuffle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Scope {
    /// Tracks of one playlist
    Playlist { id: String },

    /// Tracks matching the active filter
    Filter { criteria: FilterCriteria },

    /// Every track
    #[default]
    All,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Playlist { id } => write!(f, "playlist {}", id),
            Scope::Filter { criteria } => write!(f, "filter {}", criteria),
            Scope::All => write!(f, "all tracks"),
        }
    }
}

/// Filter criteria as entered in the library view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Case-insensitive substring matched against title and artist
    pub text: Option<String>,

    /// Exact artist match (case-insensitive)
    pub artist: Option<String>,
}

impl FilterCriteria {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            artist: None,
        }
    }

    pub fn artist(artist: impl Into<String>) -> Self {
        Self {
            text: None,
            artist: Some(artist.into()),
        }
    }

    /// Whether a track passes every criterion that is set
    pub fn matches(&self, track: &TrackItem) -> bool {
        let text_ok = self.text.as_deref().map_or(true, |needle| {
            let needle = needle.to_lowercase();
            track.title.to_lowercase().contains(&needle)
                || track
                    .artist
                    .as_deref()
                    .is_some_and(|a| a.to_lowercase().contains(&needle))
        });

        let artist_ok = self.artist.as_deref().map_or(true, |wanted| {
            track
                .artist
                .as_deref()
                .is_some_and(|a| a.eq_ignore_ascii_case(wanted))
        });

        text_ok && artist_ok
    }
}

impl fmt::Display for FilterCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.text, &self.artist) {
            (Some(text), Some(artist)) => write!(f, "\"{}\" by {}", text, artist),
            (Some(text), None) => write!(f, "\"{}\"", text),
            (None, Some(artist)) => write!(f, "by {}", artist),
            (None, None) => write!(f, "(empty)"),
        }
    }
}

/// Supplies candidate tracks for the active scope
///
/// Implementations typically wrap the backend's track-listing endpoint.
/// `fetch_candidates` returns tracks in their canonical (unshuffled) order.
#[async_trait]
pub trait ScopeResolver: Send + Sync {
    /// Scope active in the host right now
    fn active_scope(&self) -> Scope;

    /// Fetch every candidate track for `scope`
    async fn fetch_candidates(&self, scope: &Scope) -> Result<Vec<TrackItem>, ScopeError>;
}

/// In-memory resolver over a fixed catalog
///
/// Catalog order is the canonical order for `Scope::All` and filters;
/// playlists keep their own order.
#[derive(Debug, Default)]
pub struct CatalogResolver {
    tracks: Vec<TrackItem>,
    playlists: HashMap<String, Vec<String>>,
    active: RwLock<Scope>,
}

impl CatalogResolver {
    pub fn new(tracks: Vec<TrackItem>) -> Self {
        Self {
            tracks,
            playlists: HashMap::new(),
            active: RwLock::new(Scope::All),
        }
    }

    /// Register a playlist as an ordered list of track ids
    pub fn with_playlist(mut self, id: impl Into<String>, track_ids: Vec<String>) -> Self {
        self.playlists.insert(id.into(), track_ids);
        self
    }

    /// Change the scope reported by `active_scope`
    pub fn set_active_scope(&self, scope: Scope) {
        *self
            .active
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = scope;
    }

    fn playlist_tracks(&self, id: &str) -> Result<Vec<TrackItem>, ScopeError> {
        let track_ids = self
            .playlists
            .get(id)
            .ok_or_else(|| ScopeError::NotFound(format!("playlist {}", id)))?;

        Ok(track_ids
            .iter()
            .filter_map(|track_id| self.tracks.iter().find(|t| &t.id == track_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ScopeResolver for CatalogResolver {
    fn active_scope(&self) -> Scope {
        self.active
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    async fn fetch_candidates(&self, scope: &Scope) -> Result<Vec<TrackItem>, ScopeError> {
        match scope {
            Scope::Playlist { id } => self.playlist_tracks(id),
            Scope::Filter { criteria } => Ok(self
                .tracks
                .iter()
                .filter(|t| criteria.matches(t))
                .cloned()
                .collect()),
            Scope::All => Ok(self.tracks.clone()),
        }
    }
}
