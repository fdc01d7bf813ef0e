//! Playback controller - core orchestration
//!
//! Coordinates queue, shuffle, repeat, scope resolution, play counting and
//! the media output.
//!
//! The controller is an explicitly owned handle (`Arc<PlaybackController>`)
//! whose methods take `&self`. State lives behind a mutex that is never held
//! across an `.await`: every method applies its queue/cursor mutation in
//! full before re-pointing the media output, then releases the lock and
//! delivers events to subscribers.

use crate::{
    config::PlaybackConfig,
    error::{PlaybackError, Result, ScopeError},
    events::{EventBus, PlaybackEvent, SubscriptionId},
    output::MediaOutput,
    queue::Queue,
    reporter::{PlayCountTracker, PlayReporter},
    scope::{Scope, ScopeResolver},
    shuffle::{place_current, random_index, shuffle},
    types::{PlaybackSnapshot, RepeatMode, TrackItem},
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Outcome of asking the scope resolver for candidates
enum Candidates {
    Fetched(Vec<TrackItem>),
    FetchFailed { scope: Scope, error: ScopeError },
    NoResolver,
}

/// Mutable engine state
struct EngineState {
    current_item: Option<TrackItem>,
    is_playing: bool,
    is_shuffling: bool,
    repeat: RepeatMode,

    queue: Queue,
    output: Box<dyn MediaOutput>,
    play_count: PlayCountTracker,

    // Collected while the lock is held, delivered after release
    pending_events: Vec<PlaybackEvent>,
}

/// Central playback management
///
/// Public operations never fail for the recoverable conditions of the
/// engine: navigation on an empty queue is a no-op, scope fetch failures
/// fall back to the in-memory queue, and play report failures are dropped.
pub struct PlaybackController {
    state: Mutex<EngineState>,
    events: EventBus,
    scope_resolver: RwLock<Option<Arc<dyn ScopeResolver>>>,
    play_reporter: RwLock<Option<Arc<dyn PlayReporter>>>,
}

impl PlaybackController {
    /// Create new playback controller around a media output
    pub fn new(config: PlaybackConfig, output: Box<dyn MediaOutput>) -> Self {
        Self {
            state: Mutex::new(EngineState {
                current_item: None,
                is_playing: false,
                is_shuffling: config.shuffle,
                repeat: config.repeat,
                queue: Queue::new(),
                output,
                play_count: PlayCountTracker::new(config.play_count_threshold),
                pending_events: Vec::new(),
            }),
            events: EventBus::new(),
            scope_resolver: RwLock::new(None),
            play_reporter: RwLock::new(None),
        }
    }

    pub fn with_scope_resolver(self, resolver: Arc<dyn ScopeResolver>) -> Self {
        self.set_scope_resolver(Some(resolver));
        self
    }

    pub fn with_play_reporter(self, reporter: Arc<dyn PlayReporter>) -> Self {
        self.set_play_reporter(Some(reporter));
        self
    }

    // ===== Collaborators =====

    /// Register or replace (or remove, with `None`) the scope resolver
    pub fn set_scope_resolver(&self, resolver: Option<Arc<dyn ScopeResolver>>) {
        *self
            .scope_resolver
            .write()
            .unwrap_or_else(PoisonError::into_inner) = resolver;
    }

    /// Register or replace (or remove, with `None`) the play reporter
    pub fn set_play_reporter(&self, reporter: Option<Arc<dyn PlayReporter>>) {
        *self
            .play_reporter
            .write()
            .unwrap_or_else(PoisonError::into_inner) = reporter;
    }

    fn scope_resolver(&self) -> Option<Arc<dyn ScopeResolver>> {
        self.scope_resolver
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn play_reporter(&self) -> Option<Arc<dyn PlayReporter>> {
        self.play_reporter
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ===== Events =====

    /// Subscribe to state-change events
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&PlaybackEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // ===== Playback Control =====

    /// Play `item`, optionally replacing the queue
    ///
    /// With a queue, the cursor moves to `item`; an item missing from the
    /// supplied queue is prepended at index 0. Without a queue, the existing
    /// queue is searched and `item` is appended if absent.
    pub fn play(&self, item: TrackItem, queue: Option<Vec<TrackItem>>) {
        self.with_state(|state| {
            match queue {
                Some(tracks) => {
                    if state.is_shuffling {
                        state.queue.set_original_order(tracks.clone());
                    } else {
                        state.queue.forget_original_order();
                    }
                    if !state.queue.replace(tracks, Some(&item.id)) {
                        debug!("Track {} not in supplied queue, prepending", item.id);
                        state.queue.prepend(item.clone());
                    }
                }
                None => {
                    let index = match state.queue.position_of(&item.id) {
                        Some(index) => index,
                        None => state.queue.push(item.clone()),
                    };
                    state.queue.select(index);
                }
            }
            state.emit_queue_changed();
            state.load(item, true);
            state.set_playing(true);
        });
    }

    /// Pause playback
    ///
    /// No-op when nothing is loaded.
    pub fn pause(&self) {
        self.with_state(|state| {
            if state.current_item.is_none() {
                return;
            }
            state.output.pause();
            state.set_playing(false);
        });
    }

    /// Resume playback of the current item
    ///
    /// No-op when nothing is loaded.
    pub fn resume(&self) {
        self.with_state(|state| {
            if state.current_item.is_none() {
                return;
            }
            if let Err(err) = state.output.play() {
                warn!("Media output failed to resume: {}", err);
            }
            state.set_playing(true);
        });
    }

    /// Skip to next track
    ///
    /// Shuffling picks a uniformly random index (the current track included).
    /// Otherwise the cursor advances, wrapping under repeat-all and stopping
    /// at the end of the queue.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&self) {
        self.with_state(EngineState::advance);
    }

    /// Go to previous track
    ///
    /// Shuffling behaves exactly like `next`. Otherwise the cursor moves
    /// back, wrapping to the last index under repeat-all; at index 0 without
    /// repeat-all this is a no-op.
    pub fn previous(&self) {
        self.with_state(|state| {
            if state.queue.is_empty() {
                return;
            }

            if state.is_shuffling {
                state.select_random();
                return;
            }

            let index = state.queue.current_index();
            if index > 0 {
                state.select(index - 1);
            } else if state.repeat == RepeatMode::All {
                state.select(state.queue.len() - 1);
            }
        });
    }

    /// Handle the media output's "ended" notification
    ///
    /// Repeat-one restarts the same item from zero (same play-count
    /// instance). Anything else behaves exactly like `next`.
    pub fn handle_media_ended(&self) {
        self.with_state(|state| {
            if state.repeat == RepeatMode::One && state.current_item.is_some() {
                if let Err(err) = state.output.seek(Duration::ZERO) {
                    warn!("Failed to restart track: {}", err);
                }
                if let Err(err) = state.output.play() {
                    warn!("Media output failed to restart: {}", err);
                }
                state.set_playing(true);
                return;
            }

            state.advance();
        });
    }

    /// Seek within the current item
    pub fn seek(&self, position: Duration) -> Result<()> {
        self.with_state(|state| {
            if state.current_item.is_none() {
                return Err(PlaybackError::NoTrackLoaded);
            }
            state.output.seek(position)
        })
    }

    // ===== Queue Management =====

    /// Replace the queue contents
    ///
    /// Shuffles the new tracks first when shuffle is on. The cursor follows
    /// the current item; if it is absent the cursor resets to 0 and the
    /// current item keeps playing untouched.
    pub fn update_queue(&self, new_tracks: Vec<TrackItem>) {
        self.with_state(|state| {
            let tracks = if state.is_shuffling {
                let shuffled = shuffle(&new_tracks);
                state.queue.set_original_order(new_tracks);
                shuffled
            } else {
                state.queue.forget_original_order();
                new_tracks
            };

            let current_id = state.current_item.as_ref().map(|t| t.id.clone());
            let found = state.queue.replace(tracks, current_id.as_deref());
            if current_id.is_some() && !found {
                debug!("Current track not in updated queue, cursor reset to 0");
            }
            state.emit_queue_changed();
        });
    }

    // ===== Shuffle & Repeat =====

    /// Toggle shuffle, reconciling the queue against the active scope
    ///
    /// The flag flips immediately; the queue is rebuilt once the resolver
    /// answers. Fetch failures are logged and fall back to the in-memory
    /// queue. Concurrent toggles are not serialized: whichever fetch resolves
    /// last decides the final flag and queue.
    ///
    /// Returns the shuffle flag after reconciliation.
    pub async fn toggle_shuffle(&self) -> bool {
        let enable = self.with_state(|state| {
            let enable = !state.is_shuffling;
            state.set_shuffling(enable);
            enable
        });

        let candidates = match self.scope_resolver() {
            Some(resolver) => {
                let scope = resolver.active_scope();
                debug!("Fetching shuffle candidates for {}", scope);
                match resolver.fetch_candidates(&scope).await {
                    Ok(tracks) => Candidates::Fetched(tracks),
                    Err(error) => Candidates::FetchFailed { scope, error },
                }
            }
            None => Candidates::NoResolver,
        };

        self.with_state(|state| {
            state.apply_shuffle(enable, candidates);
            state.is_shuffling
        })
    }

    /// Cycle repeat mode: Off -> All -> One -> Off
    pub fn toggle_repeat(&self) -> RepeatMode {
        self.with_state(|state| {
            let mode = state.repeat.cycled();
            state.set_repeat(mode);
            mode
        })
    }

    pub fn set_repeat(&self, mode: RepeatMode) {
        self.with_state(|state| state.set_repeat(mode));
    }

    // ===== Play Counting =====

    /// Check playback progress and report the play once past the threshold
    ///
    /// Call from the media output's time-update notification. Report
    /// failures are logged and dropped.
    pub async fn on_time_update(&self) {
        let Some(reporter) = self.play_reporter() else {
            return;
        };

        let due = self.with_state(|state| {
            let current = state.current_item.as_ref()?;
            let elapsed = state.output.current_time();
            let duration = current.duration.or_else(|| state.output.duration());
            state
                .play_count
                .check(elapsed, duration)
                .then(|| current.id.clone())
        });

        let Some(track_id) = due else {
            return;
        };

        match reporter.report_play(&track_id).await {
            Ok(()) => {
                debug!("Reported play for {}", track_id);
                self.events.emit(PlaybackEvent::PlayReported { track_id });
            }
            Err(err) => warn!("{}", err),
        }
    }

    // ===== State Queries =====

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let state = self.lock();
        PlaybackSnapshot {
            current_item: state.current_item.clone(),
            is_playing: state.is_playing,
            is_shuffling: state.is_shuffling,
            repeat_mode: state.repeat,
            queue_len: state.queue.len(),
            current_index: state.queue.current_index(),
        }
    }

    pub fn current_item(&self) -> Option<TrackItem> {
        self.lock().current_item.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.lock().is_playing
    }

    pub fn is_shuffling(&self) -> bool {
        self.lock().is_shuffling
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.lock().repeat
    }

    /// All tracks in playback order
    pub fn queue(&self) -> Vec<TrackItem> {
        self.lock().queue.tracks().to_vec()
    }

    pub fn current_index(&self) -> usize {
        self.lock().queue.current_index()
    }

    pub fn queue_len(&self) -> usize {
        self.lock().queue.len()
    }

    /// Whether the play for the current instance has been reported
    pub fn play_reported(&self) -> bool {
        self.lock().play_count.is_reported()
    }

    // ===== Internal =====

    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a mutation, then deliver the events it produced
    fn with_state<R>(&self, f: impl FnOnce(&mut EngineState) -> R) -> R {
        let (result, events) = {
            let mut state = self.lock();
            let result = f(&mut state);
            (result, std::mem::take(&mut state.pending_events))
        };
        self.events.emit_all(&events);
        result
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("snapshot", &self.snapshot())
            .field("events", &self.events)
            .finish()
    }
}

impl EngineState {
    /// Load `item` into the media output and make it current
    ///
    /// Starts a new play-count instance.
    fn load(&mut self, item: TrackItem, autoplay: bool) {
        let previous_track_id = self.current_item.as_ref().map(|t| t.id.clone());

        if let Err(err) = self.output.set_source(&item.media_url) {
            warn!("Failed to set media source for {}: {}", item.id, err);
        }
        if autoplay {
            if let Err(err) = self.output.play() {
                warn!("Media output failed to start {}: {}", item.id, err);
            }
        }

        self.play_count.reset();
        self.current_item = Some(item.clone());
        self.emit(PlaybackEvent::NowPlaying {
            track: item,
            previous_track_id,
        });
    }

    /// Move the cursor and load the item there, keeping the playing flag
    fn select(&mut self, index: usize) {
        let Some(item) = self.queue.select(index).cloned() else {
            return;
        };
        self.emit_queue_changed();
        let autoplay = self.is_playing;
        self.load(item, autoplay);
    }

    fn select_random(&mut self) {
        if let Some(index) = random_index(self.queue.len(), &mut rand::thread_rng()) {
            self.select(index);
        }
    }

    fn advance(&mut self) {
        if self.queue.is_empty() {
            return;
        }

        if self.is_shuffling {
            self.select_random();
            return;
        }

        let next = self.queue.current_index() + 1;
        if next < self.queue.len() {
            self.select(next);
        } else if self.repeat == RepeatMode::All {
            self.select(0);
        } else {
            debug!("Reached end of queue");
            self.output.pause();
            self.set_playing(false);
        }
    }

    /// Rebuild the queue around the current item after a shuffle toggle
    ///
    /// Never re-points the media output: the track in progress keeps playing.
    fn apply_shuffle(&mut self, enable: bool, candidates: Candidates) {
        self.set_shuffling(enable);

        let base = match (enable, candidates) {
            (_, Candidates::FetchFailed { scope, error }) => {
                warn!(
                    "Failed to fetch candidates for {}: {}; using current queue",
                    scope, error
                );
                self.emit(PlaybackEvent::ScopeFetchFailed {
                    scope,
                    message: error.to_string(),
                });
                if enable {
                    Some(self.shuffle_local())
                } else {
                    // Canonical order is unrecoverable, keep the shuffled one
                    self.queue.forget_original_order();
                    None
                }
            }
            (true, Candidates::Fetched(tracks)) => {
                let shuffled = shuffle(&tracks);
                self.queue.set_original_order(tracks);
                Some(shuffled)
            }
            (true, Candidates::NoResolver) => Some(self.shuffle_local()),
            (false, Candidates::Fetched(tracks)) => {
                self.queue.forget_original_order();
                Some(tracks)
            }
            (false, Candidates::NoResolver) => self.queue.take_original_order(),
        };

        let Some(base) = base else {
            return;
        };

        let (tracks, index) = place_current(base, self.current_item.as_ref());
        info!(
            "Shuffle {}: queue rebuilt with {} tracks",
            if enable { "on" } else { "off" },
            tracks.len()
        );
        self.queue.install(tracks, index);
        self.emit_queue_changed();
    }

    /// Shuffle the in-memory queue, remembering its order for unshuffle
    fn shuffle_local(&mut self) -> Vec<TrackItem> {
        let base = self.queue.tracks().to_vec();
        let shuffled = shuffle(&base);
        self.queue.set_original_order(base);
        shuffled
    }

    fn set_playing(&mut self, is_playing: bool) {
        if self.is_playing != is_playing {
            self.is_playing = is_playing;
            self.emit(PlaybackEvent::StateChanged { is_playing });
        }
    }

    fn set_shuffling(&mut self, enabled: bool) {
        if self.is_shuffling != enabled {
            self.is_shuffling = enabled;
            self.emit(PlaybackEvent::ShuffleChanged { enabled });
        }
    }

    fn set_repeat(&mut self, mode: RepeatMode) {
        if self.repeat != mode {
            self.repeat = mode;
            self.emit(PlaybackEvent::RepeatChanged { mode });
        }
    }

    fn emit_queue_changed(&mut self) {
        self.emit(PlaybackEvent::QueueChanged {
            length: self.queue.len(),
            current_index: self.queue.current_index(),
        });
    }

    fn emit(&mut self, event: PlaybackEvent) {
        self.pending_events.push(event);
    }
}
