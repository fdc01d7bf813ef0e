//! Shared fixtures for playback integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chorus_playback::{
    MediaOutput, PlaybackConfig, PlaybackController, PlaybackEvent, Result, Scope, ScopeError,
    ScopeResolver, TrackItem,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use tokio::sync::oneshot;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

pub fn create_track(id: &str) -> TrackItem {
    TrackItem::new(id, format!("Track {}", id), format!("/media/{}.mp3", id))
        .with_duration(Duration::from_secs(180))
}

pub fn tracks(ids: &[&str]) -> Vec<TrackItem> {
    ids.iter().map(|id| create_track(id)).collect()
}

pub fn ids(tracks: &[TrackItem]) -> Vec<String> {
    tracks.iter().map(|t| t.id.clone()).collect()
}

pub fn sorted_ids(tracks: &[TrackItem]) -> Vec<String> {
    let mut ids = ids(tracks);
    ids.sort();
    ids
}

// ===== Media output =====

/// What the controller did to the output
#[derive(Debug, Default)]
pub struct OutputLog {
    pub source: Option<String>,
    pub sources: Vec<String>,
    pub playing: bool,
    pub position: Duration,
    pub seeks: Vec<Duration>,
    pub duration: Option<Duration>,
}

/// Media output that records every call into a shared log
#[derive(Debug, Clone, Default)]
pub struct RecordingOutput {
    pub log: Arc<Mutex<OutputLog>>,
}

impl RecordingOutput {
    pub fn set_position(&self, position: Duration) {
        self.log.lock().unwrap().position = position;
    }

    pub fn source(&self) -> Option<String> {
        self.log.lock().unwrap().source.clone()
    }

    pub fn source_changes(&self) -> usize {
        self.log.lock().unwrap().sources.len()
    }

    pub fn is_playing(&self) -> bool {
        self.log.lock().unwrap().playing
    }
}

impl MediaOutput for RecordingOutput {
    fn set_source(&mut self, url: &str) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        log.source = Some(url.to_string());
        log.sources.push(url.to_string());
        log.position = Duration::ZERO;
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        self.log.lock().unwrap().playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.log.lock().unwrap().playing = false;
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        log.position = position;
        log.seeks.push(position);
        Ok(())
    }

    fn current_time(&self) -> Duration {
        self.log.lock().unwrap().position
    }

    fn duration(&self) -> Option<Duration> {
        self.log.lock().unwrap().duration
    }
}

pub fn controller() -> (Arc<PlaybackController>, RecordingOutput) {
    controller_with(PlaybackConfig::default())
}

pub fn controller_with(config: PlaybackConfig) -> (Arc<PlaybackController>, RecordingOutput) {
    init_tracing();
    let output = RecordingOutput::default();
    let controller = PlaybackController::new(config, Box::new(output.clone()));
    (Arc::new(controller), output)
}

/// Collect every event the controller emits
pub fn record_events(controller: &PlaybackController) -> Arc<Mutex<Vec<PlaybackEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    controller.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
    events
}

// ===== Scope resolvers =====

/// Resolver with a fixed answer that records every scope it was asked for
pub struct StaticResolver {
    scope: Scope,
    answer: std::result::Result<Vec<TrackItem>, ScopeError>,
    pub requested: Mutex<Vec<Scope>>,
}

impl StaticResolver {
    pub fn ok(scope: Scope, tracks: Vec<TrackItem>) -> Arc<Self> {
        Arc::new(Self {
            scope,
            answer: Ok(tracks),
            requested: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(scope: Scope, error: ScopeError) -> Arc<Self> {
        Arc::new(Self {
            scope,
            answer: Err(error),
            requested: Mutex::new(Vec::new()),
        })
    }

    pub fn requested(&self) -> Vec<Scope> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScopeResolver for StaticResolver {
    fn active_scope(&self) -> Scope {
        self.scope.clone()
    }

    async fn fetch_candidates(
        &self,
        scope: &Scope,
    ) -> std::result::Result<Vec<TrackItem>, ScopeError> {
        self.requested.lock().unwrap().push(scope.clone());
        self.answer.clone()
    }
}

type Answer = std::result::Result<Vec<TrackItem>, ScopeError>;

/// Resolver whose fetches block until the test releases them
///
/// Each `fetch_candidates` call takes the next gate in FIFO order.
pub struct GatedResolver {
    gates: Mutex<VecDeque<oneshot::Receiver<Answer>>>,
}

impl GatedResolver {
    /// Create a resolver with `count` gates and the senders that open them
    pub fn new(count: usize) -> (Arc<Self>, Vec<oneshot::Sender<Answer>>) {
        let mut senders = Vec::with_capacity(count);
        let mut receivers = VecDeque::with_capacity(count);
        for _ in 0..count {
            let (tx, rx) = oneshot::channel();
            senders.push(tx);
            receivers.push_back(rx);
        }
        (
            Arc::new(Self {
                gates: Mutex::new(receivers),
            }),
            senders,
        )
    }

    /// Gates not yet taken by a fetch
    pub fn remaining(&self) -> usize {
        self.gates.lock().unwrap().len()
    }

    /// Yield until in-flight fetches have taken all but `remaining` gates
    pub async fn wait_until_remaining(&self, remaining: usize) {
        while self.remaining() > remaining {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl ScopeResolver for GatedResolver {
    fn active_scope(&self) -> Scope {
        Scope::All
    }

    async fn fetch_candidates(&self, _scope: &Scope) -> Answer {
        let gate = self
            .gates
            .lock()
            .unwrap()
            .pop_front()
            .expect("more fetches than gates");
        gate.await
            .unwrap_or_else(|_| Err(ScopeError::Network("gate dropped".to_string())))
    }
}
