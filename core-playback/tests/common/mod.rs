//! Shared fixtures for playback integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::{
    ContentLocator, EngineEvent, EngineEventSink, LoadToken, LocatorResolver, MediaEngine,
    MediaStoreResolver, NowPlaying, NowPlayingNotifier,
};
use core_library::{Track, TrackCatalog};
use core_playback::PlaybackSession;
use core_runtime::config::PlaybackSettings;
use core_runtime::events::EventBus;
use mockall::mock;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};

// ============================================================================
// Fake MediaEngine
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Reset,
    Load(String),
    Start,
    Pause,
    SeekTo(u64),
    Release,
}

#[derive(Default)]
pub struct EngineState {
    pub calls: Vec<EngineCall>,
    pub position_ms: u64,
    pub duration_ms: u64,
    pub active: bool,
    pub last_token: Option<LoadToken>,
    pub sink: Option<Arc<dyn EngineEventSink>>,
    pub fail_load: bool,
    pub fail_start: bool,
}

/// Test-side view of a [`FakeEngine`] after it has been moved into a session.
#[derive(Clone, Default)]
pub struct EngineProbe(Arc<Mutex<EngineState>>);

impl EngineProbe {
    pub fn engine(&self) -> Box<dyn MediaEngine> {
        Box::new(FakeEngine {
            probe: self.clone(),
        })
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.0.lock().unwrap().calls.clone()
    }

    pub fn load_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, EngineCall::Load(_)))
            .count()
    }

    pub fn count(&self, call: &EngineCall) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn last_token(&self) -> LoadToken {
        self.0
            .lock()
            .unwrap()
            .last_token
            .expect("engine has not been asked to load anything")
    }

    pub fn last_locator(&self) -> Option<String> {
        self.calls().iter().rev().find_map(|c| match c {
            EngineCall::Load(locator) => Some(locator.clone()),
            _ => None,
        })
    }

    pub fn set_position(&self, position_ms: u64) {
        self.0.lock().unwrap().position_ms = position_ms;
    }

    pub fn set_duration(&self, duration_ms: u64) {
        self.0.lock().unwrap().duration_ms = duration_ms;
    }

    pub fn fail_next_load(&self) {
        self.0.lock().unwrap().fail_load = true;
    }

    pub fn fail_start(&self) {
        self.0.lock().unwrap().fail_start = true;
    }

    pub fn is_active(&self) -> bool {
        self.0.lock().unwrap().active
    }

    /// Deliver a callback the way the platform would, through the attached sink.
    pub fn deliver(&self, event: EngineEvent) {
        let sink = self
            .0
            .lock()
            .unwrap()
            .sink
            .clone()
            .expect("no sink attached");
        sink.deliver(event);
    }

    pub fn has_sink(&self) -> bool {
        self.0.lock().unwrap().sink.is_some()
    }
}

pub struct FakeEngine {
    probe: EngineProbe,
}

impl FakeEngine {
    fn with_state<T>(&self, f: impl FnOnce(&mut EngineState) -> T) -> T {
        f(&mut self.probe.0.lock().unwrap())
    }
}

#[async_trait]
impl MediaEngine for FakeEngine {
    fn attach(&mut self, sink: Arc<dyn EngineEventSink>) {
        self.with_state(|s| s.sink = Some(sink));
    }

    async fn reset(&mut self) -> BridgeResult<()> {
        self.with_state(|s| {
            s.calls.push(EngineCall::Reset);
            s.active = false;
            s.position_ms = 0;
        });
        Ok(())
    }

    async fn load_async(&mut self, locator: &ContentLocator, token: LoadToken) -> BridgeResult<()> {
        self.with_state(|s| {
            s.calls.push(EngineCall::Load(locator.as_str().to_string()));
            if std::mem::take(&mut s.fail_load) {
                return Err(BridgeError::OperationFailed("unsupported format".into()));
            }
            s.last_token = Some(token);
            Ok(())
        })
    }

    async fn start(&mut self) -> BridgeResult<()> {
        self.with_state(|s| {
            s.calls.push(EngineCall::Start);
            if s.fail_start {
                return Err(BridgeError::OperationFailed("audio device busy".into()));
            }
            s.active = true;
            Ok(())
        })
    }

    async fn pause(&mut self) -> BridgeResult<()> {
        self.with_state(|s| {
            s.calls.push(EngineCall::Pause);
            s.active = false;
        });
        Ok(())
    }

    async fn seek_to(&mut self, position_ms: u64) -> BridgeResult<()> {
        self.with_state(|s| {
            s.calls.push(EngineCall::SeekTo(position_ms));
            s.position_ms = position_ms;
        });
        Ok(())
    }

    async fn current_position(&self) -> u64 {
        self.with_state(|s| s.position_ms)
    }

    async fn duration(&self) -> u64 {
        self.with_state(|s| s.duration_ms)
    }

    async fn is_active(&self) -> bool {
        self.with_state(|s| s.active)
    }

    async fn release(&mut self) -> BridgeResult<()> {
        self.with_state(|s| {
            s.calls.push(EngineCall::Release);
            s.active = false;
        });
        Ok(())
    }
}

// ============================================================================
// Bridge mocks
// ============================================================================

mock! {
    pub Resolver {}

    impl LocatorResolver for Resolver {
        fn resolve(&self, track_id: i64) -> BridgeResult<ContentLocator>;
    }
}

mock! {
    pub Notifier {}

    #[async_trait]
    impl NowPlayingNotifier for Notifier {
        async fn show(&self, now_playing: NowPlaying) -> BridgeResult<()>;
        async fn clear(&self) -> BridgeResult<()>;
    }
}

/// Notifier that remembers everything it was asked to show.
#[derive(Default)]
pub struct RecordingNotifier {
    pub shown: Mutex<Vec<NowPlaying>>,
    pub cleared: Mutex<usize>,
}

impl RecordingNotifier {
    pub fn shown_titles(&self) -> Vec<String> {
        self.shown
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.text.clone())
            .collect()
    }

    pub fn clear_count(&self) -> usize {
        *self.cleared.lock().unwrap()
    }
}

#[async_trait]
impl NowPlayingNotifier for RecordingNotifier {
    async fn show(&self, now_playing: NowPlaying) -> BridgeResult<()> {
        self.shown.lock().unwrap().push(now_playing);
        Ok(())
    }

    async fn clear(&self) -> BridgeResult<()> {
        *self.cleared.lock().unwrap() += 1;
        Ok(())
    }
}

// ============================================================================
// Catalog & session helpers
// ============================================================================

/// Three tracks handed over out of order; sorted they are Alpha(10), Bravo(20), Charlie(30).
pub fn abc_catalog() -> TrackCatalog {
    TrackCatalog::from_tracks(vec![
        Track::new(30, "Charlie", "Gamma"),
        Track::new(10, "Alpha", "Alef"),
        Track::new(20, "Bravo", "Beta"),
    ])
}

pub fn catalog_of(len: usize) -> TrackCatalog {
    (0..len)
        .map(|i| Track::new(i as i64 + 1, format!("Track {:02}", i), "Various"))
        .collect()
}

pub struct Harness {
    pub session: PlaybackSession,
    pub probe: EngineProbe,
    pub notifier: Arc<RecordingNotifier>,
    pub events: EventBus,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_resolver(Arc::new(MediaStoreResolver::default()))
    }

    pub fn with_resolver(resolver: Arc<dyn LocatorResolver>) -> Self {
        let probe = EngineProbe::default();
        let notifier = Arc::new(RecordingNotifier::default());
        let events = EventBus::new(256);
        let session = PlaybackSession::new(
            probe.engine(),
            resolver,
            notifier.clone(),
            PlaybackSettings::default(),
            events.clone(),
        )
        .with_rng(StdRng::seed_from_u64(7));

        Self {
            session,
            probe,
            notifier,
            events,
        }
    }

    pub async fn bound(catalog: TrackCatalog) -> Self {
        let mut harness = Self::new();
        harness.session.bind_catalog(catalog).await.unwrap();
        harness
    }

    /// Select `index` and complete preparation so the session is `Playing`.
    pub async fn play(&mut self, index: usize) {
        self.session.select_track(index).await.unwrap();
        let token = self.probe.last_token();
        self.session.on_prepared(token).await;
    }
}
