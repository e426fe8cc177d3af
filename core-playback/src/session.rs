//! # Playback Session
//!
//! The state machine that owns one media engine, one position into the bound
//! catalog, and the shuffle flag.
//!
//! ## Overview
//!
//! Commands (`select_track`, `next`, `pause`, ...) and engine callbacks
//! (`on_prepared`, `on_playback_error`, `on_playback_finished`) are plain
//! `&mut self` methods. Nothing here spawns or locks: the
//! [`SessionActor`](crate::actor::SessionActor) serialises both streams onto a
//! single task, and tests can drive a session directly.
//!
//! ## Degrading instead of failing
//!
//! Source-resolution and engine failures never surface as errors from the
//! command that triggered them. The session logs, records a
//! [`PlaybackFault`], emits an event and falls back to `Idle`. Only caller
//! mistakes (`InvalidIndex`, `EmptyCatalog`, `SessionClosed`) and engine control failures are
//! returned as `Err`.

use crate::error::{PlaybackError, Result};
use crate::sequencer;
use crate::state::{FaultKind, PlaybackFault, ResourceState, SessionId, SessionSnapshot};
use bridge_traits::{
    EngineErrorCode, EngineEvent, EngineEventSink, LoadToken, LocatorResolver, MediaEngine,
    NowPlaying, NowPlayingNotifier,
};
use core_library::{Track, TrackCatalog};
use core_runtime::config::{CoreConfig, PlaybackSettings};
use core_runtime::events::{CoreEvent, EventBus, LibraryEvent, PlaybackEvent};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Stateful owner of the decoding/output resource.
pub struct PlaybackSession {
    id: SessionId,
    engine: Box<dyn MediaEngine>,
    resolver: Arc<dyn LocatorResolver>,
    notifier: Arc<dyn NowPlayingNotifier>,
    events: EventBus,
    settings: PlaybackSettings,
    rng: StdRng,

    catalog: Option<TrackCatalog>,
    position: usize,
    shuffle_enabled: bool,
    current_title: String,
    state: ResourceState,
    load_token: LoadToken,
    last_fault: Option<PlaybackFault>,
    released: bool,
}

impl PlaybackSession {
    pub fn new(
        engine: Box<dyn MediaEngine>,
        resolver: Arc<dyn LocatorResolver>,
        notifier: Arc<dyn NowPlayingNotifier>,
        settings: PlaybackSettings,
        events: EventBus,
    ) -> Self {
        Self {
            id: SessionId::new(),
            engine,
            resolver,
            notifier,
            events,
            shuffle_enabled: settings.start_shuffled,
            settings,
            rng: StdRng::from_entropy(),
            catalog: None,
            position: 0,
            current_title: String::new(),
            state: ResourceState::Idle,
            load_token: LoadToken::default(),
            last_fault: None,
            released: false,
        }
    }

    /// Build a session from validated configuration.
    pub fn from_config(engine: Box<dyn MediaEngine>, config: &CoreConfig, events: EventBus) -> Self {
        Self::new(
            engine,
            Arc::clone(&config.locator_resolver),
            Arc::clone(&config.now_playing_notifier),
            config.playback.clone(),
            events,
        )
    }

    /// Replace the shuffle random source, e.g. with a seeded one.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Route engine callbacks to `sink`.
    pub fn attach_engine_sink(&mut self, sink: Arc<dyn EngineEventSink>) {
        self.engine.attach(sink);
    }

    // =========================================================================
    // Catalog binding
    // =========================================================================

    /// Hand the session its catalog. Resets the position to `0`.
    ///
    /// Rebinding is allowed. Anything loading or playing from the previous
    /// catalog is stopped first, so the session is `Idle` afterwards and no
    /// callback from the old load is honoured.
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::SessionClosed`] after [`release`](Self::release)
    /// - [`PlaybackError::Engine`] if the engine refuses to reset
    pub async fn bind_catalog(&mut self, catalog: TrackCatalog) -> Result<()> {
        self.ensure_open()?;

        if self.state != ResourceState::Idle {
            debug!(state = %self.state, "Stopping playback before rebinding catalog");
            self.load_token = self.load_token.next();
            self.state = ResourceState::Idle;
            if let Err(err) = self.notifier.clear().await {
                warn!(error = %err, "Failed to clear now-playing indicator");
            }
            self.engine.reset().await?;
        }

        info!(session_id = %self.id, track_count = catalog.len(), "Binding catalog");
        self.emit_library(LibraryEvent::CatalogBound {
            session_id: self.id.to_string(),
            track_count: catalog.len(),
        });
        self.catalog = Some(catalog);
        self.position = 0;
        self.current_title.clear();
        Ok(())
    }

    fn catalog_len(&self) -> usize {
        self.catalog.as_ref().map_or(0, TrackCatalog::len)
    }

    fn current_track(&self) -> Option<&Track> {
        self.catalog.as_ref().and_then(|c| c.get(self.position))
    }

    fn is_bound(&self) -> bool {
        self.catalog.is_some() && !self.released
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Start loading the track at `index`.
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::InvalidIndex`] if `index` is outside the catalog
    ///   (state untouched)
    /// - [`PlaybackError::Engine`] if the engine refuses to reset
    /// - [`PlaybackError::SessionClosed`] after [`release`](Self::release)
    ///
    /// An unresolvable locator is not an error: the session stays `Idle` and
    /// records a fault.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn select_track(&mut self, index: usize) -> Result<()> {
        self.ensure_open()?;
        let len = self.catalog_len();
        let track = match self.catalog.as_ref().and_then(|c| c.get(index)) {
            Some(track) => track.clone(),
            None => return Err(PlaybackError::InvalidIndex { index, len }),
        };

        self.position = index;
        self.state = ResourceState::Idle;
        self.engine.reset().await?;

        let track_id = track.id().value();
        let locator = match self.resolver.resolve(track_id) {
            Ok(locator) => locator,
            Err(err) => {
                warn!(track_id, error = %err, "Could not resolve track source");
                self.record_fault(FaultKind::SourceResolution, Some(track_id), err.to_string());
                self.emit(PlaybackEvent::SourceUnresolved {
                    session_id: self.id.to_string(),
                    track_id,
                    reason: err.to_string(),
                });
                return Ok(());
            }
        };

        self.load_token = self.load_token.next();
        self.current_title = track.title().to_string();
        self.state = ResourceState::Preparing;

        debug!(track_id, locator = %locator, token = %self.load_token, "Loading track");
        self.emit(PlaybackEvent::Preparing {
            session_id: self.id.to_string(),
            position: index,
            track_id,
            title: self.current_title.clone(),
        });

        if let Err(err) = self.engine.load_async(&locator, self.load_token).await {
            warn!(track_id, error = %err, "Engine refused to load track");
            self.fail_playback(EngineErrorCode::default(), err.to_string())
                .await;
        }

        Ok(())
    }

    /// Advance to the next track (random other track when shuffling).
    pub async fn next(&mut self) -> Result<()> {
        self.ensure_open()?;
        let index = sequencer::next_index(
            self.position,
            self.catalog_len(),
            self.shuffle_enabled,
            &mut self.rng,
        )
        .ok_or(PlaybackError::EmptyCatalog)?;

        debug!(from = self.position, to = index, shuffle = self.shuffle_enabled, "Next track");
        self.select_track(index).await
    }

    /// Step back one track, wrapping to the end. Ignores shuffle.
    pub async fn previous(&mut self) -> Result<()> {
        self.ensure_open()?;
        let index = sequencer::previous_index(self.position, self.catalog_len())
            .ok_or(PlaybackError::EmptyCatalog)?;

        debug!(from = self.position, to = index, "Previous track");
        self.select_track(index).await
    }

    /// Pause output. No-op unless playing.
    pub async fn pause(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.state != ResourceState::Playing {
            debug!(state = %self.state, "Ignoring pause");
            return Ok(());
        }

        self.engine.pause().await?;
        self.state = ResourceState::Paused;

        let position_ms = self.engine.current_position().await;
        self.emit(PlaybackEvent::Paused {
            session_id: self.id.to_string(),
            position_ms,
        });
        Ok(())
    }

    /// Resume output. No-op unless paused.
    pub async fn resume(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.state != ResourceState::Paused {
            debug!(state = %self.state, "Ignoring resume");
            return Ok(());
        }

        self.engine.start().await?;
        self.state = ResourceState::Playing;

        let position_ms = self.engine.current_position().await;
        self.emit(PlaybackEvent::Resumed {
            session_id: self.id.to_string(),
            position_ms,
        });
        Ok(())
    }

    /// Seek within the current track. No-op before the engine is prepared.
    ///
    /// The position is not checked against the duration; the engine clamps.
    pub async fn seek(&mut self, position_ms: u64) -> Result<()> {
        self.ensure_open()?;
        if !self.state.can_seek() {
            debug!(state = %self.state, position_ms, "Ignoring seek");
            return Ok(());
        }

        self.engine.seek_to(position_ms).await?;
        self.emit(PlaybackEvent::Seeked {
            session_id: self.id.to_string(),
            position_ms,
        });
        Ok(())
    }

    /// Flip the shuffle flag and return its new value.
    ///
    /// Only the next call to [`next`](Self::next) is affected.
    pub fn toggle_shuffle(&mut self) -> Result<bool> {
        self.ensure_open()?;
        self.shuffle_enabled = !self.shuffle_enabled;
        debug!(enabled = self.shuffle_enabled, "Shuffle toggled");
        self.emit(PlaybackEvent::ShuffleChanged {
            session_id: self.id.to_string(),
            enabled: self.shuffle_enabled,
        });
        Ok(self.shuffle_enabled)
    }

    /// Tear down the engine and clear the now-playing indicator.
    ///
    /// Every command after this fails with [`PlaybackError::SessionClosed`];
    /// queries report zero and engine callbacks are ignored.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }

        self.released = true;
        self.state = ResourceState::Idle;
        self.load_token = self.load_token.next();

        if let Err(err) = self.notifier.clear().await {
            warn!(error = %err, "Failed to clear now-playing indicator");
        }

        let reset = self.engine.reset().await;
        let release = self.engine.release().await;

        info!("Session released");
        self.emit(PlaybackEvent::Released {
            session_id: self.id.to_string(),
        });

        reset?;
        release?;
        Ok(())
    }

    // =========================================================================
    // Engine callbacks
    // =========================================================================

    /// Dispatch an engine callback to the matching handler.
    pub async fn handle_engine_event(&mut self, event: EngineEvent) -> Result<()> {
        match event {
            EngineEvent::Prepared { token } => {
                self.on_prepared(token).await;
                Ok(())
            }
            EngineEvent::Error { token, code } => {
                self.on_playback_error(token, code).await;
                Ok(())
            }
            EngineEvent::Completed { token } => self.on_playback_finished(token).await,
        }
    }

    /// The engine finished preparing: start output and fire the now-playing hook.
    pub async fn on_prepared(&mut self, token: LoadToken) {
        if self.state != ResourceState::Preparing || !self.is_current(token) {
            debug!(state = %self.state, %token, current = %self.load_token, "Ignoring prepared callback");
            return;
        }

        self.state = ResourceState::Ready;

        if let Err(err) = self.engine.start().await {
            warn!(error = %err, "Engine failed to start output");
            self.fail_playback(EngineErrorCode::default(), err.to_string())
                .await;
            return;
        }

        self.state = ResourceState::Playing;
        info!(title = %self.current_title, position = self.position, "Playback started");

        let now_playing =
            NowPlaying::for_track(self.settings.notification_title.as_str(), self.current_title.as_str());
        if let Err(err) = self.notifier.show(now_playing).await {
            warn!(error = %err, "Failed to show now-playing indicator");
        }

        let track_id = self.current_track().map_or(0, |t| t.id().value());
        self.emit(PlaybackEvent::Started {
            session_id: self.id.to_string(),
            track_id,
            title: self.current_title.clone(),
        });
    }

    /// The engine failed: reset and fall back to `Idle`. No retry, no advance.
    pub async fn on_playback_error(&mut self, token: LoadToken, code: EngineErrorCode) {
        if !self.state.accepts_engine_error() || !self.is_current(token) {
            debug!(state = %self.state, %token, %code, "Ignoring error callback");
            return;
        }

        warn!(%code, position = self.position, "Engine reported playback error");
        self.fail_playback(code, format!("engine error {}", code))
            .await;
    }

    /// Output reached the end of the track: advance exactly once.
    ///
    /// Some engines report completion before any audio was produced; a
    /// completion at elapsed position `0` is ignored.
    pub async fn on_playback_finished(&mut self, token: LoadToken) -> Result<()> {
        if self.state != ResourceState::Playing || !self.is_current(token) {
            debug!(state = %self.state, %token, "Ignoring completion callback");
            return Ok(());
        }

        let elapsed = self.engine.current_position().await;
        if elapsed == 0 {
            debug!("Ignoring completion reported at position 0");
            return Ok(());
        }

        let track_id = self.current_track().map_or(0, |t| t.id().value());
        info!(track_id, elapsed_ms = elapsed, "Track completed");
        self.emit(PlaybackEvent::Completed {
            session_id: self.id.to_string(),
            track_id,
        });

        self.state = ResourceState::Idle;
        self.engine.reset().await?;
        self.next().await
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Elapsed milliseconds, or `0` unless the engine is actively playing.
    pub async fn current_position(&self) -> u64 {
        if self.is_bound() && self.engine.is_active().await {
            self.engine.current_position().await
        } else {
            0
        }
    }

    /// Track length in milliseconds, or `0` unless the engine is actively playing.
    pub async fn duration(&self) -> u64 {
        if self.is_bound() && self.engine.is_active().await {
            self.engine.duration().await
        } else {
            0
        }
    }

    pub async fn is_playing(&self) -> bool {
        self.is_bound() && self.engine.is_active().await
    }

    /// Title of the last track that started loading.
    pub fn current_title(&self) -> &str {
        &self.current_title
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn state(&self) -> ResourceState {
        self.state
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.shuffle_enabled
    }

    pub fn load_token(&self) -> LoadToken {
        self.load_token
    }

    pub fn last_fault(&self) -> Option<&PlaybackFault> {
        self.last_fault.as_ref()
    }

    pub fn catalog(&self) -> Option<&TrackCatalog> {
        self.catalog.as_ref()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            position: self.position,
            shuffle_enabled: self.shuffle_enabled,
            state: self.state,
            current_title: self.current_title.clone(),
            track_id: self.current_track().map(|t| t.id().value()),
            catalog_len: self.catalog_len(),
            last_fault: self.last_fault.clone(),
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn ensure_open(&self) -> Result<()> {
        if self.released {
            return Err(PlaybackError::SessionClosed);
        }
        Ok(())
    }

    fn is_current(&self, token: LoadToken) -> bool {
        token == self.load_token
    }

    /// Error → reset → Idle, with the failure recorded and announced.
    async fn fail_playback(&mut self, code: EngineErrorCode, message: String) {
        self.state = ResourceState::Error;

        let track_id = self.current_track().map(|t| t.id().value());
        self.record_fault(FaultKind::DecodeOrPlayback { code }, track_id, message.clone());
        self.emit(PlaybackEvent::Error {
            session_id: self.id.to_string(),
            track_id,
            message,
        });

        if let Err(err) = self.engine.reset().await {
            warn!(error = %err, "Engine reset after failure did not succeed");
        }
        self.state = ResourceState::Idle;
    }

    fn record_fault(&mut self, kind: FaultKind, track_id: Option<i64>, message: String) {
        self.last_fault = Some(PlaybackFault {
            kind,
            position: self.position,
            track_id,
            message,
        });
    }

    fn emit(&self, event: PlaybackEvent) {
        // No subscribers is a normal state.
        let _ = self.events.emit(CoreEvent::Playback(event));
    }

    fn emit_library(&self, event: LibraryEvent) {
        let _ = self.events.emit(CoreEvent::Library(event));
    }
}

impl std::fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("position", &self.position)
            .field("shuffle_enabled", &self.shuffle_enabled)
            .field("current_title", &self.current_title)
            .field("catalog_len", &self.catalog_len())
            .field("load_token", &self.load_token)
            .finish()
    }
}
