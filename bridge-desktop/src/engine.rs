//! Timer-driven media engine simulation.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::{
    ContentLocator, EngineErrorCode, EngineEvent, EngineEventSink, LoadToken, MediaEngine,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Error reported for locators registered with [`SimulatedMediaEngine::fail_locator`].
const UNSUPPORTED_SOURCE: (i32, i32) = (1, -1010);

/// Timing of the simulated engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Delay between `load_async` and the `Prepared` callback.
    pub prepare_delay: Duration,
    /// Length reported for every source.
    pub track_duration: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            prepare_delay: Duration::from_millis(50),
            track_duration: Duration::from_secs(180),
        }
    }
}

/// Elapsed-position bookkeeping that only advances while output runs.
#[derive(Debug, Default)]
struct PlaybackClock {
    offset: Duration,
    running_since: Option<Instant>,
}

impl PlaybackClock {
    fn elapsed(&self) -> Duration {
        self.offset + self.running_since.map_or(Duration::ZERO, |t| t.elapsed())
    }

    fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    fn run(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }

    fn stop(&mut self) {
        self.offset = self.elapsed();
        self.running_since = None;
    }

    fn jump_to(&mut self, at: Duration) {
        self.offset = at;
        if self.running_since.is_some() {
            self.running_since = Some(Instant::now());
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// [`MediaEngine`] that plays silence on tokio timers.
///
/// Every load reports `Prepared` after the configured delay, or `Error` if
/// its locator was registered as failing. Once started, `Completed` is
/// reported when the simulated position reaches the track duration. Timers
/// are cancelled by `reset`, so stale callbacks only appear if a test
/// delivers them on purpose.
///
/// Must be driven from within a tokio runtime.
pub struct SimulatedMediaEngine {
    config: SimulationConfig,
    sink: Option<Arc<dyn EngineEventSink>>,
    failing: HashSet<String>,
    loaded: Option<LoadToken>,
    clock: PlaybackClock,
    prepare_timer: Option<JoinHandle<()>>,
    completion_timer: Option<JoinHandle<()>>,
    released: bool,
}

impl SimulatedMediaEngine {
    pub fn new() -> Self {
        Self::with_config(SimulationConfig::default())
    }

    pub fn with_config(config: SimulationConfig) -> Self {
        Self {
            config,
            sink: None,
            failing: HashSet::new(),
            loaded: None,
            clock: PlaybackClock::default(),
            prepare_timer: None,
            completion_timer: None,
            released: false,
        }
    }

    pub fn with_prepare_delay(mut self, delay: Duration) -> Self {
        self.config.prepare_delay = delay;
        self
    }

    pub fn with_track_duration(mut self, duration: Duration) -> Self {
        self.config.track_duration = duration;
        self
    }

    /// Make every load of `locator` fail with a decode error.
    pub fn fail_locator(mut self, locator: impl Into<String>) -> Self {
        self.failing.insert(locator.into());
        self
    }

    pub fn config(&self) -> SimulationConfig {
        self.config
    }

    fn ensure_open(&self) -> Result<()> {
        if self.released {
            return Err(BridgeError::NotAvailable(
                "simulated media engine has been released".to_string(),
            ));
        }
        Ok(())
    }

    fn schedule(&self, delay: Duration, event: EngineEvent) -> Option<JoinHandle<()>> {
        let Some(sink) = self.sink.clone() else {
            warn!(?event, "No event sink attached; callback dropped");
            return None;
        };

        Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            sink.deliver(event);
        }))
    }

    fn schedule_completion(&mut self) {
        if let Some(timer) = self.completion_timer.take() {
            timer.abort();
        }
        if let Some(token) = self.loaded {
            let remaining = self
                .config
                .track_duration
                .saturating_sub(self.clock.elapsed());
            self.completion_timer = self.schedule(remaining, EngineEvent::Completed { token });
        }
    }

    fn cancel_timers(&mut self) {
        for timer in [self.prepare_timer.take(), self.completion_timer.take()]
            .into_iter()
            .flatten()
        {
            timer.abort();
        }
    }

    fn unload(&mut self) {
        self.cancel_timers();
        self.loaded = None;
        self.clock = PlaybackClock::default();
    }
}

impl Default for SimulatedMediaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SimulatedMediaEngine {
    fn drop(&mut self) {
        self.cancel_timers();
    }
}

#[async_trait]
impl MediaEngine for SimulatedMediaEngine {
    fn attach(&mut self, sink: Arc<dyn EngineEventSink>) {
        self.sink = Some(sink);
    }

    async fn reset(&mut self) -> Result<()> {
        self.unload();
        Ok(())
    }

    async fn load_async(&mut self, locator: &ContentLocator, token: LoadToken) -> Result<()> {
        self.ensure_open()?;
        self.unload();
        self.loaded = Some(token);

        let event = if self.failing.contains(locator.as_str()) {
            let (what, extra) = UNSUPPORTED_SOURCE;
            EngineEvent::Error {
                token,
                code: EngineErrorCode::new(what, extra),
            }
        } else {
            EngineEvent::Prepared { token }
        };

        debug!(%locator, %token, "Simulating preparation");
        self.prepare_timer = self.schedule(self.config.prepare_delay, event);
        Ok(())
    }

    async fn start(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.loaded.is_none() {
            return Err(BridgeError::OperationFailed(
                "start requested with no source loaded".to_string(),
            ));
        }
        if self.clock.is_running() {
            return Ok(());
        }

        self.clock.run();
        self.schedule_completion();
        Ok(())
    }

    async fn pause(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.clock.is_running() {
            self.clock.stop();
            if let Some(timer) = self.completion_timer.take() {
                timer.abort();
            }
        }
        Ok(())
    }

    async fn seek_to(&mut self, position_ms: u64) -> Result<()> {
        self.ensure_open()?;
        if self.loaded.is_none() {
            return Err(BridgeError::OperationFailed(
                "seek requested with no source loaded".to_string(),
            ));
        }

        let target = Duration::from_millis(position_ms).min(self.config.track_duration);
        self.clock.jump_to(target);
        if self.clock.is_running() {
            self.schedule_completion();
        }
        Ok(())
    }

    async fn current_position(&self) -> u64 {
        if self.loaded.is_none() {
            return 0;
        }
        millis(self.clock.elapsed().min(self.config.track_duration))
    }

    async fn duration(&self) -> u64 {
        if self.loaded.is_none() {
            return 0;
        }
        millis(self.config.track_duration)
    }

    async fn is_active(&self) -> bool {
        self.loaded.is_some() && self.clock.is_running()
    }

    async fn release(&mut self) -> Result<()> {
        self.unload();
        self.sink = None;
        self.released = true;
        Ok(())
    }
}
