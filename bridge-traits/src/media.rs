//! Media engine bridge traits and supporting types.
//!
//! The playback core never decodes audio itself. It drives a host-provided
//! [`MediaEngine`] (the platform's decoding/output resource) through a small
//! command surface and receives the engine's asynchronous callbacks as
//! [`EngineEvent`] messages delivered to an [`EngineEventSink`].
//!
//! Every load is tagged with a [`LoadToken`]. Engines must echo the token of
//! the load that produced a callback so the core can discard callbacks that
//! belong to a load it has already reset.

use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Base URI of the platform's external audio collection.
pub const EXTERNAL_AUDIO_CONTENT_URI: &str = "content://media/external/audio/media";

/// Generation number identifying a single `load_async` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct LoadToken(u64);

impl LoadToken {
    /// Construct a token from a raw generation number.
    pub fn new(generation: u64) -> Self {
        Self(generation)
    }

    /// The token issued after this one.
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for LoadToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "load#{}", self.0)
    }
}

/// Opaque reference the engine uses to find a track's underlying bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentLocator(String);

impl ContentLocator {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Engine-specific error description, as reported by the decoding resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineErrorCode {
    /// Primary error category.
    pub what: i32,
    /// Implementation-specific detail code.
    pub extra: i32,
}

impl EngineErrorCode {
    pub fn new(what: i32, extra: i32) -> Self {
        Self { what, extra }
    }
}

impl fmt::Display for EngineErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "what={} extra={}", self.what, self.extra)
    }
}

/// Asynchronous callbacks emitted by a [`MediaEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// The load identified by `token` finished preparing and can start.
    Prepared { token: LoadToken },
    /// The engine failed while preparing or playing.
    Error {
        token: LoadToken,
        code: EngineErrorCode,
    },
    /// Output reached the end of the stream.
    Completed { token: LoadToken },
}

impl EngineEvent {
    /// Token of the load this callback belongs to.
    pub fn token(&self) -> LoadToken {
        match self {
            EngineEvent::Prepared { token }
            | EngineEvent::Error { token, .. }
            | EngineEvent::Completed { token } => *token,
        }
    }
}

/// Receiver for engine callbacks.
///
/// Implementations must not block; the playback core backs this with an
/// unbounded channel into its control loop.
pub trait EngineEventSink: Send + Sync {
    fn deliver(&self, event: EngineEvent);
}

/// Platform decoding/output resource.
///
/// The engine is exclusively owned by one playback session. All methods are
/// invoked from the session's control task; preparation and playback happen
/// on engine-internal threads and report back through the attached sink.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Attach the sink that receives [`EngineEvent`]s. Called once, before any load.
    fn attach(&mut self, sink: Arc<dyn EngineEventSink>);

    /// Drop any loaded source and return to the idle state.
    async fn reset(&mut self) -> Result<()>;

    /// Begin preparing `locator` in the background. Completion is reported
    /// as `Prepared` or `Error` carrying `token`.
    async fn load_async(&mut self, locator: &ContentLocator, token: LoadToken) -> Result<()>;

    /// Start or resume output.
    async fn start(&mut self) -> Result<()>;

    /// Pause output, keeping the prepared source.
    async fn pause(&mut self) -> Result<()>;

    /// Seek to an absolute offset. Engines clamp out-of-range values.
    async fn seek_to(&mut self, position_ms: u64) -> Result<()>;

    /// Elapsed playback position in milliseconds.
    async fn current_position(&self) -> u64;

    /// Duration of the prepared source in milliseconds.
    async fn duration(&self) -> u64;

    /// Whether output is currently running.
    async fn is_active(&self) -> bool;

    /// Release native resources. The engine is unusable afterwards.
    async fn release(&mut self) -> Result<()>;
}

/// Produces a [`ContentLocator`] for a track id.
pub trait LocatorResolver: Send + Sync {
    fn resolve(&self, track_id: i64) -> Result<ContentLocator>;
}

/// Resolver that appends the track id to a media-store collection URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaStoreResolver {
    base_uri: String,
}

impl MediaStoreResolver {
    pub fn new(base_uri: impl Into<String>) -> Self {
        let base_uri = base_uri.into();
        Self {
            base_uri: base_uri.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }
}

impl Default for MediaStoreResolver {
    fn default() -> Self {
        Self::new(EXTERNAL_AUDIO_CONTENT_URI)
    }
}

impl LocatorResolver for MediaStoreResolver {
    fn resolve(&self, track_id: i64) -> Result<ContentLocator> {
        if track_id <= 0 {
            return Err(BridgeError::InvalidLocator {
                track_id,
                reason: "media store ids are positive".to_string(),
            });
        }

        Ok(ContentLocator::new(format!("{}/{}", self.base_uri, track_id)))
    }
}
