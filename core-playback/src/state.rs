//! Session state types
//!
//! Plain data describing where a playback session is in its lifecycle. Only
//! [`PlaybackSession`](crate::session::PlaybackSession) mutates these.

use crate::error::PlaybackError;
use bridge_traits::EngineErrorCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// Session identity
// =============================================================================

/// Identifier attached to every event a session emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Resource state
// =============================================================================

/// Lifecycle stage of the decoding/output resource.
///
/// ```text
/// Idle ──select──> Preparing ──prepared──> Ready ──start──> Playing <──> Paused
///                      │                                      │           │
///                      └───────────── error ──> Error ──> Idle <──────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResourceState {
    #[default]
    Idle,
    Preparing,
    Ready,
    Playing,
    Paused,
    /// Transient; the session resets the engine and moves to `Idle` immediately.
    Error,
}

impl ResourceState {
    /// Seeking is only meaningful once the engine has prepared the source.
    pub fn can_seek(&self) -> bool {
        matches!(
            self,
            ResourceState::Ready | ResourceState::Playing | ResourceState::Paused
        )
    }

    /// States in which an engine error callback is honoured.
    pub fn accepts_engine_error(&self) -> bool {
        matches!(
            self,
            ResourceState::Preparing
                | ResourceState::Ready
                | ResourceState::Playing
                | ResourceState::Paused
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceState::Idle => "idle",
            ResourceState::Preparing => "preparing",
            ResourceState::Ready => "ready",
            ResourceState::Playing => "playing",
            ResourceState::Paused => "paused",
            ResourceState::Error => "error",
        }
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Faults
// =============================================================================

/// Category of the last failure the session degraded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum FaultKind {
    /// No locator could be produced for the selected track.
    SourceResolution,
    /// The engine reported an error while preparing or playing.
    DecodeOrPlayback { code: EngineErrorCode },
}

/// Host-visible record of the most recent failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackFault {
    #[serde(flatten)]
    pub kind: FaultKind,
    /// Catalog index the session was on when the failure happened.
    pub position: usize,
    pub track_id: Option<i64>,
    pub message: String,
}

impl PlaybackFault {
    /// The error a caller would have seen had the failure not been absorbed.
    pub fn to_error(&self) -> PlaybackError {
        match self.kind {
            FaultKind::SourceResolution => PlaybackError::SourceResolution {
                track_id: self.track_id.unwrap_or_default(),
                reason: self.message.clone(),
            },
            FaultKind::DecodeOrPlayback { code } => PlaybackError::DecodeOrPlayback { code },
        }
    }
}

impl fmt::Display for PlaybackFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.track_id {
            Some(track_id) => write!(f, "track {} at {}: {}", track_id, self.position, self.message),
            None => write!(f, "position {}: {}", self.position, self.message),
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Point-in-time view of a session, for hosts that want everything at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub position: usize,
    pub shuffle_enabled: bool,
    pub state: ResourceState,
    pub current_title: String,
    pub track_id: Option<i64>,
    pub catalog_len: usize,
    pub last_fault: Option<PlaybackFault>,
}
