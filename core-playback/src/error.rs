//! # Playback Error Types
//!
//! Errors returned by the playback session and its command handle.

use bridge_traits::error::BridgeError;
use bridge_traits::EngineErrorCode;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Caller Errors
    // ========================================================================
    /// Index outside the bound catalog. Precondition violation, not recovered.
    #[error("Track index {index} out of range for catalog of {len} tracks")]
    InvalidIndex { index: usize, len: usize },

    /// Navigation requested with no tracks bound.
    #[error("No tracks in catalog")]
    EmptyCatalog,

    // ========================================================================
    // Source / Engine Errors
    // ========================================================================
    /// No content locator could be produced for the track.
    #[error("Could not resolve source for track {track_id}: {reason}")]
    SourceResolution { track_id: i64, reason: String },

    /// The media engine rejected a control call.
    #[error("Media engine error: {0}")]
    Engine(#[from] BridgeError),

    /// The engine reported a decode or playback failure.
    #[error("Decode or playback error ({code})")]
    DecodeOrPlayback { code: EngineErrorCode },

    // ========================================================================
    // Session Lifecycle
    // ========================================================================
    /// The session actor has stopped; commands can no longer be delivered.
    #[error("Playback session closed")]
    SessionClosed,
}

impl PlaybackError {
    /// Returns `true` if the session stays usable after this error.
    ///
    /// Everything except a closed session degrades to "nothing is playing";
    /// the host may simply issue another command.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, PlaybackError::SessionClosed)
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
