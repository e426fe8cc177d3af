//! # Host Bridge Traits
//!
//! Capabilities the playback core needs but cannot provide itself.
//!
//! ## Overview
//!
//! Each trait is a contract between the core and a host platform. The core
//! owns playback *logic*; the host owns the platform pieces:
//!
//! - [`MediaEngine`](media::MediaEngine) - decoding/output resource (the
//!   platform media player)
//! - [`LocatorResolver`](media::LocatorResolver) - maps a track id to a
//!   [`ContentLocator`](media::ContentLocator)
//! - [`NowPlayingNotifier`](notification::NowPlayingNotifier) - persistent
//!   now-playing indicator
//! - [`LoggerSink`](logging::LoggerSink) - forwards structured logs to the
//!   host's logging pipeline
//!
//! ## Threading
//!
//! All traits are `Send + Sync` so implementations can be shared across tokio
//! tasks. Engine callbacks are delivered as messages through
//! [`EngineEventSink`](media::EngineEventSink) rather than by calling back into
//! the core from engine threads.
//!
//! ## Error Handling
//!
//! Every bridge reports failures as [`BridgeError`](error::BridgeError).
//! Implementations should convert platform errors and keep messages
//! actionable.

pub mod error;
pub mod logging;
pub mod media;
pub mod notification;

pub use error::BridgeError;

pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use media::{
    ContentLocator, EngineErrorCode, EngineEvent, EngineEventSink, LoadToken, LocatorResolver,
    MediaEngine, MediaStoreResolver, EXTERNAL_AUDIO_CONTENT_URI,
};
pub use notification::{NowPlaying, NowPlayingNotifier, DEFAULT_NOW_PLAYING_HEADING};
