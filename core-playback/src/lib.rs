//! # Playback Session Module
//!
//! Drives a host media engine through a single track catalog.
//!
//! ## Overview
//!
//! This module handles:
//! - The playback lifecycle state machine ([`PlaybackSession`])
//! - Next/previous/shuffle index walking ([`sequencer`])
//! - An actor that serialises commands and engine callbacks onto one task
//!   ([`SessionActor`], [`SessionHandle`])
//!
//! ## Usage
//!
//! ```ignore
//! use core_playback::{PlaybackSession, SessionActor};
//! use tokio_util::sync::CancellationToken;
//!
//! let session = PlaybackSession::from_config(Box::new(engine), &config, event_bus.clone());
//! let (handle, task) = SessionActor::spawn(session, config.command_buffer, CancellationToken::new());
//!
//! handle.bind_catalog(catalog).await?;
//! handle.select_track(0).await?;
//! ```

pub mod actor;
pub mod error;
pub mod sequencer;
pub mod session;
pub mod state;

pub use actor::{ChannelEventSink, SessionActor, SessionCommand, SessionHandle};
pub use error::{PlaybackError, Result};
pub use session::PlaybackSession;
pub use state::{FaultKind, PlaybackFault, ResourceState, SessionId, SessionSnapshot};
