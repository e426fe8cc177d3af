//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the music player core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the catalog and playback crates
//! depend on. It establishes the logging conventions, the validated host
//! configuration, and the event broadcasting mechanism used throughout the
//! workspace.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder, PlaybackSettings};
pub use error::{Error, Result};
pub use events::{CoreEvent, EventBus, EventStream, LibraryEvent, PlaybackEvent};
