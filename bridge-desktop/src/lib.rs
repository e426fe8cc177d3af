//! # Desktop Bridge Implementations
//!
//! Host-side stand-ins for the platform capabilities the playback core
//! drives, for desktop builds, demos and end-to-end tests.
//!
//! ## Overview
//!
//! - `SimulatedMediaEngine`: a `MediaEngine` that decodes nothing. It uses
//!   tokio timers to report preparation, completion and configured failures
//!   through the attached `EngineEventSink`.
//! - `LogNotifier`: a `NowPlayingNotifier` that writes the indicator to the
//!   tracing log instead of a system notification.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{LogNotifier, SimulatedMediaEngine};
//! use std::time::Duration;
//!
//! let engine = SimulatedMediaEngine::new()
//!     .with_prepare_delay(Duration::from_millis(20))
//!     .with_track_duration(Duration::from_secs(3));
//! let notifier = LogNotifier::new();
//! ```

mod engine;
mod notifier;

pub use engine::{SimulatedMediaEngine, SimulationConfig};
pub use notifier::LogNotifier;
