//! # Core Configuration Module
//!
//! Provides configuration management for the music player core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds the host bridges and settings a playback session needs.
//! It enforces fail-fast validation so a misconfigured host finds out at
//! startup rather than on the first track selection.
//!
//! ## Required Dependencies
//!
//! - `NowPlayingNotifier` - Renders the persistent now-playing indicator
//!
//! ## Optional Dependencies (with defaults)
//!
//! - `LocatorResolver` - Maps track ids to content locators (default:
//!   `MediaStoreResolver` over `locator_base_uri`)
//!
//! When the `desktop-shims` feature is enabled, a tracing-backed notifier from
//! `bridge-desktop` is injected automatically if none is provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .now_playing_notifier(Arc::new(MyNotifier))
//!     .start_shuffled(true)
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! // Zero-capacity queues are rejected
//! let config = CoreConfig::builder()
//!     .command_buffer(0)
//!     .build()
//!     .expect("Should fail - invalid command buffer");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{
    LocatorResolver, MediaStoreResolver, NowPlayingNotifier, DEFAULT_NOW_PLAYING_HEADING,
    EXTERNAL_AUDIO_CONTENT_URI,
};
use std::sync::Arc;

/// Default capacity of the session command queue.
pub const DEFAULT_COMMAND_BUFFER: usize = 32;

/// Default capacity of the event bus.
pub const DEFAULT_EVENT_BUFFER: usize = crate::events::DEFAULT_EVENT_BUFFER_SIZE;

/// Core configuration for the music player.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Resolves track ids into locators the media engine can open
    pub locator_resolver: Arc<dyn LocatorResolver>,

    /// Host now-playing indicator (required)
    pub now_playing_notifier: Arc<dyn NowPlayingNotifier>,

    /// Playback behaviour
    pub playback: PlaybackSettings,

    /// Capacity of the session command queue
    pub command_buffer: usize,

    /// Capacity of the event bus
    pub event_buffer: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("locator_resolver", &"LocatorResolver { ... }")
            .field("now_playing_notifier", &"NowPlayingNotifier { ... }")
            .field("playback", &self.playback)
            .field("command_buffer", &self.command_buffer)
            .field("event_buffer", &self.event_buffer)
            .finish()
    }
}

/// Settings applied when a playback session is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSettings {
    /// Initial value of the shuffle flag
    pub start_shuffled: bool,

    /// Heading shown in the now-playing indicator while a track plays
    pub notification_title: String,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            start_shuffled: false,
            notification_title: DEFAULT_NOW_PLAYING_HEADING.to_string(),
        }
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Queue capacities are non-zero
    /// - The now-playing heading is not blank
    pub fn validate(&self) -> Result<()> {
        if self.command_buffer == 0 {
            return Err(Error::Config(
                "Command buffer must hold at least one command".to_string(),
            ));
        }

        if self.event_buffer == 0 {
            return Err(Error::Config(
                "Event buffer must hold at least one event".to_string(),
            ));
        }

        if self.playback.notification_title.trim().is_empty() {
            return Err(Error::Config(
                "Notification title cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn notifier_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "NowPlayingNotifier".to_string(),
        message: "NowPlayingNotifier implementation is required to show the now-playing indicator. \
                 Desktop: enable the 'desktop-shims' feature to use the default LogNotifier. \
                 Mobile: inject a notifier backed by the platform notification service."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_notifier() -> Result<Arc<dyn NowPlayingNotifier>> {
    use bridge_desktop::LogNotifier;

    let notifier: Arc<dyn NowPlayingNotifier> = Arc::new(LogNotifier::new());
    Ok(notifier)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_notifier() -> Result<Arc<dyn NowPlayingNotifier>> {
    Err(notifier_missing_error())
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    locator_resolver: Option<Arc<dyn LocatorResolver>>,
    locator_base_uri: Option<String>,
    now_playing_notifier: Option<Arc<dyn NowPlayingNotifier>>,
    playback: PlaybackSettings,
    command_buffer: Option<usize>,
    event_buffer: Option<usize>,
}

impl CoreConfigBuilder {
    /// Inject a custom locator resolver. Takes precedence over
    /// [`locator_base_uri`](Self::locator_base_uri).
    pub fn locator_resolver(mut self, resolver: Arc<dyn LocatorResolver>) -> Self {
        self.locator_resolver = Some(resolver);
        self
    }

    /// Base URI for the default `MediaStoreResolver`.
    pub fn locator_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.locator_base_uri = Some(base_uri.into());
        self
    }

    pub fn now_playing_notifier(mut self, notifier: Arc<dyn NowPlayingNotifier>) -> Self {
        self.now_playing_notifier = Some(notifier);
        self
    }

    pub fn start_shuffled(mut self, enabled: bool) -> Self {
        self.playback.start_shuffled = enabled;
        self
    }

    pub fn notification_title(mut self, title: impl Into<String>) -> Self {
        self.playback.notification_title = title.into();
        self
    }

    pub fn playback(mut self, settings: PlaybackSettings) -> Self {
        self.playback = settings;
        self
    }

    pub fn command_buffer(mut self, capacity: usize) -> Self {
        self.command_buffer = Some(capacity);
        self
    }

    pub fn event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = Some(capacity);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No notifier was provided and no default is available
    /// - The locator base URI is blank
    /// - Any value fails [`CoreConfig::validate`]
    pub fn build(self) -> Result<CoreConfig> {
        let locator_resolver = match self.locator_resolver {
            Some(resolver) => resolver,
            None => {
                let base_uri = self
                    .locator_base_uri
                    .unwrap_or_else(|| EXTERNAL_AUDIO_CONTENT_URI.to_string());
                if base_uri.trim().is_empty() {
                    return Err(Error::Config(
                        "Locator base URI cannot be empty. Use .locator_base_uri() or inject a LocatorResolver."
                            .to_string(),
                    ));
                }
                let resolver: Arc<dyn LocatorResolver> = Arc::new(MediaStoreResolver::new(base_uri));
                resolver
            }
        };

        let now_playing_notifier = match self.now_playing_notifier {
            Some(notifier) => notifier,
            None => provide_default_notifier()?,
        };

        let config = CoreConfig {
            locator_resolver,
            now_playing_notifier,
            playback: self.playback,
            command_buffer: self.command_buffer.unwrap_or(DEFAULT_COMMAND_BUFFER),
            event_buffer: self.event_buffer.unwrap_or(DEFAULT_EVENT_BUFFER),
        };

        config.validate()?;

        Ok(config)
    }
}
