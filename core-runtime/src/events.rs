//! # Event Bus System
//!
//! Provides an event-driven architecture for the music player core using `tokio::sync::broadcast`.
//! The playback session and the catalog loader publish typed events here; hosts subscribe to
//! render UI state or persistent indicators without polling.
//!
//! ## Overview
//!
//! The event bus system consists of:
//! - **Event Types**: Strongly-typed enum hierarchies for the library and playback domains
//! - **EventBus**: Central broadcast channel for publishing events
//! - **EventStream**: Wrapper for consuming events with filtering
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   emit    ┌───────────┐
//! │ Catalog loader   ├──────────>│           │   subscribe   ┌────────────┐
//! └──────────────────┘           │ EventBus  ├──────────────>│ Host / UI  │
//! ┌──────────────────┐   emit    │ (broadcast│               └────────────┘
//! │ Playback session ├──────────>│  channel) │
//! └──────────────────┘           └───────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(64);
//! let mut subscriber = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Playback(PlaybackEvent::ShuffleChanged {
//!         session_id: "session-1".to_string(),
//!         enabled: true,
//!     }))
//!     .ok();
//!
//! let event = subscriber.recv().await.unwrap();
//! assert_eq!(event.description(), "Shuffle toggled");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: Subscriber was too slow and missed `n` events.
//!   This is non-fatal; the subscriber can continue receiving new events.
//! - **`RecvError::Closed`**: All senders have been dropped. This indicates shutdown.
//!
//! Emitting with no subscribers returns `Err(SendError)`; publishers in this workspace
//! ignore that case since nobody listening is a normal state.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 64;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Catalog-related events
    Library(LibraryEvent),
    /// Playback session events
    Playback(PlaybackEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Library(e) => e.description(),
            CoreEvent::Playback(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Library(LibraryEvent::LoadFailed { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::SourceUnresolved { .. }) => EventSeverity::Warning,
            CoreEvent::Library(LibraryEvent::CatalogLoaded { .. }) => EventSeverity::Info,
            CoreEvent::Playback(PlaybackEvent::Started { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Library Events
// ============================================================================

/// Events related to the track catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum LibraryEvent {
    /// Catalog fetched from the source and sorted.
    CatalogLoaded {
        /// Number of tracks in the catalog.
        track_count: usize,
    },
    /// Catalog source could not be read.
    LoadFailed {
        /// Human-readable error message.
        message: String,
    },
    /// A catalog was handed to a playback session.
    CatalogBound {
        /// Session receiving the catalog.
        session_id: String,
        /// Number of tracks in the catalog.
        track_count: usize,
    },
}

impl LibraryEvent {
    fn description(&self) -> &str {
        match self {
            LibraryEvent::CatalogLoaded { .. } => "Catalog loaded",
            LibraryEvent::LoadFailed { .. } => "Catalog load failed",
            LibraryEvent::CatalogBound { .. } => "Catalog bound to session",
        }
    }
}

// ============================================================================
// Playback Events
// ============================================================================

/// Events related to the playback session lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// A track began loading.
    Preparing {
        session_id: String,
        /// Catalog index of the track.
        position: usize,
        track_id: i64,
        title: String,
    },
    /// Preparation finished and output started.
    Started {
        session_id: String,
        track_id: i64,
        title: String,
    },
    /// Playback paused.
    Paused {
        session_id: String,
        /// Position when paused (milliseconds).
        position_ms: u64,
    },
    /// Playback resumed after pause.
    Resumed {
        session_id: String,
        /// Position when resumed (milliseconds).
        position_ms: u64,
    },
    /// Seek delegated to the engine.
    Seeked {
        session_id: String,
        /// Requested position (milliseconds).
        position_ms: u64,
    },
    /// Track finished playing naturally.
    Completed {
        session_id: String,
        track_id: i64,
    },
    /// The engine reported a decode or playback error.
    Error {
        session_id: String,
        /// The track ID if available.
        track_id: Option<i64>,
        /// Human-readable error message.
        message: String,
    },
    /// No locator could be produced for the selected track.
    SourceUnresolved {
        session_id: String,
        track_id: i64,
        reason: String,
    },
    /// Shuffle flag flipped.
    ShuffleChanged {
        session_id: String,
        enabled: bool,
    },
    /// Session torn down and engine released.
    Released {
        session_id: String,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::Preparing { .. } => "Track preparing",
            PlaybackEvent::Started { .. } => "Playback started",
            PlaybackEvent::Paused { .. } => "Playback paused",
            PlaybackEvent::Resumed { .. } => "Playback resumed",
            PlaybackEvent::Seeked { .. } => "Playback position changed",
            PlaybackEvent::Completed { .. } => "Track completed",
            PlaybackEvent::Error { .. } => "Playback error",
            PlaybackEvent::SourceUnresolved { .. } => "Track source unresolved",
            PlaybackEvent::ShuffleChanged { .. } => "Shuffle toggled",
            PlaybackEvent::Released { .. } => "Session released",
        }
    }

    /// Session that emitted the event.
    pub fn session_id(&self) -> &str {
        match self {
            PlaybackEvent::Preparing { session_id, .. }
            | PlaybackEvent::Started { session_id, .. }
            | PlaybackEvent::Paused { session_id, .. }
            | PlaybackEvent::Resumed { session_id, .. }
            | PlaybackEvent::Seeked { session_id, .. }
            | PlaybackEvent::Completed { session_id, .. }
            | PlaybackEvent::Error { session_id, .. }
            | PlaybackEvent::SourceUnresolved { session_id, .. }
            | PlaybackEvent::ShuffleChanged { session_id, .. }
            | PlaybackEvent::Released { session_id } => session_id,
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; `CoreConfig` rejects that value before it gets here.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if there are no active subscribers.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Subscribe and wrap the receiver in an [`EventStream`].
    pub fn stream(&self) -> EventStream {
        EventStream::new(self.subscribe())
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus};
///
/// let event_bus = EventBus::new(16);
/// let playback_only = event_bus
///     .stream()
///     .filter(|event| matches!(event, CoreEvent::Playback(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` will be returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no matching events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn shuffle_event(enabled: bool) -> CoreEvent {
        CoreEvent::Playback(PlaybackEvent::ShuffleChanged {
            session_id: "session-1".to_string(),
            enabled,
        })
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        assert!(bus.emit(shuffle_event(true)).is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        let event = shuffle_event(true);
        assert_eq!(bus.emit(event.clone()).unwrap(), 2);

        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut stream = bus
            .stream()
            .filter(|event| matches!(event, CoreEvent::Library(_)));

        bus.emit(shuffle_event(true)).ok();
        let library_event = CoreEvent::Library(LibraryEvent::CatalogLoaded { track_count: 3 });
        bus.emit(library_event.clone()).ok();

        assert_eq!(stream.recv().await.unwrap(), library_event);
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for i in 0..5 {
            bus.emit(shuffle_event(i % 2 == 0)).ok();
        }

        assert!(matches!(sub.recv().await, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_event_severity() {
        let error = CoreEvent::Playback(PlaybackEvent::Error {
            session_id: "s".to_string(),
            track_id: Some(4),
            message: "what=1 extra=-1004".to_string(),
        });
        assert_eq!(error.severity(), EventSeverity::Error);

        let unresolved = CoreEvent::Playback(PlaybackEvent::SourceUnresolved {
            session_id: "s".to_string(),
            track_id: -1,
            reason: "invalid id".to_string(),
        });
        assert_eq!(unresolved.severity(), EventSeverity::Warning);

        let loaded = CoreEvent::Library(LibraryEvent::CatalogLoaded { track_count: 10 });
        assert_eq!(loaded.severity(), EventSeverity::Info);

        assert_eq!(shuffle_event(false).severity(), EventSeverity::Debug);
    }

    #[test]
    fn test_session_id_accessor() {
        let event = PlaybackEvent::Released {
            session_id: "abc".to_string(),
        };
        assert_eq!(event.session_id(), "abc");
        assert_eq!(event.description(), "Session released");
    }

    #[test]
    fn test_event_serialization() {
        let event = CoreEvent::Playback(PlaybackEvent::Started {
            session_id: "session-9".to_string(),
            track_id: 12,
            title: "Blue in Green".to_string(),
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"Playback\""));
        assert!(json.contains("\"event\":\"Started\""));

        let deserialized: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }

    #[tokio::test]
    async fn test_try_recv() {
        let bus = EventBus::new(10);
        let mut stream = bus.stream();
        assert!(stream.try_recv().is_none());

        let event = shuffle_event(true);
        bus.emit(event.clone()).ok();
        assert_eq!(stream.try_recv().unwrap().unwrap(), event);
    }
}
