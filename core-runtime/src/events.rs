//! # Event Bus System
//!
//! Broadcasts player events to any number of observers using
//! `tokio::sync::broadcast`. The session controller publishes; presentation
//! layers, loggers and tests subscribe.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────┐   emit   ┌───────────┐  subscribe  ┌──────────────┐
//! │ SessionController  ├─────────>│ EventBus  ├────────────>│ UI observer  │
//! └────────────────────┘          │ (broadcast│             └──────────────┘
//!                                 │  channel) ├────────────>┌──────────────┐
//!                                 └───────────┘             │ Diagnostics  │
//!                                                           └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, SessionEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(100);
//! let mut stream = bus.subscribe();
//!
//! bus.emit(CoreEvent::Session(SessionEvent::TrackLoading {
//!     index: 0,
//!     name: "Big Buck Bunny".to_string(),
//! }))
//! .ok();
//!
//! let event = stream.recv().await.unwrap();
//! assert_eq!(event.description(), "Loading track");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber fell behind by `n` events. Status
//!   ticks are frequent, so slow observers should expect this and carry on.
//! - **`RecvError::Closed`**: every sender is gone; the player shut down.
//!
//! Emitting with no subscribers returns an error; publishers in this workspace
//! ignore it.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Playlist cursor and handle lifecycle
    Session(SessionEvent),
    /// Transport state of the loaded item
    Playback(PlaybackEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Session(e) => e.description(),
            CoreEvent::Playback(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Session(SessionEvent::TrackLoadFailed { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::Error {
                recoverable: true, ..
            }) => EventSeverity::Warning,
            CoreEvent::Playback(PlaybackEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Session(SessionEvent::TrackLoaded { .. }) => EventSeverity::Info,
            CoreEvent::Playback(PlaybackEvent::Completed { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

impl From<SessionEvent> for CoreEvent {
    fn from(event: SessionEvent) -> Self {
        CoreEvent::Session(event)
    }
}

impl From<PlaybackEvent> for CoreEvent {
    fn from(event: PlaybackEvent) -> Self {
        CoreEvent::Playback(event)
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Session Events
// ============================================================================

/// Events about which playlist entry is loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SessionEvent {
    /// A new handle is being requested for the entry at `index`.
    TrackLoading { index: usize, name: String },
    /// The engine reported the entry as loaded.
    TrackLoaded {
        index: usize,
        name: String,
        is_video: bool,
        duration_ms: Option<u64>,
    },
    /// The engine could not load the entry. The session stays in its loading
    /// state; nothing retries automatically.
    TrackLoadFailed {
        index: usize,
        uri: String,
        message: String,
    },
    /// The playlist cursor moved.
    Advanced {
        from: usize,
        to: usize,
        forward: bool,
    },
    /// The handle for the entry at `index` was released.
    Released { index: usize },
}

impl SessionEvent {
    fn description(&self) -> &str {
        match self {
            SessionEvent::TrackLoading { .. } => "Loading track",
            SessionEvent::TrackLoaded { .. } => "Track loaded",
            SessionEvent::TrackLoadFailed { .. } => "Track failed to load",
            SessionEvent::Advanced { .. } => "Playlist cursor moved",
            SessionEvent::Released { .. } => "Playback handle released",
        }
    }
}

// ============================================================================
// Playback Events
// ============================================================================

/// Events mirroring the engine's status reports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// A status snapshot was applied to the session.
    StatusChanged {
        index: usize,
        position_ms: u64,
        duration_ms: Option<u64>,
        is_playing: bool,
        is_buffering: bool,
    },
    /// The entry reached its natural end without looping.
    Completed { index: usize },
    /// The engine or a transport command failed.
    Error {
        index: Option<usize>,
        message: String,
        recoverable: bool,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::StatusChanged { .. } => "Playback status changed",
            PlaybackEvent::Completed { .. } => "Track completed",
            PlaybackEvent::Error { .. } => "Playback error",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to player events.
///
/// Cloning the bus yields another publisher on the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified per-subscriber buffer.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if there are none.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. It only sees events emitted after this call.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
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
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// Subscriber wrapper that skips events not matching a predicate.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let bus = EventBus::new(100);
/// let session_only = EventStream::new(bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Session(_)));
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

    /// Only events matching `predicate` will be returned.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive a matching event without waiting.
    ///
    /// Returns `None` if no matching event is currently buffered.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.accepts(&event) => return Some(Ok(event)),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
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

    fn loading(index: usize) -> CoreEvent {
        CoreEvent::Session(SessionEvent::TrackLoading {
            index,
            name: format!("track-{index}"),
        })
    }

    #[tokio::test]
    async fn test_event_bus_subscription() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        assert!(bus.emit(loading(0)).is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = CoreEvent::Session(SessionEvent::Advanced {
            from: 8,
            to: 0,
            forward: true,
        });
        assert_eq!(bus.emit(event.clone()).unwrap(), 2);

        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| matches!(event, CoreEvent::Playback(_)));

        bus.emit(loading(1)).ok();
        let completed = CoreEvent::Playback(PlaybackEvent::Completed { index: 1 });
        bus.emit(completed.clone()).ok();

        assert_eq!(stream.recv().await.unwrap(), completed);
    }

    #[tokio::test]
    async fn test_try_recv_skips_filtered_events() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| matches!(event, CoreEvent::Playback(_)));

        bus.emit(loading(0)).ok();
        assert!(stream.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for position in 0..5u64 {
            bus.emit(CoreEvent::Playback(PlaybackEvent::StatusChanged {
                index: 0,
                position_ms: position * 500,
                duration_ms: Some(10_000),
                is_playing: true,
                is_buffering: false,
            }))
            .ok();
        }

        assert!(matches!(sub.recv().await, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_event_severity() {
        let failed = CoreEvent::Session(SessionEvent::TrackLoadFailed {
            index: 2,
            uri: "https://example.com/a.mp3".to_string(),
            message: "404".to_string(),
        });
        assert_eq!(failed.severity(), EventSeverity::Error);

        let soft = CoreEvent::Playback(PlaybackEvent::Error {
            index: Some(2),
            message: "pause failed".to_string(),
            recoverable: true,
        });
        assert_eq!(soft.severity(), EventSeverity::Warning);

        let completed = CoreEvent::Playback(PlaybackEvent::Completed { index: 2 });
        assert_eq!(completed.severity(), EventSeverity::Info);

        assert_eq!(loading(2).severity(), EventSeverity::Debug);
    }

    #[test]
    fn test_event_serialization() {
        let event = CoreEvent::Session(SessionEvent::TrackLoaded {
            index: 5,
            name: "Big Buck Bunny".to_string(),
            is_video: true,
            duration_ms: Some(596_000),
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"Session\""));
        assert!(json.contains("\"event\":\"TrackLoaded\""));

        let back: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
