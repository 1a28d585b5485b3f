//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the player crates:
//! - Logging and tracing setup, with forwarding to a host log sink
//! - Player configuration (session defaults, transport tuning, viewport)
//! - The broadcast event bus carrying session and playback events
//!
//! Nothing here knows about a specific engine; `core-playback` builds the
//! session controller on top of these pieces.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{PlayerConfig, PlayerConfigBuilder, SessionDefaults, TransportConfig, Viewport};
pub use error::{Error, Result};
pub use events::{CoreEvent, EventBus, EventSeverity, EventStream, PlaybackEvent, SessionEvent};
