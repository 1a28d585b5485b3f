//! # Host Bridge Traits
//!
//! Contract between the player core and the host platform.
//!
//! ## Traits
//!
//! - [`PlaybackEngine`](playback::PlaybackEngine) - creates, drives and releases
//!   the single live playback handle, and pushes status snapshots back
//! - [`LoggerSink`](log::LoggerSink) - forwards structured logs to the host
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Engines should map
//! platform failures onto it, using [`BridgeError::Rejected`] for commands the
//! platform cannot honour (the core treats those as soft failures where it can).
//!
//! ## Thread Safety
//!
//! Bridge traits require `Send + Sync` so a single engine can be shared between
//! the service task and the host UI.

pub mod error;
pub mod log;
pub mod playback;

pub use error::BridgeError;

pub use log::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use playback::{
    status_channel, AudioMode, EngineStatus, FullscreenUpdate, HandleId, InitialStatus,
    InterruptionMode, LoadedHandle, LoadedStatus, MediaSource, PlaybackEngine, StatusReceiver,
    StatusSender, StatusUpdate,
};
