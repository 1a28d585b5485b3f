//! Playlist player.
//!
//! Re-exports the workspace crates so host applications can depend on one
//! package:
//!
//! - [`bridge`]: the `PlaybackEngine` contract hosts implement
//! - [`runtime`]: configuration, logging and the event bus
//! - [`playback`]: playlist, session state and the session controller
//! - [`service`]: the event-loop service hosts usually drive

pub use bridge_traits as bridge;
pub use core_playback as playback;
pub use core_runtime as runtime;
pub use core_service as service;

pub use bridge_traits::{PlaybackEngine, StatusUpdate};
pub use core_playback::{format_timestamp, Playlist, PlaylistEntry, SessionController, SessionSnapshot};
pub use core_runtime::config::PlayerConfig;
pub use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
pub use core_service::{Command, CoreError, PlayerHandle, PlayerService};
