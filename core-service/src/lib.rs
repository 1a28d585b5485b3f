//! Player service façade.
//!
//! Wires a host-provided [`PlaybackEngine`](bridge_traits::PlaybackEngine)
//! into a session controller running on its own tokio task. Hosts build a
//! [`PlayerService`], start it, and talk to it through the returned
//! [`PlayerHandle`]:
//!
//! ```ignore
//! use core_service::{Command, PlayerService};
//! use core_runtime::config::PlayerConfig;
//!
//! let player = PlayerService::builder()
//!     .config(PlayerConfig::default())
//!     .engine(engine)
//!     .build()?
//!     .start()?;
//!
//! player.send(Command::TogglePlayPause)?;
//! println!("{}", player.snapshot().timestamp);
//! player.shutdown().await?;
//! ```

pub mod command;
pub mod error;
pub mod service;

pub use command::Command;
pub use error::{CoreError, Result};
pub use service::{PlayerHandle, PlayerService, PlayerServiceBuilder};
