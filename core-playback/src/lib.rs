//! # Playback Session Module
//!
//! Drives one playlist-backed playback session against a host
//! [`PlaybackEngine`](bridge_traits::PlaybackEngine).
//!
//! ## Overview
//!
//! This module handles:
//! - The immutable playlist and its wrapping cursor
//! - Session state mirrored from engine status reports
//! - The [`SessionController`], sole owner of the engine handle
//! - Render helpers: `mm:ss` timestamps, video fitting, snapshots

pub mod controller;
pub mod error;
pub mod playlist;
pub mod snapshot;
pub mod state;
pub mod timestamp;

pub use controller::SessionController;
pub use error::{PlaybackError, Result};
pub use playlist::{Playlist, PlaylistCursor, PlaylistEntry};
pub use snapshot::{SessionSnapshot, BUFFERING_LABEL, LOADING_LABEL};
pub use state::{
    LoadPhase, LoopMode, NaturalSize, PlaybackSessionState, SeekGesture, Transport, VideoDisplaySize,
};
pub use timestamp::format_timestamp;
