//! Playback engine bridge and the status types it reports.
//!
//! The host provides a [`PlaybackEngine`] that knows how to turn a media URI into
//! a live playback handle (native audio player, video surface, web media element,
//! ...). The core never touches the media itself: it issues transport commands
//! against the handle and consumes the status snapshots the engine pushes back
//! through a [`StatusSender`].

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Identifier of one loaded media item inside the engine.
///
/// A fresh identifier is minted for every `create`, so status updates can be
/// matched against the handle the core currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandleId(Uuid);

impl HandleId {
    /// Generate a new handle identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construct an identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for HandleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for HandleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Media item handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSource {
    /// Remote or local URI of the media.
    pub uri: String,
    /// Whether the item has a video track and needs the video surface.
    pub is_video: bool,
}

impl MediaSource {
    pub fn new(uri: impl Into<String>, is_video: bool) -> Self {
        Self {
            uri: uri.into(),
            is_video,
        }
    }
}

/// Parameters applied by the engine while creating a handle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialStatus {
    /// Start playing as soon as the media is loaded.
    pub should_play: bool,
    /// Playback rate (1.0 = normal speed).
    pub rate: f32,
    /// Preserve pitch when the rate differs from 1.0.
    pub should_correct_pitch: bool,
    /// Volume in `0.0..=1.0`.
    pub volume: f32,
    pub is_muted: bool,
    /// Loop this single item forever.
    pub is_looping: bool,
}

impl Default for InitialStatus {
    fn default() -> Self {
        Self {
            should_play: false,
            rate: 1.0,
            should_correct_pitch: true,
            volume: 1.0,
            is_muted: false,
            is_looping: false,
        }
    }
}

/// Full status snapshot of a loaded handle.
///
/// Every report is complete; consumers must never treat it as a delta.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadedStatus {
    pub position_millis: u64,
    /// Unknown for live streams or before the container has been probed.
    pub duration_millis: Option<u64>,
    pub is_playing: bool,
    pub is_buffering: bool,
    /// Whether the engine intends to play (true while buffering towards play).
    pub should_play: bool,
    pub rate: f32,
    pub should_correct_pitch: bool,
    pub volume: f32,
    pub is_muted: bool,
    pub is_looping: bool,
    /// Set on the single report emitted when playback reaches the natural end.
    pub did_just_finish: bool,
}

impl LoadedStatus {
    /// Status of a freshly loaded item honouring the requested initial parameters.
    pub fn from_initial(initial: &InitialStatus, duration_millis: Option<u64>) -> Self {
        Self {
            position_millis: 0,
            duration_millis,
            is_playing: initial.should_play,
            is_buffering: false,
            should_play: initial.should_play,
            rate: initial.rate,
            should_correct_pitch: initial.should_correct_pitch,
            volume: initial.volume,
            is_muted: initial.is_muted,
            is_looping: initial.is_looping,
            did_just_finish: false,
        }
    }
}

/// Status pushed by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineStatus {
    /// The handle is not (or no longer) loaded, optionally because of an error.
    Unloaded { error: Option<String> },
    Loaded(LoadedStatus),
}

impl EngineStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, EngineStatus::Loaded(_))
    }
}

/// Status notification tagged with the handle it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub handle: HandleId,
    pub status: EngineStatus,
}

impl StatusUpdate {
    pub fn new(handle: HandleId, status: EngineStatus) -> Self {
        Self { handle, status }
    }
}

/// One-directional channel the engine uses to push status notifications.
pub type StatusSender = mpsc::UnboundedSender<StatusUpdate>;

/// Receiving side of [`StatusSender`], owned by the core event loop.
pub type StatusReceiver = mpsc::UnboundedReceiver<StatusUpdate>;

/// Create a status channel pair.
pub fn status_channel() -> (StatusSender, StatusReceiver) {
    mpsc::unbounded_channel()
}

/// Result of a successful `create`: the new handle and its first status report.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedHandle {
    pub id: HandleId,
    pub status: LoadedStatus,
}

/// Interruption policy requested from the platform audio session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptionMode {
    #[default]
    DoNotMix,
    DuckOthers,
    MixWithOthers,
}

/// Platform audio-session flags, passed through to the engine untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioMode {
    pub allows_recording: bool,
    pub stays_active_in_background: bool,
    pub interruption_mode: InterruptionMode,
    pub plays_in_silent_mode: bool,
    pub should_duck_others: bool,
    pub play_through_earpiece: bool,
}

impl Default for AudioMode {
    fn default() -> Self {
        Self {
            allows_recording: false,
            stays_active_in_background: true,
            interruption_mode: InterruptionMode::DoNotMix,
            plays_in_silent_mode: true,
            should_duck_others: true,
            play_through_earpiece: false,
        }
    }
}

/// Fullscreen presentation lifecycle reported by the video surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FullscreenUpdate {
    WillPresent,
    DidPresent,
    WillDismiss,
    DidDismiss,
}

/// Trait for host playback engines.
///
/// Only one handle is ever live per controller; implementations may rely on
/// `release` being awaited before the next `create`.
#[async_trait::async_trait]
pub trait PlaybackEngine: Send + Sync {
    /// Load `source` and return a new handle with its first status report.
    /// Subsequent notifications for the handle are pushed to `status_tx` until
    /// the handle is released.
    async fn create(
        &self,
        source: MediaSource,
        initial: InitialStatus,
        status_tx: StatusSender,
    ) -> Result<LoadedHandle>;

    /// Release a handle. Must be idempotent.
    async fn release(&self, handle: HandleId) -> Result<()>;

    async fn play(&self, handle: HandleId) -> Result<()>;

    async fn pause(&self, handle: HandleId) -> Result<()>;

    /// Stop playback and rewind to the start.
    async fn stop(&self, handle: HandleId) -> Result<()>;

    /// Move the playhead without changing play/pause state. Positions outside
    /// the media are the engine's to clamp or reject.
    async fn set_position(&self, handle: HandleId, position_millis: i64) -> Result<()>;

    /// Move the playhead and start playing.
    async fn play_from_position(&self, handle: HandleId, position_millis: i64) -> Result<()>;

    async fn set_volume(&self, handle: HandleId, volume: f32) -> Result<()>;

    async fn set_muted(&self, handle: HandleId, muted: bool) -> Result<()>;

    async fn set_looping(&self, handle: HandleId, looping: bool) -> Result<()>;

    /// Change rate and pitch correction. Engines that cannot vary the rate
    /// return [`BridgeError::Rejected`].
    async fn set_rate(&self, handle: HandleId, rate: f32, correct_pitch: bool) -> Result<()>;

    /// Present the native fullscreen video player.
    async fn present_fullscreen(&self, _handle: HandleId) -> Result<()> {
        Err(BridgeError::NotAvailable(
            "fullscreen presentation is not supported by this engine".to_string(),
        ))
    }

    /// Configure the platform audio session.
    async fn set_audio_mode(&self, _mode: AudioMode) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_ids_are_unique() {
        let a = HandleId::new();
        let b = HandleId::new();
        assert_ne!(a, b);
        assert_eq!(a, HandleId::from_uuid(*a.as_uuid()));
    }

    #[test]
    fn initial_status_defaults() {
        let initial = InitialStatus::default();
        assert!(!initial.should_play);
        assert_eq!(initial.rate, 1.0);
        assert!(initial.should_correct_pitch);
        assert_eq!(initial.volume, 1.0);
        assert!(!initial.is_muted);
        assert!(!initial.is_looping);
    }

    #[test]
    fn loaded_status_mirrors_initial_parameters() {
        let initial = InitialStatus {
            should_play: true,
            rate: 1.5,
            should_correct_pitch: false,
            volume: 0.4,
            is_muted: true,
            is_looping: true,
        };
        let status = LoadedStatus::from_initial(&initial, Some(90_000));

        assert_eq!(status.position_millis, 0);
        assert_eq!(status.duration_millis, Some(90_000));
        assert!(status.is_playing);
        assert_eq!(status.rate, 1.5);
        assert!(!status.should_correct_pitch);
        assert!(status.is_muted);
        assert!(status.is_looping);
        assert!(!status.did_just_finish);
    }

    #[test]
    fn audio_mode_defaults_to_exclusive_background_session() {
        let mode = AudioMode::default();
        assert!(mode.stays_active_in_background);
        assert!(mode.plays_in_silent_mode);
        assert_eq!(mode.interruption_mode, InterruptionMode::DoNotMix);
        assert!(!mode.play_through_earpiece);
    }

    #[test]
    fn audio_mode_serializes_interruption_as_snake_case() {
        let json = serde_json::to_string(&AudioMode::default()).unwrap();
        assert!(json.contains("\"do_not_mix\""));
    }

    struct NoFullscreenEngine;

    #[async_trait::async_trait]
    impl PlaybackEngine for NoFullscreenEngine {
        async fn create(
            &self,
            _source: MediaSource,
            initial: InitialStatus,
            _status_tx: StatusSender,
        ) -> Result<LoadedHandle> {
            Ok(LoadedHandle {
                id: HandleId::new(),
                status: LoadedStatus::from_initial(&initial, None),
            })
        }
        async fn release(&self, _handle: HandleId) -> Result<()> {
            Ok(())
        }
        async fn play(&self, _handle: HandleId) -> Result<()> {
            Ok(())
        }
        async fn pause(&self, _handle: HandleId) -> Result<()> {
            Ok(())
        }
        async fn stop(&self, _handle: HandleId) -> Result<()> {
            Ok(())
        }
        async fn set_position(&self, _handle: HandleId, _position_millis: i64) -> Result<()> {
            Ok(())
        }
        async fn play_from_position(&self, _handle: HandleId, _position_millis: i64) -> Result<()> {
            Ok(())
        }
        async fn set_volume(&self, _handle: HandleId, _volume: f32) -> Result<()> {
            Ok(())
        }
        async fn set_muted(&self, _handle: HandleId, _muted: bool) -> Result<()> {
            Ok(())
        }
        async fn set_looping(&self, _handle: HandleId, _looping: bool) -> Result<()> {
            Ok(())
        }
        async fn set_rate(&self, _handle: HandleId, _rate: f32, _correct_pitch: bool) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn default_fullscreen_is_not_available() {
        let engine = NoFullscreenEngine;
        let err = engine.present_fullscreen(HandleId::new()).await.unwrap_err();
        assert!(matches!(err, BridgeError::NotAvailable(_)));
        assert!(engine.set_audio_mode(AudioMode::default()).await.is_ok());
    }
}
