//! # Session Controller
//!
//! Owns the single playback handle of a session and mediates every transport
//! command against it.
//!
//! ## Overview
//!
//! The controller keeps three things in step:
//! - a cursor into an immutable [`Playlist`]
//! - at most one live engine handle
//! - a [`PlaybackSessionState`] mirroring the handle's last reported status
//!
//! Commands are translated into [`PlaybackEngine`] calls. The engine pushes
//! status reports through the [`StatusSender`] handed to `create`; whoever
//! drains the matching receiver feeds them back through
//! [`SessionController::on_engine_status`]. Each report is a full snapshot and
//! overwrites the mirrored fields, so commands never update those fields
//! themselves.
//!
//! ## Handle lifecycle
//!
//! ```text
//! Unloaded ──load──> Loading ──create ok──> Ready{Playing|Paused, buffering}
//!                       │                        │
//!                       └─create failed          └─natural end──> Loading (next entry)
//!                         (stays Loading)
//! ```
//!
//! The handle slot is emptied before the previous handle is released, and
//! status reports are only applied when they carry the slot's current id, so
//! reports from a superseded handle are dropped.
//!
//! ## Example
//!
//! ```ignore
//! use bridge_traits::status_channel;
//! use core_playback::{Playlist, SessionController};
//! use core_runtime::{config::PlayerConfig, events::EventBus};
//!
//! let (status_tx, mut status_rx) = status_channel();
//! let mut controller = SessionController::new(
//!     engine,
//!     Playlist::builtin(),
//!     PlayerConfig::default(),
//!     EventBus::default(),
//!     status_tx,
//! );
//!
//! controller.load_current(false).await?;
//! controller.toggle_play_pause().await?;
//! while let Some(update) = status_rx.recv().await {
//!     controller.on_engine_status(update).await;
//! }
//! ```

use crate::error::{PlaybackError, Result};
use crate::playlist::{Playlist, PlaylistCursor, PlaylistEntry};
use crate::snapshot::SessionSnapshot;
use crate::state::{LoopMode, NaturalSize, PlaybackSessionState, SeekGesture, VideoDisplaySize};

use bridge_traits::error::BridgeError;
use bridge_traits::{
    AudioMode, EngineStatus, FullscreenUpdate, HandleId, PlaybackEngine, StatusSender, StatusUpdate,
};
use core_runtime::config::PlayerConfig;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent, SessionEvent};
use core_runtime::logging::uri_for_log;

use std::sync::Arc;
use tracing::{debug, info, instrument, trace, warn};

/// The live handle and the entry it was created for.
#[derive(Debug, Clone, Copy)]
struct ActiveHandle {
    id: HandleId,
    index: usize,
}

/// Controller for one playback session.
///
/// Methods take `&mut self`; callers serialize commands and status reports
/// (the service loop in `core-service` does this with a single task).
pub struct SessionController<E: PlaybackEngine + ?Sized> {
    engine: Arc<E>,
    playlist: Playlist,
    cursor: PlaylistCursor,
    handle: Option<ActiveHandle>,
    state: PlaybackSessionState,
    seek: SeekGesture,
    audio_mode: AudioMode,
    config: PlayerConfig,
    events: EventBus,
    status_tx: StatusSender,
}

impl<E: PlaybackEngine + ?Sized> SessionController<E> {
    /// Creates a controller positioned on the first entry with nothing loaded.
    pub fn new(
        engine: Arc<E>,
        playlist: Playlist,
        config: PlayerConfig,
        events: EventBus,
        status_tx: StatusSender,
    ) -> Self {
        let cursor = PlaylistCursor::new(&playlist);
        let state = PlaybackSessionState::new(&config.session, config.viewport);

        Self {
            engine,
            playlist,
            cursor,
            handle: None,
            state,
            seek: SeekGesture::default(),
            audio_mode: config.audio_mode,
            config,
            events,
            status_tx,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> &PlaybackSessionState {
        &self.state
    }

    pub fn seek_gesture(&self) -> SeekGesture {
        self.seek
    }

    pub fn index(&self) -> usize {
        self.cursor.index()
    }

    pub fn current_entry(&self) -> &PlaylistEntry {
        self.playlist.entry_at(&self.cursor)
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// Id of the live handle, if any.
    pub fn handle_id(&self) -> Option<HandleId> {
        self.handle.map(|active| active.id)
    }

    pub fn has_live_handle(&self) -> bool {
        self.handle.is_some()
    }

    pub fn audio_mode(&self) -> AudioMode {
        self.audio_mode
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Render-ready view of the session.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(
            self.cursor.index(),
            self.current_entry(),
            &self.state,
            self.seek,
            self.config.transport.rate_scale,
            self.audio_mode.play_through_earpiece,
        )
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Load the entry under the cursor, replacing any live handle.
    ///
    /// The previous handle is taken out of the slot and its release awaited
    /// before `create` is called, so two handles never coexist. The new
    /// handle starts with the session's rate, pitch correction, volume, mute
    /// and loop mode, and plays immediately when `autoplay` is set.
    ///
    /// # Errors
    ///
    /// `PlaybackError::LoadFailed` if the engine cannot create the handle.
    /// The session is left in `Loading` and nothing retries; the failure is
    /// also published as `TrackLoadFailed` and a recoverable
    /// `PlaybackEvent::Error`.
    #[instrument(skip(self), fields(index = self.cursor.index()))]
    pub async fn load_current(&mut self, autoplay: bool) -> Result<()> {
        self.release_handle().await;

        let index = self.cursor.index();
        let entry = self.playlist.entry_at(&self.cursor).clone();

        self.state.begin_loading(self.config.viewport);
        self.publish(SessionEvent::TrackLoading {
            index,
            name: entry.name.clone(),
        });
        info!(uri = %uri_for_log(&entry.uri), is_video = entry.is_video, "Loading playlist entry");

        let initial = self.state.initial_status(autoplay);
        match self
            .engine
            .create(entry.source(), initial, self.status_tx.clone())
            .await
        {
            Ok(loaded) => {
                self.handle = Some(ActiveHandle {
                    id: loaded.id,
                    index,
                });
                self.state.apply_loaded(&loaded.status);
                self.state.last_error = None;

                info!(handle = %loaded.id, duration_ms = ?loaded.status.duration_millis, "Entry loaded");
                self.publish(SessionEvent::TrackLoaded {
                    index,
                    name: entry.name,
                    is_video: entry.is_video,
                    duration_ms: loaded.status.duration_millis,
                });
                Ok(())
            }
            Err(err) => {
                let reason = err.to_string();
                warn!(uri = %uri_for_log(&entry.uri), error = %reason, "Failed to load entry");

                self.state.last_error = Some(reason.clone());
                self.publish(SessionEvent::TrackLoadFailed {
                    index,
                    uri: entry.uri.clone(),
                    message: reason.clone(),
                });
                self.publish(PlaybackEvent::Error {
                    index: Some(index),
                    message: reason.clone(),
                    recoverable: true,
                });

                Err(PlaybackError::LoadFailed {
                    uri: entry.uri,
                    reason,
                })
            }
        }
    }

    /// Move the cursor one entry, wrapping at both ends. Does not load.
    pub fn advance(&mut self, forward: bool) -> usize {
        let from = self.cursor.index();
        let to = self.cursor.advance(forward);
        debug!(from, to, forward, "Playlist cursor moved");
        self.publish(SessionEvent::Advanced { from, to, forward });
        to
    }

    /// Advance and load the next entry, keeping the current play intent.
    /// Ignored while nothing is loaded.
    pub async fn next(&mut self) -> Result<()> {
        self.step(true).await
    }

    /// Advance and load the previous entry, keeping the current play intent.
    /// Ignored while nothing is loaded.
    pub async fn previous(&mut self) -> Result<()> {
        self.step(false).await
    }

    async fn step(&mut self, forward: bool) -> Result<()> {
        if self.handle.is_none() {
            debug!(forward, "Skip to entry ignored: nothing loaded");
            return Ok(());
        }
        self.advance(forward);
        let autoplay = self.state.should_play;
        self.load_current(autoplay).await
    }

    /// Release the live handle and return to `Unloaded`.
    pub async fn teardown(&mut self) {
        self.release_handle().await;
        self.state.unload();
        self.seek = SeekGesture::default();
    }

    async fn release_handle(&mut self) {
        // Empty the slot first so reports for the old handle stop matching
        let Some(previous) = self.handle.take() else {
            return;
        };

        if let Err(err) = self.engine.release(previous.id).await {
            warn!(handle = %previous.id, error = %err, "Failed to release handle");
        }
        debug!(handle = %previous.id, "Handle released");
        self.publish(SessionEvent::Released {
            index: previous.index,
        });
    }

    // ========================================================================
    // Engine Status
    // ========================================================================

    /// Apply a status report pushed by the engine.
    ///
    /// Reports for anything but the live handle are dropped. A loaded report
    /// overwrites the mirrored state; if it marks a natural end without
    /// looping, the cursor advances and the next entry loads with autoplay.
    /// An unloaded report with an error is published without touching state.
    pub async fn on_engine_status(&mut self, update: StatusUpdate) {
        let Some(active) = self.handle else {
            trace!(handle = %update.handle, "Dropping status: no live handle");
            return;
        };
        if active.id != update.handle {
            trace!(handle = %update.handle, live = %active.id, "Dropping status for stale handle");
            return;
        }

        match update.status {
            EngineStatus::Loaded(status) => {
                self.state.apply_loaded(&status);
                trace!(
                    position_ms = status.position_millis,
                    playing = status.is_playing,
                    buffering = status.is_buffering,
                    "Status applied"
                );
                self.publish(PlaybackEvent::StatusChanged {
                    index: active.index,
                    position_ms: status.position_millis,
                    duration_ms: status.duration_millis,
                    is_playing: status.is_playing,
                    is_buffering: status.is_buffering,
                });

                if status.did_just_finish && !status.is_looping {
                    info!(index = active.index, "Entry finished, advancing");
                    self.publish(PlaybackEvent::Completed {
                        index: active.index,
                    });
                    self.advance(true);
                    if let Err(err) = self.load_current(true).await {
                        warn!(error = %err, "Auto-advance could not load next entry");
                    }
                }
            }
            EngineStatus::Unloaded { error: Some(message) } => {
                warn!(handle = %active.id, error = %message, "Engine reported an error");
                self.state.last_error = Some(message.clone());
                self.publish(PlaybackEvent::Error {
                    index: Some(active.index),
                    message,
                    recoverable: true,
                });
            }
            EngineStatus::Unloaded { error: None } => {
                trace!(handle = %active.id, "Engine reported unloaded without error");
            }
        }
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Pause when playing, play otherwise. Ignored while nothing is loaded.
    pub async fn toggle_play_pause(&mut self) -> Result<()> {
        let Some(handle) = self.handle_id() else {
            return Ok(());
        };

        if self.state.is_playing() {
            let result = self.engine.pause(handle).await;
            self.check("pause", result)
        } else {
            let result = self.engine.play(handle).await;
            self.check("play", result)
        }
    }

    pub async fn stop(&mut self) -> Result<()> {
        let Some(handle) = self.handle_id() else {
            return Ok(());
        };
        let result = self.engine.stop(handle).await;
        self.check("stop", result)
    }

    /// Start a seek-slider drag: remember whether to resume, then pause.
    ///
    /// Repeated calls during one drag are ignored.
    pub async fn seek_begin(&mut self) -> Result<()> {
        let Some(handle) = self.handle_id() else {
            return Ok(());
        };
        if self.seek.is_seeking {
            trace!("Seek already in progress");
            return Ok(());
        }

        self.seek.resume_after_seek = self.state.should_play;
        self.seek.is_seeking = true;
        debug!(resume = self.seek.resume_after_seek, "Seek started");

        let result = self.engine.pause(handle).await;
        self.check("pause", result)
    }

    /// Finish a seek-slider drag at `fraction` of the duration.
    ///
    /// Fractions outside `0.0..=1.0` are clamped.
    ///
    /// # Errors
    ///
    /// - `PlaybackError::InvalidSeekFraction` for NaN (the drag still ends)
    /// - `PlaybackError::DurationUnknown` when the engine has not reported a
    ///   duration (the drag still ends)
    pub async fn seek_commit(&mut self, fraction: f64) -> Result<()> {
        self.seek.is_seeking = false;
        if fraction.is_nan() {
            return Err(PlaybackError::InvalidSeekFraction(fraction));
        }
        let Some(handle) = self.handle_id() else {
            return Ok(());
        };

        let duration = self
            .state
            .duration_millis
            .ok_or(PlaybackError::DurationUnknown)?;
        let target = (fraction.clamp(0.0, 1.0) * duration as f64) as i64;

        self.seek_to(handle, target).await
    }

    /// Jump by `delta_millis` from the current position.
    ///
    /// Targets before the start or past the end are passed through unless
    /// `clamp_skip_targets` is configured. Ends any seek drag and reuses its
    /// resume decision.
    pub async fn skip(&mut self, delta_millis: i64) -> Result<()> {
        let Some(handle) = self.handle_id() else {
            return Ok(());
        };

        self.seek.is_seeking = false;
        let position = self.state.position_millis.unwrap_or(0) as i64;
        let mut target = position.saturating_add(delta_millis);
        if self.config.transport.clamp_skip_targets {
            target = target.max(0);
            if let Some(duration) = self.state.duration_millis {
                target = target.min(duration as i64);
            }
        }

        self.seek_to(handle, target).await
    }

    pub async fn skip_forward_short(&mut self) -> Result<()> {
        self.skip(skip_delta(self.config.transport.short_skip_millis)).await
    }

    pub async fn skip_back_short(&mut self) -> Result<()> {
        self.skip(-skip_delta(self.config.transport.short_skip_millis)).await
    }

    pub async fn skip_forward_long(&mut self) -> Result<()> {
        self.skip(skip_delta(self.config.transport.long_skip_millis)).await
    }

    pub async fn skip_back_long(&mut self) -> Result<()> {
        self.skip(-skip_delta(self.config.transport.long_skip_millis)).await
    }

    async fn seek_to(&mut self, handle: HandleId, target: i64) -> Result<()> {
        if self.seek.resume_after_seek {
            debug!(target, "Playing from position");
            let result = self.engine.play_from_position(handle, target).await;
            self.check("play_from_position", result)
        } else {
            debug!(target, "Setting position");
            let result = self.engine.set_position(handle, target).await;
            self.check("set_position", result)
        }
    }

    // ========================================================================
    // Rate, Volume, Looping
    // ========================================================================

    /// Ask the engine for a new rate and pitch correction.
    ///
    /// The rate is clamped to `0.0..=rate_scale`. Engines that cannot vary the
    /// rate reject the call; the rejection is logged at debug level and the
    /// session keeps its current rate. Never fails.
    pub async fn set_rate(&mut self, rate: f32, correct_pitch: bool) -> Result<()> {
        let Some(handle) = self.handle_id() else {
            return Ok(());
        };
        if rate.is_nan() {
            debug!("Ignoring NaN rate");
            return Ok(());
        }

        let rate = rate.clamp(0.0, self.config.transport.rate_scale);
        match self.engine.set_rate(handle, rate, correct_pitch).await {
            Ok(()) => debug!(rate, correct_pitch, "Rate change requested"),
            Err(err) => debug!(rate, correct_pitch, error = %err, "Rate change rejected"),
        }
        Ok(())
    }

    /// Rate from a slider position in `0.0..=1.0`.
    pub async fn set_rate_fraction(&mut self, fraction: f32) -> Result<()> {
        let rate = fraction * self.config.transport.rate_scale;
        self.set_rate(rate, self.state.should_correct_pitch).await
    }

    pub async fn toggle_pitch_correction(&mut self) -> Result<()> {
        self.set_rate(self.state.rate, !self.state.should_correct_pitch)
            .await
    }

    /// Volume is clamped to `0.0..=1.0`.
    pub async fn set_volume(&mut self, volume: f32) -> Result<()> {
        let Some(handle) = self.handle_id() else {
            return Ok(());
        };
        if volume.is_nan() {
            debug!("Ignoring NaN volume");
            return Ok(());
        }

        let result = self.engine.set_volume(handle, volume.clamp(0.0, 1.0)).await;
        self.check("set_volume", result)
    }

    pub async fn set_muted(&mut self, muted: bool) -> Result<()> {
        let Some(handle) = self.handle_id() else {
            return Ok(());
        };
        let result = self.engine.set_muted(handle, muted).await;
        self.check("set_muted", result)
    }

    pub async fn toggle_muted(&mut self) -> Result<()> {
        self.set_muted(!self.state.is_muted).await
    }

    /// `LoopMode::One` turns on the engine's per-item loop.
    pub async fn set_loop_mode(&mut self, mode: LoopMode) -> Result<()> {
        let Some(handle) = self.handle_id() else {
            return Ok(());
        };
        let result = self.engine.set_looping(handle, mode.is_single_item()).await;
        self.check("set_looping", result)
    }

    pub async fn toggle_loop_mode(&mut self) -> Result<()> {
        self.set_loop_mode(self.state.loop_mode.toggled()).await
    }

    // ========================================================================
    // Presentation
    // ========================================================================

    pub fn toggle_native_controls(&mut self) -> bool {
        self.state.use_native_controls = !self.state.use_native_controls;
        self.state.use_native_controls
    }

    pub fn toggle_poster(&mut self) -> bool {
        self.state.show_poster = !self.state.show_poster;
        self.state.show_poster
    }

    /// Ask the engine to present its fullscreen player. Engine failures are
    /// logged only.
    ///
    /// # Errors
    ///
    /// `PlaybackError::NoActiveHandle` while nothing is loaded.
    pub async fn present_fullscreen(&mut self) -> Result<()> {
        let handle = self.handle_id().ok_or(PlaybackError::NoActiveHandle)?;
        if let Err(err) = self.engine.present_fullscreen(handle).await {
            warn!(error = %err, "Fullscreen presentation failed");
        }
        Ok(())
    }

    pub fn on_fullscreen_update(&mut self, update: FullscreenUpdate) {
        debug!(?update, "Fullscreen update");
        match update {
            FullscreenUpdate::DidPresent => self.state.is_fullscreen = true,
            FullscreenUpdate::DidDismiss => self.state.is_fullscreen = false,
            FullscreenUpdate::WillPresent | FullscreenUpdate::WillDismiss => {}
        }
    }

    /// Fit the video surface once the first frame reports its size.
    pub fn on_ready_for_display(&mut self, natural: NaturalSize) {
        match VideoDisplaySize::fit(natural, self.config.viewport) {
            Some(size) => self.state.video_size = size,
            None => debug!(?natural, "Ignoring degenerate natural size"),
        }
    }

    // ========================================================================
    // Audio Routing
    // ========================================================================

    /// Push the current audio mode to the engine.
    pub async fn apply_audio_mode(&mut self) -> Result<()> {
        match self.engine.set_audio_mode(self.audio_mode).await {
            Ok(()) => {
                debug!(mode = ?self.audio_mode, "Audio mode applied");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Failed to apply audio mode");
                Err(err.into())
            }
        }
    }

    /// Route audio through the earpiece or back to the speaker. The previous
    /// routing is restored if the engine refuses.
    pub async fn toggle_earpiece(&mut self) -> Result<()> {
        let previous = self.audio_mode;
        self.audio_mode.play_through_earpiece = !previous.play_through_earpiece;
        if let Err(err) = self.apply_audio_mode().await {
            self.audio_mode = previous;
            return Err(err);
        }
        Ok(())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn check(&self, command: &'static str, result: bridge_traits::error::Result<()>) -> Result<()> {
        match result {
            Ok(()) => {
                debug!(command, "Transport command issued");
                Ok(())
            }
            Err(err) => Err(self.transport_failed(command, err)),
        }
    }

    fn transport_failed(&self, command: &'static str, err: BridgeError) -> PlaybackError {
        warn!(command, error = %err, "Transport command failed");
        let err = PlaybackError::transport(command, err);
        self.publish(PlaybackEvent::Error {
            index: self.handle.map(|active| active.index),
            message: err.to_string(),
            recoverable: true,
        });
        err
    }

    fn publish(&self, event: impl Into<CoreEvent>) {
        // No subscribers is fine
        let _ = self.events.emit(event.into());
    }
}

/// Skip size as a signed delta. Sizes past `i64::MAX` are rejected by
/// `PlayerConfig::validate`; saturate for configs built by hand.
fn skip_delta(millis: u64) -> i64 {
    i64::try_from(millis).unwrap_or(i64::MAX)
}
