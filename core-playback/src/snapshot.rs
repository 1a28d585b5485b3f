//! Read-only view of a session for rendering.

use crate::playlist::PlaylistEntry;
use crate::state::{LoopMode, PlaybackSessionState, SeekGesture, VideoDisplaySize};
use crate::timestamp::{seek_fraction, timestamp_label};
use serde::Serialize;

/// Title shown while a handle is being created.
pub const LOADING_LABEL: &str = "... loading ...";

/// Status line shown while the engine is buffering.
pub const BUFFERING_LABEL: &str = "...buffering...";

/// Everything a transport UI needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub index: usize,
    /// Entry name, or [`LOADING_LABEL`] while loading.
    pub title: String,
    /// Show the video surface. `false` while loading, even for video entries.
    pub show_video: bool,
    pub is_loading: bool,
    pub is_playing: bool,
    pub is_buffering: bool,
    pub buffering_label: Option<&'static str>,
    pub is_seeking: bool,
    pub should_play: bool,
    pub position_millis: Option<u64>,
    pub duration_millis: Option<u64>,
    /// `"mm:ss / mm:ss"`, empty until both values are known.
    pub timestamp: String,
    pub seek_fraction: f64,
    pub volume: f32,
    pub rate: f32,
    /// Rate slider position, `rate / rate_scale`.
    pub rate_fraction: f32,
    pub should_correct_pitch: bool,
    pub is_muted: bool,
    pub loop_mode: LoopMode,
    pub video_size: VideoDisplaySize,
    pub is_fullscreen: bool,
    pub use_native_controls: bool,
    pub show_poster: bool,
    pub through_earpiece: bool,
    pub last_error: Option<String>,
}

impl SessionSnapshot {
    pub(crate) fn capture(
        index: usize,
        entry: &PlaylistEntry,
        state: &PlaybackSessionState,
        seek: SeekGesture,
        rate_scale: f32,
        through_earpiece: bool,
    ) -> Self {
        let is_loading = state.is_loading();
        let is_buffering = state.is_buffering();

        Self {
            index,
            title: if is_loading {
                LOADING_LABEL.to_string()
            } else {
                entry.name.clone()
            },
            show_video: entry.is_video && !is_loading,
            is_loading,
            is_playing: state.is_playing(),
            is_buffering,
            buffering_label: is_buffering.then_some(BUFFERING_LABEL),
            is_seeking: seek.is_seeking,
            should_play: state.should_play,
            position_millis: state.position_millis,
            duration_millis: state.duration_millis,
            timestamp: timestamp_label(state.position_millis, state.duration_millis),
            seek_fraction: seek_fraction(state.position_millis, state.duration_millis),
            volume: state.volume,
            rate: state.rate,
            rate_fraction: if rate_scale > 0.0 {
                state.rate / rate_scale
            } else {
                0.0
            },
            should_correct_pitch: state.should_correct_pitch,
            is_muted: state.is_muted,
            loop_mode: state.loop_mode,
            video_size: state.video_size,
            is_fullscreen: state.is_fullscreen,
            use_native_controls: state.use_native_controls,
            show_poster: state.show_poster,
            through_earpiece,
            last_error: state.last_error.clone(),
        }
    }

    /// The same view shown as loading, for hosts that render before the
    /// first load has begun.
    pub fn into_loading(mut self) -> Self {
        self.title = LOADING_LABEL.to_string();
        self.show_video = false;
        self.is_loading = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{LoadPhase, Transport};
    use core_runtime::config::{SessionDefaults, Viewport};

    fn entry() -> PlaylistEntry {
        PlaylistEntry::video("Big Buck Bunny", "http://example.com/bunny.mp4")
    }

    #[test]
    fn loading_snapshot_hides_title_and_video() {
        let mut state = PlaybackSessionState::new(&SessionDefaults::default(), Viewport::default());
        state.phase = LoadPhase::Loading;

        let snapshot = SessionSnapshot::capture(5, &entry(), &state, SeekGesture::default(), 3.0, false);

        assert_eq!(snapshot.title, LOADING_LABEL);
        assert!(!snapshot.show_video);
        assert_eq!(snapshot.timestamp, "");
        assert_eq!(snapshot.seek_fraction, 0.0);
    }

    #[test]
    fn unloaded_snapshot_can_be_shown_as_loading() {
        let state = PlaybackSessionState::new(&SessionDefaults::default(), Viewport::default());

        let snapshot = SessionSnapshot::capture(0, &entry(), &state, SeekGesture::default(), 3.0, false);
        assert!(!snapshot.is_loading);

        let snapshot = snapshot.into_loading();
        assert!(snapshot.is_loading);
        assert_eq!(snapshot.title, LOADING_LABEL);
        assert!(!snapshot.show_video);
    }

    #[test]
    fn ready_snapshot_renders_transport_fields() {
        let mut state = PlaybackSessionState::new(&SessionDefaults::default(), Viewport::default());
        state.phase = LoadPhase::Ready {
            transport: Transport::Playing,
            buffering: true,
        };
        state.position_millis = Some(65_000);
        state.duration_millis = Some(130_000);
        state.rate = 1.5;

        let seek = SeekGesture {
            is_seeking: true,
            resume_after_seek: true,
        };
        let snapshot = SessionSnapshot::capture(5, &entry(), &state, seek, 3.0, true);

        assert_eq!(snapshot.title, "Big Buck Bunny");
        assert!(snapshot.show_video);
        assert!(snapshot.is_playing);
        assert_eq!(snapshot.buffering_label, Some(BUFFERING_LABEL));
        assert_eq!(snapshot.timestamp, "01:05 / 02:10");
        assert_eq!(snapshot.seek_fraction, 0.5);
        assert_eq!(snapshot.rate_fraction, 0.5);
        assert!(snapshot.is_seeking);
        assert!(snapshot.through_earpiece);
    }
}
