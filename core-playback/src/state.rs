//! Session state mirrored from the engine.

use bridge_traits::{InitialStatus, LoadedStatus};
use core_runtime::config::{SessionDefaults, Viewport};
use serde::{Deserialize, Serialize};

/// Whether natural end-of-media moves to the next entry or repeats the
/// current one. `One` is carried out by the engine's per-item loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoopMode {
    #[default]
    All,
    One,
}

impl LoopMode {
    pub fn toggled(self) -> Self {
        match self {
            LoopMode::All => LoopMode::One,
            LoopMode::One => LoopMode::All,
        }
    }

    pub fn is_single_item(self) -> bool {
        self == LoopMode::One
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transport {
    Playing,
    Paused,
}

/// Lifecycle of the session's handle.
///
/// Buffering only exists on a loaded handle, so it lives inside `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoadPhase {
    /// No handle has been requested, or the last one was torn down.
    #[default]
    Unloaded,
    /// A handle is being created. Also where a failed load stays.
    Loading,
    Ready { transport: Transport, buffering: bool },
}

impl LoadPhase {
    fn from_status(status: &LoadedStatus) -> Self {
        LoadPhase::Ready {
            transport: if status.is_playing {
                Transport::Playing
            } else {
                Transport::Paused
            },
            buffering: status.is_buffering,
        }
    }
}

/// Transient state of a seek-slider drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeekGesture {
    pub is_seeking: bool,
    /// Snapshot of `should_play` taken when the drag began.
    pub resume_after_seek: bool,
}

/// Pixel size a video reports once its first frame is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NaturalSize {
    pub width: f32,
    pub height: f32,
}

/// Size the video surface is laid out at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoDisplaySize {
    pub width: f32,
    pub height: f32,
}

impl VideoDisplaySize {
    /// Whole container, used until a video reports its natural size.
    pub fn filling(viewport: Viewport) -> Self {
        Self {
            width: viewport.width,
            height: viewport.height,
        }
    }

    /// Fit `natural` into `viewport` keeping its aspect ratio: full width,
    /// unless that would overflow the container height, then full height.
    ///
    /// Returns `None` for degenerate sizes.
    pub fn fit(natural: NaturalSize, viewport: Viewport) -> Option<Self> {
        if !(natural.width > 0.0 && natural.height > 0.0) {
            return None;
        }

        let widest_height = viewport.width * natural.height / natural.width;
        if widest_height > viewport.height {
            Some(Self {
                width: viewport.height * natural.width / natural.height,
                height: viewport.height,
            })
        } else {
            Some(Self {
                width: viewport.width,
                height: widest_height,
            })
        }
    }
}

/// Everything the controller knows about the current handle, plus the
/// presentation flags hosts toggle.
///
/// While a handle is loaded, every mirrored field is overwritten by each
/// engine status report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSessionState {
    pub phase: LoadPhase,
    pub should_play: bool,
    /// `None` while loading
    pub position_millis: Option<u64>,
    /// `None` while loading, and for streams without a known length
    pub duration_millis: Option<u64>,
    pub volume: f32,
    pub rate: f32,
    pub should_correct_pitch: bool,
    pub is_muted: bool,
    pub loop_mode: LoopMode,
    pub video_size: VideoDisplaySize,
    pub is_fullscreen: bool,
    pub use_native_controls: bool,
    pub show_poster: bool,
    /// Most recent load or engine failure, cleared on the next successful load.
    pub last_error: Option<String>,
}

impl PlaybackSessionState {
    pub fn new(defaults: &SessionDefaults, viewport: Viewport) -> Self {
        Self {
            phase: LoadPhase::Unloaded,
            should_play: false,
            position_millis: None,
            duration_millis: None,
            volume: defaults.volume,
            rate: defaults.rate,
            should_correct_pitch: defaults.should_correct_pitch,
            is_muted: defaults.is_muted,
            loop_mode: if defaults.loop_single_item {
                LoopMode::One
            } else {
                LoopMode::All
            },
            video_size: VideoDisplaySize::filling(viewport),
            is_fullscreen: false,
            use_native_controls: false,
            show_poster: false,
            last_error: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == LoadPhase::Loading
    }

    pub fn is_playing(&self) -> bool {
        matches!(
            self.phase,
            LoadPhase::Ready {
                transport: Transport::Playing,
                ..
            }
        )
    }

    pub fn is_buffering(&self) -> bool {
        matches!(self.phase, LoadPhase::Ready { buffering: true, .. })
    }

    /// Parameters for the next handle, carried over from this session.
    pub fn initial_status(&self, autoplay: bool) -> InitialStatus {
        InitialStatus {
            should_play: autoplay,
            rate: self.rate,
            should_correct_pitch: self.should_correct_pitch,
            volume: self.volume,
            is_muted: self.is_muted,
            is_looping: self.loop_mode.is_single_item(),
        }
    }

    pub(crate) fn begin_loading(&mut self, viewport: Viewport) {
        self.phase = LoadPhase::Loading;
        self.position_millis = None;
        self.duration_millis = None;
        self.video_size = VideoDisplaySize::filling(viewport);
    }

    pub(crate) fn unload(&mut self) {
        self.phase = LoadPhase::Unloaded;
        self.position_millis = None;
        self.duration_millis = None;
    }

    /// Overwrite the mirrored fields from a loaded status report.
    pub(crate) fn apply_loaded(&mut self, status: &LoadedStatus) {
        self.phase = LoadPhase::from_status(status);
        self.position_millis = Some(match status.duration_millis {
            Some(duration) => status.position_millis.min(duration),
            None => status.position_millis,
        });
        self.duration_millis = status.duration_millis;
        self.should_play = status.should_play;
        self.rate = status.rate;
        self.should_correct_pitch = status.should_correct_pitch;
        self.volume = status.volume;
        self.is_muted = status.is_muted;
        self.loop_mode = if status.is_looping {
            LoopMode::One
        } else {
            LoopMode::All
        };
    }
}
