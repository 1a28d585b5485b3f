//! Commands accepted by the player service.

use bridge_traits::FullscreenUpdate;
use core_playback::{LoopMode, NaturalSize};
use serde::{Deserialize, Serialize};

/// A user gesture or presentation callback, forwarded to the session
/// controller in the order received.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Reload the entry under the cursor.
    LoadCurrent { autoplay: bool },
    /// Move the cursor without loading.
    Advance { forward: bool },
    Next,
    Previous,

    TogglePlayPause,
    Stop,
    SeekBegin,
    SeekCommit { fraction: f64 },
    Skip { delta_millis: i64 },
    SkipForwardShort,
    SkipBackShort,
    SkipForwardLong,
    SkipBackLong,

    SetRate { rate: f32, correct_pitch: bool },
    /// Rate slider position in `0.0..=1.0`.
    SetRateFraction { fraction: f32 },
    TogglePitchCorrection,
    SetVolume { volume: f32 },
    SetMuted { muted: bool },
    ToggleMuted,
    SetLoopMode { mode: LoopMode },
    ToggleLoopMode,

    ToggleNativeControls,
    TogglePoster,
    PresentFullscreen,
    FullscreenUpdate { update: FullscreenUpdate },
    ReadyForDisplay { natural_size: NaturalSize },
    ToggleEarpiece,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_deserialize_from_host_json() {
        let command: Command =
            serde_json::from_str(r#"{"command":"seek_commit","fraction":0.25}"#).unwrap();
        assert_eq!(command, Command::SeekCommit { fraction: 0.25 });

        let command: Command = serde_json::from_str(r#"{"command":"next"}"#).unwrap();
        assert_eq!(command, Command::Next);
    }
}
