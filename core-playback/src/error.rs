//! # Playback Error Types
//!
//! Errors surfaced by the session controller.

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Errors that can occur while driving a playback session.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Playlist Errors
    // ========================================================================
    /// A playlist needs at least one entry for the cursor to be valid.
    #[error("Playlist is empty")]
    EmptyPlaylist,

    // ========================================================================
    // Engine Errors
    // ========================================================================
    /// The engine could not create a handle for the current entry.
    ///
    /// Non-fatal: the session stays in its loading state and nothing retries.
    #[error("Failed to load {uri}: {reason}")]
    LoadFailed { uri: String, reason: String },

    /// A transport command was issued but the engine failed it.
    #[error("{command} failed: {reason}")]
    TransportFailed {
        command: &'static str,
        reason: String,
    },

    // ========================================================================
    // Session Errors
    // ========================================================================
    /// The command needs a loaded handle and none is live.
    #[error("No active playback handle")]
    NoActiveHandle,

    /// Seek fraction was NaN.
    #[error("Invalid seek fraction: {0}")]
    InvalidSeekFraction(f64),

    /// Seeking by fraction needs a known duration.
    #[error("Duration of the current entry is not known yet")]
    DurationUnknown,

    // ========================================================================
    // Generic Errors
    // ========================================================================
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

impl PlaybackError {
    pub(crate) fn transport(command: &'static str, err: BridgeError) -> Self {
        PlaybackError::TransportFailed {
            command,
            reason: err.to_string(),
        }
    }

    /// Returns `true` if this error came from creating a handle.
    pub fn is_load_failure(&self) -> bool {
        matches!(self, PlaybackError::LoadFailed { .. })
    }

    /// Returns `true` if the session can keep going after this error.
    ///
    /// Every engine failure is recoverable; only a session that was built
    /// without entries cannot make progress.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, PlaybackError::EmptyPlaylist)
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_failure_is_recoverable() {
        let err = PlaybackError::LoadFailed {
            uri: "https://cdn.example.com/a.mp3".into(),
            reason: "404".into(),
        };
        assert!(err.is_load_failure());
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "Failed to load https://cdn.example.com/a.mp3: 404");
    }

    #[test]
    fn empty_playlist_is_fatal() {
        assert!(!PlaybackError::EmptyPlaylist.is_recoverable());
        assert!(!PlaybackError::EmptyPlaylist.is_load_failure());
    }

    #[test]
    fn transport_failure_names_command() {
        let err = PlaybackError::transport("pause", BridgeError::OperationFailed("device lost".into()));
        assert_eq!(err.to_string(), "pause failed: Bridge operation failed: device lost");
    }
}
