//! # Player Configuration
//!
//! Static settings for a playback session: the parameters every new handle
//! starts with, transport tuning (rate slider scale, skip sizes), the video
//! container the presentation layer reserves, and the platform audio mode.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::config::PlayerConfig;
//!
//! let config = PlayerConfig::builder()
//!     .volume(0.8)
//!     .short_skip_millis(10_000)
//!     .build()
//!     .expect("valid config");
//! assert_eq!(config.transport.short_skip_millis, 10_000);
//! ```
//!
//! Hosts that keep settings on disk can deserialize the same structure; every
//! field falls back to its default:
//!
//! ```rust
//! use core_runtime::config::PlayerConfig;
//!
//! let config = PlayerConfig::from_json(r#"{ "transport": { "rate_scale": 2.0 } }"#).unwrap();
//! assert_eq!(config.transport.rate_scale, 2.0);
//! assert_eq!(config.session.volume, 1.0);
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::AudioMode;
use serde::{Deserialize, Serialize};

/// Upper bound of the rate slider; the slider's `0.0..=1.0` maps onto `0.0..=RATE_SCALE`.
pub const DEFAULT_RATE_SCALE: f32 = 3.0;

/// Font size the presentation layer lays text out with. The video container
/// leaves room for two lines of it.
pub const FONT_SIZE: f32 = 14.0;

/// Complete player configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default)]
    pub session: SessionDefaults,

    #[serde(default)]
    pub transport: TransportConfig,

    #[serde(default)]
    pub viewport: Viewport,

    /// Passed to the engine once at startup, and again whenever audio routing
    /// is toggled.
    #[serde(default)]
    pub audio_mode: AudioMode,

    /// Per-subscriber buffer of the event bus.
    #[serde(default = "default_event_buffer_size")]
    pub event_buffer_size: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            session: SessionDefaults::default(),
            transport: TransportConfig::default(),
            viewport: Viewport::default(),
            audio_mode: AudioMode::default(),
            event_buffer_size: default_event_buffer_size(),
        }
    }
}

/// Parameters the first handle is created with. Later handles inherit whatever
/// the previous one last reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionDefaults {
    #[serde(default = "default_volume")]
    pub volume: f32,

    #[serde(default = "default_rate")]
    pub rate: f32,

    #[serde(default = "default_true")]
    pub should_correct_pitch: bool,

    #[serde(default)]
    pub is_muted: bool,

    /// Start in single-item loop mode instead of whole-playlist mode.
    #[serde(default)]
    pub loop_single_item: bool,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            rate: default_rate(),
            should_correct_pitch: true,
            is_muted: false,
            loop_single_item: false,
        }
    }
}

/// Transport tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "default_rate_scale")]
    pub rate_scale: f32,

    /// Size of the short skip buttons.
    #[serde(default = "default_short_skip_millis")]
    pub short_skip_millis: u64,

    /// Size of the long skip buttons.
    #[serde(default = "default_long_skip_millis")]
    pub long_skip_millis: u64,

    /// Clamp skip targets to `0..=duration` before they reach the engine.
    /// Off by default: targets are forwarded as computed and the engine decides.
    #[serde(default)]
    pub clamp_skip_targets: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            rate_scale: default_rate_scale(),
            short_skip_millis: default_short_skip_millis(),
            long_skip_millis: default_long_skip_millis(),
            clamp_skip_targets: false,
        }
    }
}

/// Size of the area reserved for the video surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Video container for a device screen: full width, two fifths of the height
    /// minus two lines of text.
    pub fn for_device(device_width: f32, device_height: f32) -> Self {
        Self {
            width: device_width,
            height: device_height * 2.0 / 5.0 - FONT_SIZE * 2.0,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::for_device(375.0, 667.0)
    }
}

impl PlayerConfig {
    /// Creates a new builder for constructing a `PlayerConfig`.
    pub fn builder() -> PlayerConfigBuilder {
        PlayerConfigBuilder::default()
    }

    /// Parse a JSON document and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PlayerConfig = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Invalid player config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration and returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        let transport = &self.transport;
        if !transport.rate_scale.is_finite() || transport.rate_scale <= 0.0 {
            return Err(Error::invalid("transport.rate_scale", "must be a positive number"));
        }
        if transport.short_skip_millis == 0 || transport.long_skip_millis == 0 {
            return Err(Error::invalid("transport.skip", "skip sizes must be greater than 0"));
        }
        if i64::try_from(transport.short_skip_millis.max(transport.long_skip_millis)).is_err() {
            return Err(Error::invalid("transport.skip", "skip sizes must fit in i64 milliseconds"));
        }

        let session = &self.session;
        if !(0.0..=1.0).contains(&session.volume) {
            return Err(Error::invalid("session.volume", "must be between 0.0 and 1.0"));
        }
        if !(0.0..=transport.rate_scale).contains(&session.rate) {
            return Err(Error::invalid(
                "session.rate",
                format!("must be between 0.0 and rate_scale ({})", transport.rate_scale),
            ));
        }

        if !(self.viewport.width > 0.0 && self.viewport.height > 0.0) {
            return Err(Error::invalid("viewport", "width and height must be positive"));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::invalid("event_buffer_size", "must be greater than 0"));
        }

        Ok(())
    }
}

/// Builder for [`PlayerConfig`].
#[derive(Debug, Default)]
pub struct PlayerConfigBuilder {
    config: PlayerConfig,
}

impl PlayerConfigBuilder {
    pub fn volume(mut self, volume: f32) -> Self {
        self.config.session.volume = volume;
        self
    }

    pub fn rate(mut self, rate: f32) -> Self {
        self.config.session.rate = rate;
        self
    }

    pub fn correct_pitch(mut self, enabled: bool) -> Self {
        self.config.session.should_correct_pitch = enabled;
        self
    }

    pub fn muted(mut self, muted: bool) -> Self {
        self.config.session.is_muted = muted;
        self
    }

    pub fn loop_single_item(mut self, enabled: bool) -> Self {
        self.config.session.loop_single_item = enabled;
        self
    }

    pub fn rate_scale(mut self, scale: f32) -> Self {
        self.config.transport.rate_scale = scale;
        self
    }

    pub fn short_skip_millis(mut self, millis: u64) -> Self {
        self.config.transport.short_skip_millis = millis;
        self
    }

    pub fn long_skip_millis(mut self, millis: u64) -> Self {
        self.config.transport.long_skip_millis = millis;
        self
    }

    pub fn clamp_skip_targets(mut self, enabled: bool) -> Self {
        self.config.transport.clamp_skip_targets = enabled;
        self
    }

    pub fn viewport(mut self, viewport: Viewport) -> Self {
        self.config.viewport = viewport;
        self
    }

    pub fn audio_mode(mut self, mode: AudioMode) -> Self {
        self.config.audio_mode = mode;
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.config.event_buffer_size = size;
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> Result<PlayerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_volume() -> f32 {
    1.0
}

fn default_rate() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_rate_scale() -> f32 {
    DEFAULT_RATE_SCALE
}

fn default_short_skip_millis() -> u64 {
    15_000
}

fn default_long_skip_millis() -> u64 {
    60_000
}

fn default_event_buffer_size() -> usize {
    DEFAULT_EVENT_BUFFER_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PlayerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.session.volume, 1.0);
        assert_eq!(config.session.rate, 1.0);
        assert!(config.session.should_correct_pitch);
        assert!(!config.session.loop_single_item);
        assert_eq!(config.transport.rate_scale, 3.0);
        assert_eq!(config.transport.short_skip_millis, 15_000);
        assert_eq!(config.transport.long_skip_millis, 60_000);
        assert!(!config.transport.clamp_skip_targets);
        assert_eq!(config.event_buffer_size, 100);
    }

    #[test]
    fn test_viewport_for_device() {
        let viewport = Viewport::for_device(400.0, 800.0);
        assert_eq!(viewport.width, 400.0);
        assert_eq!(viewport.height, 800.0 * 2.0 / 5.0 - 28.0);
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = PlayerConfig::builder()
            .volume(0.5)
            .rate(2.0)
            .correct_pitch(false)
            .muted(true)
            .loop_single_item(true)
            .long_skip_millis(30_000)
            .clamp_skip_targets(true)
            .event_buffer_size(8)
            .build()
            .unwrap();

        assert_eq!(config.session.volume, 0.5);
        assert_eq!(config.session.rate, 2.0);
        assert!(!config.session.should_correct_pitch);
        assert!(config.session.is_muted);
        assert!(config.session.loop_single_item);
        assert_eq!(config.transport.long_skip_millis, 30_000);
        assert!(config.transport.clamp_skip_targets);
        assert_eq!(config.event_buffer_size, 8);
    }

    #[test]
    fn test_builder_rejects_out_of_range_volume() {
        let err = PlayerConfig::builder().volume(1.5).build().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidValue {
                field: "session.volume",
                ..
            }
        ));
    }

    #[test]
    fn test_builder_rejects_rate_above_scale() {
        let err = PlayerConfig::builder()
            .rate_scale(2.0)
            .rate(2.5)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("session.rate"));
    }

    #[test]
    fn test_builder_rejects_degenerate_values() {
        assert!(PlayerConfig::builder().rate_scale(0.0).build().is_err());
        assert!(PlayerConfig::builder().short_skip_millis(0).build().is_err());
        assert!(PlayerConfig::builder().long_skip_millis(u64::MAX).build().is_err());
        assert!(PlayerConfig::builder()
            .short_skip_millis(i64::MAX as u64 + 1)
            .build()
            .is_err());
        assert!(PlayerConfig::builder().event_buffer_size(0).build().is_err());
        assert!(PlayerConfig::builder()
            .viewport(Viewport {
                width: 0.0,
                height: 100.0
            })
            .build()
            .is_err());
    }

    #[test]
    fn test_from_json_uses_defaults_for_missing_fields() {
        let config = PlayerConfig::from_json(
            r#"{ "session": { "volume": 0.25 }, "audio_mode": {
                "allows_recording": false,
                "stays_active_in_background": false,
                "interruption_mode": "duck_others",
                "plays_in_silent_mode": true,
                "should_duck_others": true,
                "play_through_earpiece": true
            } }"#,
        )
        .unwrap();

        assert_eq!(config.session.volume, 0.25);
        assert!(config.session.should_correct_pitch);
        assert_eq!(config.transport, TransportConfig::default());
        assert!(config.audio_mode.play_through_earpiece);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = PlayerConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
