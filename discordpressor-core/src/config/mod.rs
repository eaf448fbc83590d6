//! Configuration structures and constants for the discordpressor-core library.
//!
//! All tunable values (size ceiling, bitrates, preset) live in an immutable
//! [`PressorConfig`] that is passed explicitly into the planner and pipeline.
//! Values that form a compatibility contract (bitrate floor, output naming,
//! frame-rate thresholds) are plain constants instead.

mod builder;

pub use builder::PressorConfigBuilder;

use crate::error::{CoreError, CoreResult};
use crate::processing::planner::SizeBudget;

// Default constants

/// Default size ceiling in megabytes (MiB) for the final output.
pub const DEFAULT_MAX_SIZE_MB: u64 = 9;

/// Default video bitrate (bps) for the optimistic single-pass attempt.
pub const DEFAULT_VIDEO_BITRATE: u64 = 5_000_000;

/// Default AAC audio bitrate (bps).
pub const DEFAULT_AUDIO_BITRATE: u64 = 128_000;

/// Videos taller than this are halved in both dimensions.
pub const DEFAULT_MAX_HEIGHT_UNTIL_HALVE: u32 = 1440;

/// Default libx264 preset.
pub const DEFAULT_ENCODER_PRESET: &str = "slower";

/// How far (in MB) the final output may exceed the ceiling before a warning is logged.
pub const DEFAULT_OVERSIZE_SLACK_MB: f64 = 0.5;

/// Lowest video bitrate the planner will ever return, even if that overshoots the budget.
pub const MIN_VIDEO_BITRATE: u64 = 100_000;

/// Suffix appended to the input stem to form the final output name.
pub const OUTPUT_SUFFIX: &str = "_discordpressed";

/// Container extension of the final output.
pub const OUTPUT_EXTENSION: &str = "mp4";

/// Video encoder used for every pass.
pub const VIDEO_CODEC: &str = "libx264";

/// Audio encoder used for the single pass and pass 2.
pub const AUDIO_CODEC: &str = "aac";

/// Presets accepted by libx264, fastest first.
pub const X264_PRESETS: [&str; 10] = [
    "ultrafast",
    "superfast",
    "veryfast",
    "faster",
    "fast",
    "medium",
    "slow",
    "slower",
    "veryslow",
    "placebo",
];

/// Main configuration structure for the discordpressor-core library.
///
/// Built once per run (usually by the CLI through [`PressorConfigBuilder`])
/// and shared read-only by every file in the batch.
///
/// # Examples
///
/// ```rust
/// use discordpressor_core::config::PressorConfigBuilder;
///
/// let config = PressorConfigBuilder::new()
///     .max_size_mb(25)
///     .preset("medium")
///     .build();
/// assert!(config.validate().is_ok());
/// assert_eq!(config.size_budget().max_bytes, 25 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PressorConfig {
    /// Size ceiling for the final output, in MiB
    pub max_size_mb: u64,

    /// Video bitrate used by the optimistic single-pass attempt
    pub default_video_bitrate: u64,

    /// AAC audio bitrate, also reserved out of the budget by the planner
    pub audio_bitrate: u64,

    /// Height above which the scale filter halves the video
    pub max_height_until_halve: u32,

    /// libx264 preset name
    pub preset: String,

    /// Tolerated overshoot (MB) before the final size warning fires
    pub oversize_slack_mb: f64,
}

impl Default for PressorConfig {
    fn default() -> Self {
        Self {
            max_size_mb: DEFAULT_MAX_SIZE_MB,
            default_video_bitrate: DEFAULT_VIDEO_BITRATE,
            audio_bitrate: DEFAULT_AUDIO_BITRATE,
            max_height_until_halve: DEFAULT_MAX_HEIGHT_UNTIL_HALVE,
            preset: DEFAULT_ENCODER_PRESET.to_string(),
            oversize_slack_mb: DEFAULT_OVERSIZE_SLACK_MB,
        }
    }
}

impl PressorConfig {
    /// Checks that every value is usable before any file is touched.
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_size_mb == 0 {
            return Err(CoreError::Config(
                "max size must be at least 1 MB".to_string(),
            ));
        }
        if self.default_video_bitrate < MIN_VIDEO_BITRATE {
            return Err(CoreError::Config(format!(
                "default video bitrate {} is below the {} bps floor",
                self.default_video_bitrate, MIN_VIDEO_BITRATE
            )));
        }
        if self.audio_bitrate == 0 {
            return Err(CoreError::Config(
                "audio bitrate must be positive".to_string(),
            ));
        }
        if self.max_height_until_halve == 0 {
            return Err(CoreError::Config(
                "max height until halve must be positive".to_string(),
            ));
        }
        if !X264_PRESETS.contains(&self.preset.as_str()) {
            return Err(CoreError::Config(format!(
                "unknown preset '{}' (expected one of: {})",
                self.preset,
                X264_PRESETS.join(", ")
            )));
        }
        if !self.oversize_slack_mb.is_finite() || self.oversize_slack_mb < 0.0 {
            return Err(CoreError::Config(format!(
                "oversize slack {} must be a non-negative number",
                self.oversize_slack_mb
            )));
        }
        Ok(())
    }

    /// The byte/bit budget derived from the size ceiling.
    #[must_use]
    pub fn size_budget(&self) -> SizeBudget {
        SizeBudget::from_megabytes(self.max_size_mb, self.audio_bitrate)
    }

    /// Size above which the final output triggers an over-budget warning.
    #[must_use]
    pub fn oversize_warning_bytes(&self) -> u64 {
        let slack = (self.oversize_slack_mb * 1024.0 * 1024.0) as u64;
        self.size_budget().max_bytes.saturating_add(slack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PressorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_size_mb, 9);
        assert_eq!(config.preset, "slower");
    }

    #[test]
    fn test_validate_rejects_unknown_preset() {
        let config = PressorConfig {
            preset: "warp-speed".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unknown preset 'warp-speed'"));
    }

    #[test]
    fn test_validate_rejects_zero_budget_and_low_default() {
        let zero = PressorConfig {
            max_size_mb: 0,
            ..Default::default()
        };
        assert!(matches!(zero.validate(), Err(CoreError::Config(_))));

        let low = PressorConfig {
            default_video_bitrate: 50_000,
            ..Default::default()
        };
        assert!(matches!(low.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_oversize_warning_threshold() {
        let config = PressorConfig::default();
        assert_eq!(
            config.oversize_warning_bytes(),
            9 * 1024 * 1024 + 512 * 1024
        );
    }
}
