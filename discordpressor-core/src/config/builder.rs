// ============================================================================
// discordpressor-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for PressorConfig
//
// Fluent construction of PressorConfig. Every field starts at its default,
// so callers only set what they want to override. Validation is left to
// PressorConfig::validate so the CLI can report it as a single error.

// ---- Internal crate imports ----
use super::PressorConfig;

/// Builder for creating PressorConfig instances.
///
/// # Examples
///
/// ```rust
/// use discordpressor_core::config::PressorConfigBuilder;
///
/// let config = PressorConfigBuilder::new()
///     .max_size_mb(8)
///     .audio_bitrate(96_000)
///     .default_video_bitrate(3_000_000)
///     .preset("fast")
///     .build();
/// assert_eq!(config.audio_bitrate, 96_000);
/// ```
#[derive(Debug, Clone)]
pub struct PressorConfigBuilder {
    config: PressorConfig,
}

impl Default for PressorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PressorConfigBuilder {
    /// Creates a new PressorConfigBuilder with default values.
    pub fn new() -> Self {
        Self {
            config: PressorConfig::default(),
        }
    }

    /// Sets the size ceiling in megabytes.
    ///
    /// # Arguments
    ///
    /// * `max_size_mb` - Maximum size of the final output, in MiB
    ///
    /// # Returns
    ///
    /// * Self for method chaining
    pub fn max_size_mb(mut self, max_size_mb: u64) -> Self {
        self.config.max_size_mb = max_size_mb;
        self
    }

    /// Sets the bitrate used for the optimistic single-pass attempt.
    pub fn default_video_bitrate(mut self, bitrate: u64) -> Self {
        self.config.default_video_bitrate = bitrate;
        self
    }

    /// Sets the AAC audio bitrate.
    pub fn audio_bitrate(mut self, bitrate: u64) -> Self {
        self.config.audio_bitrate = bitrate;
        self
    }

    /// Sets the height above which videos are halved.
    pub fn max_height_until_halve(mut self, height: u32) -> Self {
        self.config.max_height_until_halve = height;
        self
    }

    /// Sets the libx264 preset.
    ///
    /// # Arguments
    ///
    /// * `preset` - One of the libx264 preset names (e.g. "medium", "slower")
    ///
    /// # Returns
    ///
    /// * Self for method chaining
    pub fn preset(mut self, preset: &str) -> Self {
        self.config.preset = preset.to_string();
        self
    }

    /// Sets the tolerated overshoot before the final size warning.
    pub fn oversize_slack_mb(mut self, slack: f64) -> Self {
        self.config.oversize_slack_mb = slack;
        self
    }

    /// Builds the PressorConfig. Call `validate()` on the result before use.
    pub fn build(self) -> PressorConfig {
        self.config
    }
}
