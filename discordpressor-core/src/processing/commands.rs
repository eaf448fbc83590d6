//! FFmpeg argument construction
//!
//! Builds the argument lists for the three encoder invocations (single pass,
//! two-pass pass 1, two-pass pass 2) as plain data so they can be inspected
//! in tests before anything is spawned.

use crate::config::{AUDIO_CODEC, PressorConfig, VIDEO_CODEC};
use crate::processing::planner::{EncodingPlan, ScaleDecision};

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::Path;

/// Which encoder invocation a command belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeStage {
    SinglePass,
    PassOne,
    PassTwo,
}

impl fmt::Display for EncodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SinglePass => write!(f, "single pass"),
            Self::PassOne => write!(f, "2-pass (pass 1)"),
            Self::PassTwo => write!(f, "2-pass (pass 2)"),
        }
    }
}

/// Platform null sink used as the pass 1 output.
#[must_use]
pub fn null_device() -> &'static str {
    if cfg!(windows) { "NUL" } else { "/dev/null" }
}

/// Builder for constructing video filter chains
#[derive(Default)]
pub struct VideoFilterChain {
    filters: Vec<String>,
}

impl VideoFilterChain {
    /// Creates a new empty filter chain
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the halving scale filter when a scale decision was made
    #[must_use]
    pub fn add_scale(mut self, scale: Option<&ScaleDecision>) -> Self {
        if let Some(scale) = scale {
            self.filters.push(scale.filter().to_string());
        }
        self
    }

    /// Adds an fps filter with two decimals of precision
    #[must_use]
    pub fn add_frame_rate(mut self, fps: Option<f64>) -> Self {
        if let Some(fps) = fps {
            self.filters.push(format!("fps=fps={fps:.2}"));
        }
        self
    }

    /// Builds the filter chain into a single filter string
    #[must_use]
    pub fn build(self) -> Option<String> {
        if self.filters.is_empty() {
            None
        } else {
            Some(self.filters.join(","))
        }
    }
}

/// Accumulates ffmpeg arguments in order.
#[derive(Debug, Default, Clone)]
pub struct FfmpegArgs {
    args: Vec<OsString>,
}

impl FfmpegArgs {
    /// Starts a command with the global flags and the input file.
    #[must_use]
    pub fn for_input(input: &Path) -> Self {
        let mut args = Self::default();
        args.push_all(["-hide_banner", "-loglevel", "error", "-y", "-i"]);
        args.push(input);
        args
    }

    pub fn push(&mut self, arg: impl AsRef<OsStr>) -> &mut Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn push_all<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self.push(arg);
        }
        self
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<OsString> {
        self.args
    }

    fn video_options(&mut self, config: &PressorConfig, plan: &EncodingPlan) -> &mut Self {
        self.push_all(["-c:v", VIDEO_CODEC, "-preset", config.preset.as_str()])
            .push("-b:v")
            .push(plan.video_bitrate_bps.to_string())
    }

    fn audio_and_container_options(&mut self, config: &PressorConfig) -> &mut Self {
        self.push_all(["-c:a", AUDIO_CODEC, "-b:a"])
            .push(config.audio_bitrate.to_string())
            .push_all(["-movflags", "+faststart", "-stats"])
    }

    fn filters(&mut self, plan: &EncodingPlan) -> &mut Self {
        if let Some(chain) = plan.filter_chain() {
            self.push("-vf").push(chain);
        }
        self
    }
}

/// Arguments for the optimistic single-pass encode into `output`.
#[must_use]
pub fn single_pass_args(input: &Path, output: &Path, plan: &EncodingPlan, config: &PressorConfig) -> Vec<OsString> {
    let mut args = FfmpegArgs::for_input(input);
    args.video_options(config, plan)
        .audio_and_container_options(config)
        .filters(plan)
        .push(output);
    args.into_vec()
}

/// Arguments for pass 1: statistics only, no audio, output discarded.
#[must_use]
pub fn pass_one_args(input: &Path, pass_log_prefix: &Path, plan: &EncodingPlan, config: &PressorConfig) -> Vec<OsString> {
    let mut args = FfmpegArgs::for_input(input);
    args.video_options(config, plan)
        .push_all(["-pass", "1", "-passlogfile"])
        .push(pass_log_prefix)
        .push("-an")
        .filters(plan)
        .push_all(["-f", "mp4", null_device()]);
    args.into_vec()
}

/// Arguments for pass 2: reads the pass 1 statistics and writes `output`.
#[must_use]
pub fn pass_two_args(
    input: &Path,
    output: &Path,
    pass_log_prefix: &Path,
    plan: &EncodingPlan,
    config: &PressorConfig,
) -> Vec<OsString> {
    let mut args = FfmpegArgs::for_input(input);
    args.video_options(config, plan)
        .push_all(["-pass", "2", "-passlogfile"])
        .push(pass_log_prefix)
        .audio_and_container_options(config)
        .filters(plan)
        .push(output);
    args.into_vec()
}
