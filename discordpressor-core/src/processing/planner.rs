// ============================================================================
// discordpressor-core/src/processing/planner.rs
// ============================================================================
//
// SIZE-TARGET PLANNER: Scale, Frame Rate and Bitrate Decisions
//
// Pure functions that turn a MediaProbe plus a PressorConfig into an
// EncodingPlan. Nothing here touches the filesystem or spawns processes.
//
// KEY COMPONENTS:
// - decide_scale: halves videos taller than the configured height
// - decide_frame_rate: tiered down-sampling (>100 fps -> /4, >50 fps -> /2)
// - target_video_bitrate: bitrate that fills the size budget, floored at 100 kbps
// - evaluate_size: the exact "accept if <= budget" threshold
//
// AI-ASSISTANT-INFO: Size-targeting bitrate negotiation for discordpressor

// ---- Internal crate imports ----
use crate::config::{MIN_VIDEO_BITRATE, PressorConfig};
use crate::processing::commands::VideoFilterChain;
use crate::processing::probe::MediaProbe;

// ---- External crate imports ----
use log::{info, warn};
use serde::Serialize;

/// ffmpeg filter that halves both dimensions, rounding each down to an even number.
pub const HALVE_SCALE_FILTER: &str = "scale=trunc(iw/2/2)*2:trunc(ih/2/2)*2";

/// Frame rates above this are divided by 4.
pub const QUARTER_FPS_THRESHOLD: f64 = 100.0;

/// Frame rates above this (and not above the quarter threshold) are divided by 2.
pub const HALF_FPS_THRESHOLD: f64 = 50.0;

// ============================================================================
// DATA TYPES
// ============================================================================

/// Byte and bit limits derived from the megabyte ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeBudget {
    /// Largest accepted output size in bytes (MiB-based)
    pub max_bytes: u64,
    /// The same limit in bits, used by the bitrate formula
    pub max_bits: u64,
    /// Audio bitrate reserved out of the budget
    pub audio_bitrate_bps: u64,
}

impl SizeBudget {
    #[must_use]
    pub fn from_megabytes(max_size_mb: u64, audio_bitrate_bps: u64) -> Self {
        let max_bytes = max_size_mb.saturating_mul(1024 * 1024);
        Self {
            max_bytes,
            max_bits: max_bytes.saturating_mul(8),
            audio_bitrate_bps,
        }
    }
}

/// Halved output dimensions, both even.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScaleDecision {
    pub width: u32,
    pub height: u32,
}

impl ScaleDecision {
    /// The ffmpeg filter expression producing these dimensions.
    #[must_use]
    pub fn filter(&self) -> &'static str {
        HALVE_SCALE_FILTER
    }
}

/// How the encode is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PassStrategy {
    /// One pass at the configured default bitrate.
    Single,
    /// Statistics pass followed by a budget-targeted pass.
    TwoPass,
}

/// Everything ffmpeg needs to know about one encode attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EncodingPlan {
    pub scale: Option<ScaleDecision>,
    pub frame_rate: Option<f64>,
    pub video_bitrate_bps: u64,
    pub pass: PassStrategy,
}

impl EncodingPlan {
    /// Comma-joined `-vf` value, or `None` when no filter applies.
    #[must_use]
    pub fn filter_chain(&self) -> Option<String> {
        VideoFilterChain::new()
            .add_scale(self.scale.as_ref())
            .add_frame_rate(self.frame_rate)
            .build()
    }
}

/// Outcome of comparing an encoded file against the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeVerdict {
    WithinBudget,
    Oversized,
}

// ============================================================================
// DECISIONS
// ============================================================================

/// Halves the video when it is taller than `max_height`.
///
/// Each dimension becomes `trunc(x / 2 / 2) * 2`, which keeps it even for
/// the encoder's chroma subsampling.
#[must_use]
pub fn decide_scale(width: u32, height: u32, max_height: u32) -> Option<ScaleDecision> {
    (height > max_height).then(|| ScaleDecision {
        width: width / 2 / 2 * 2,
        height: height / 2 / 2 * 2,
    })
}

/// Tiered frame-rate reduction. Returns `None` when no fps filter should be added.
///
/// * `> 100` fps -> original / 4
/// * `> 50` fps -> original / 2
/// * otherwise, or unknown -> `None`
#[must_use]
pub fn decide_frame_rate(original_fps: Option<f64>) -> Option<f64> {
    let fps = original_fps.filter(|fps| fps.is_finite() && *fps > 0.0)?;
    if fps > QUARTER_FPS_THRESHOLD {
        Some(fps / 4.0)
    } else if fps > HALF_FPS_THRESHOLD {
        Some(fps / 2.0)
    } else {
        None
    }
}

/// Computes the video bitrate that, together with the audio, fills `budget`
/// over `duration_secs`.
///
/// `max(100_000, floor(max_bits / duration) - audio_bitrate)`. A non-positive
/// or NaN duration falls back to `fallback_bitrate` instead of dividing.
/// The result never drops below [`MIN_VIDEO_BITRATE`], even when that means
/// the budget will be exceeded.
#[must_use]
pub fn target_video_bitrate(duration_secs: f64, budget: &SizeBudget, fallback_bitrate: u64) -> u64 {
    if duration_secs.is_nan() || duration_secs <= 0.0 {
        warn!(
            "Video duration ({duration_secs}) is zero or negative. Using default bitrate {fallback_bitrate} bps."
        );
        return fallback_bitrate.max(MIN_VIDEO_BITRATE);
    }

    let per_second = (budget.max_bits as f64 / duration_secs).floor();
    let video = per_second - budget.audio_bitrate_bps as f64;
    let (bitrate, floored) = apply_bitrate_floor(video);
    if floored {
        warn!(
            "Calculated video bitrate ({video:.0} bps) is below the {MIN_VIDEO_BITRATE} bps floor. \
             Using the floor; quality will be poor and the output may exceed {} bytes.",
            budget.max_bytes
        );
    }
    bitrate
}

/// Clamps `video_bps` to [`MIN_VIDEO_BITRATE`]; the flag is set when the floor applied.
fn apply_bitrate_floor(video_bps: f64) -> (u64, bool) {
    if video_bps < MIN_VIDEO_BITRATE as f64 {
        (MIN_VIDEO_BITRATE, true)
    } else {
        (video_bps as u64, false)
    }
}

/// Accepts the file iff `size_bytes <= budget.max_bytes`. No tolerance band.
#[must_use]
pub fn evaluate_size(size_bytes: u64, budget: &SizeBudget) -> SizeVerdict {
    if size_bytes <= budget.max_bytes {
        SizeVerdict::WithinBudget
    } else {
        SizeVerdict::Oversized
    }
}

// ============================================================================
// PLANS
// ============================================================================

/// Plan for the optimistic single-pass attempt at the default bitrate.
#[must_use]
pub fn plan_default_attempt(probe: &MediaProbe, config: &PressorConfig) -> EncodingPlan {
    let scale = decide_scale(probe.width, probe.height, config.max_height_until_halve);
    if let Some(scale) = &scale {
        info!(
            "Scaling: Video height {}px > {}px. Applying filter: {} ({}x{})",
            probe.height,
            config.max_height_until_halve,
            scale.filter(),
            scale.width,
            scale.height
        );
    }

    let frame_rate = decide_frame_rate(probe.frame_rate);
    if let Some(original) = probe.frame_rate {
        match frame_rate {
            Some(target) => info!("Framerate: Original {original:.2}fps. Adjusting to {target:.2}fps."),
            None => info!("Framerate: Original {original:.2}fps. No change needed."),
        }
    }

    EncodingPlan {
        scale,
        frame_rate,
        video_bitrate_bps: config.default_video_bitrate.max(MIN_VIDEO_BITRATE),
        pass: PassStrategy::Single,
    }
}

/// Re-plans an oversized attempt as a two-pass encode targeting the budget.
///
/// Scale and frame-rate decisions are carried over unchanged.
#[must_use]
pub fn plan_two_pass(previous: &EncodingPlan, probe: &MediaProbe, config: &PressorConfig) -> EncodingPlan {
    let video_bitrate_bps = target_video_bitrate(
        probe.duration_secs,
        &config.size_budget(),
        config.default_video_bitrate,
    );
    info!(
        "Targeting video bitrate: {:.0} kbps for 2-pass.",
        video_bitrate_bps as f64 / 1000.0
    );

    EncodingPlan {
        video_bitrate_bps,
        pass: PassStrategy::TwoPass,
        ..*previous
    }
}
