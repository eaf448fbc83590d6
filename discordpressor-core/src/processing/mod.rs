//! Core video processing logic and orchestration.
//!
//! The submodules follow the order a file moves through: probe
//! interpretation, planning, ffmpeg argument construction, output handling
//! and finally the pipeline that ties them together.

/// Validated media properties from raw probe data
pub mod probe;

/// Scale, frame-rate and bitrate decisions
pub mod planner;

/// ffmpeg argument lists for each encode stage
pub mod commands;

/// Output naming and temporary artifacts
pub mod output_paths;

/// Per-file state machine and batch loop
pub mod pipeline;

pub use pipeline::{process_video, process_videos};
pub use planner::{EncodingPlan, PassStrategy, SizeBudget};
pub use probe::MediaProbe;
