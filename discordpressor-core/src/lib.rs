//! Core library for re-encoding videos under a fixed file-size budget using ffmpeg and ffprobe.
//!
//! Each file is encoded once at a default bitrate; if the result is too large
//! it is re-encoded with a two-pass encode whose bitrate is derived from the
//! duration and the size limit. Tall videos are halved and high frame rates
//! reduced along the way.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use discordpressor_core::{PressorConfigBuilder, process_videos};
//! use discordpressor_core::external::{CrateFfprobeExecutor, SidecarRunner};
//! use std::path::PathBuf;
//!
//! let config = PressorConfigBuilder::new()
//!     .max_size_mb(25)
//!     .preset("medium")
//!     .build();
//! config.validate().unwrap();
//!
//! let files = vec![PathBuf::from("/path/to/clip.mov")];
//! let report = process_videos(&SidecarRunner, &CrateFfprobeExecutor::new(), &config, &files);
//! for result in &report.results {
//!     println!("{} -> {}", result.input.display(), result.output.display());
//! }
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod processing;
pub mod progress_reporting;
pub mod utils;

// Re-exports for public API
pub use config::{PressorConfig, PressorConfigBuilder};
pub use error::{CoreError, CoreResult};
pub use processing::{EncodingPlan, MediaProbe, PassStrategy, process_video, process_videos};
pub use utils::{format_bytes, format_duration, parse_ffmpeg_time};

use serde::Serialize;
use std::path::PathBuf;

/// Result of an encoding operation, containing statistics about the process.
///
/// Returned by `process_video` for each successfully processed file.
#[derive(Debug, Clone, Serialize)]
pub struct EncodeResult {
    pub input: PathBuf,
    pub output: PathBuf,
    pub probe: MediaProbe,
    /// The plan that produced the final output
    pub plan: EncodingPlan,
    pub input_size: u64,
    pub output_size: u64,
    /// Output exceeds the limit plus the configured slack
    pub over_budget: bool,
    pub elapsed_secs: f64,
}

/// A file that could not be processed.
#[derive(Debug, Clone, Serialize)]
pub struct FailedFile {
    pub input: PathBuf,
    pub error: String,
}

/// Outcome of a batch, in input order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub results: Vec<EncodeResult>,
    pub failures: Vec<FailedFile>,
}

impl BatchReport {
    #[must_use]
    pub fn total_input_size(&self) -> u64 {
        self.results.iter().map(|r| r.input_size).sum()
    }

    #[must_use]
    pub fn total_output_size(&self) -> u64 {
        self.results.iter().map(|r| r.output_size).sum()
    }
}
