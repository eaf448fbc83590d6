// ============================================================================
// discordpressor-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg and ffprobe
//
// This module encapsulates the two subprocess collaborators of the pipeline.
// Both sit behind traits so the pipeline can be driven by fakes in tests.
//
// KEY COMPONENTS:
// - FfprobeExecutor / CrateFfprobeExecutor: raw media metadata via the ffprobe crate
// - FfmpegRunner / SidecarRunner: encoder invocations via ffmpeg-sidecar
// - mocks: test doubles (unit tests and the "test-mocks" feature)
//
// AI-ASSISTANT-INFO: External tool interactions and abstractions for ffmpeg/ffprobe

// ============================================================================
// SUBMODULES
// ============================================================================

/// Contains traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Contains traits and implementations for executing ffprobe commands
pub mod ffprobe_executor;

/// Test doubles for both executors
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

// ----- FFmpeg Execution -----
pub use ffmpeg_executor::{FfmpegJob, FfmpegOutcome, FfmpegRunner, SidecarRunner};

// ----- FFprobe Execution -----
pub use ffprobe_executor::{CrateFfprobeExecutor, FfprobeExecutor, RawProbe};
