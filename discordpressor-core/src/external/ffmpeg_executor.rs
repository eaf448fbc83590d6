// ============================================================================
// discordpressor-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg Process Management and Abstraction
//
// This module runs one ffmpeg invocation to completion and reports how it
// ended. The pipeline only ever sees an FfmpegOutcome, so tests can swap in
// a fake runner without spawning real processes.
//
// KEY COMPONENTS:
// - FfmpegJob: argument list plus the stage it belongs to
// - FfmpegOutcome: Success / ToolNotFound / NonZeroExit
// - FfmpegRunner: trait for anything that can execute a job
// - SidecarRunner: concrete implementation using ffmpeg-sidecar
//
// AI-ASSISTANT-INFO: FFmpeg process management and execution abstraction

use crate::error::{CoreError, CoreResult, describe_exit};
use crate::processing::commands::EncodeStage;
use crate::progress_reporting::FfmpegProgressHandler;
use ffmpeg_sidecar::command::FfmpegCommand;
use std::ffi::OsString;
use std::io;

// --- FFmpeg Execution Abstraction ---

/// One ffmpeg invocation.
#[derive(Debug, Clone)]
pub struct FfmpegJob {
    /// Which step of the encode this is, used in logs and errors
    pub stage: EncodeStage,
    /// Arguments passed to ffmpeg (without the program name)
    pub args: Vec<OsString>,
    /// Duration of the input, used to turn timestamps into progress
    pub duration_secs: Option<f64>,
}

impl FfmpegJob {
    /// Arguments joined by spaces, lossily converted. Meant for logs and test matching.
    #[must_use]
    pub fn command_line(&self) -> String {
        self.args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How an ffmpeg invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FfmpegOutcome {
    /// Exited with status 0.
    Success,
    /// The ffmpeg binary could not be found.
    ToolNotFound,
    /// Exited unsuccessfully (or could not be started or waited on).
    NonZeroExit { exit: String, diagnostics: String },
}

impl FfmpegOutcome {
    /// Converts the outcome into a result for `stage`.
    pub fn into_result(self, stage: EncodeStage) -> CoreResult<()> {
        match self {
            Self::Success => Ok(()),
            Self::ToolNotFound => Err(CoreError::EncoderUnavailable {
                tool: "ffmpeg".to_string(),
                stage: stage.to_string(),
            }),
            Self::NonZeroExit { exit, diagnostics } => Err(CoreError::EncoderFailed {
                stage: stage.to_string(),
                exit,
                diagnostics,
            }),
        }
    }
}

/// Trait representing something that can run an ffmpeg job to completion.
pub trait FfmpegRunner {
    /// Runs the job synchronously and reports how it ended.
    fn run(&self, job: &FfmpegJob) -> FfmpegOutcome;
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Concrete implementation of `FfmpegRunner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone, Default)]
pub struct SidecarRunner;

impl FfmpegRunner for SidecarRunner {
    fn run(&self, job: &FfmpegJob) -> FfmpegOutcome {
        let mut cmd = FfmpegCommand::new();
        cmd.args(&job.args);
        log::debug!("Running {} command: ffmpeg {}", job.stage, job.command_line());

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::error!("ffmpeg not found while starting {}", job.stage);
                return FfmpegOutcome::ToolNotFound;
            }
            Err(e) => {
                return FfmpegOutcome::NonZeroExit {
                    exit: "failed to start".to_string(),
                    diagnostics: e.to_string(),
                };
            }
        };

        // The event stream must be drained, otherwise ffmpeg can block on a full stderr pipe.
        let mut handler = FfmpegProgressHandler::new(job.stage, job.duration_secs);
        match child.iter() {
            Ok(events) => {
                for event in events {
                    handler.handle_event(event);
                }
            }
            Err(e) => log::warn!("Failed to read ffmpeg events for {}: {}", job.stage, e),
        }

        match child.wait() {
            Ok(status) if status.success() => FfmpegOutcome::Success,
            Ok(status) => FfmpegOutcome::NonZeroExit {
                exit: describe_exit(Some(status)),
                diagnostics: handler.diagnostics(),
            },
            Err(e) => FfmpegOutcome::NonZeroExit {
                exit: describe_exit(None),
                diagnostics: format!("failed to wait for ffmpeg: {e}"),
            },
        }
    }
}
