// ============================================================================
// discordpressor-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Core Error Types
//
// Every failure in this crate is scoped to a single input file. The pipeline
// logs the error, cleans up, and moves on to the next file in the batch.
// Only configuration errors are meant to stop a run.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors produced while probing, planning or encoding a single file.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("File not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("'{0}' command not found. Please ensure it is installed and in your PATH.")]
    ProbeUnavailable(String),

    #[error("ffprobe failed for {} ({status}): {stderr}", path.display())]
    ProbeFailed {
        path: PathBuf,
        status: String,
        stderr: String,
    },

    #[error("Failed to parse ffprobe output: {0}")]
    ProbeParse(String),

    #[error("Missing {field} in probe output for {}", path.display())]
    MissingMetadata { path: PathBuf, field: &'static str },

    #[error("Invalid {field} '{value}' in probe output for {}", path.display())]
    InvalidMetadata {
        path: PathBuf,
        field: &'static str,
        value: String,
    },

    #[error("Video duration ({duration}s) for {} is not positive", path.display())]
    NonPositiveDuration { path: PathBuf, duration: f64 },

    #[error("'{tool}' command not found during {stage}. Please ensure it is installed and in your PATH.")]
    EncoderUnavailable { tool: String, stage: String },

    #[error("ffmpeg {stage} failed ({exit}): {diagnostics}")]
    EncoderFailed {
        stage: String,
        exit: String,
        diagnostics: String,
    },

    #[error("Output file {} was not created or is empty", .0.display())]
    OutputMissingOrEmpty(PathBuf),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("{0}")]
    OperationFailed(String),
}

/// Result type for discordpressor-core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Describes how a process ended, e.g. "exit code 1" or "terminated by signal".
pub fn describe_exit(status: Option<ExitStatus>) -> String {
    match status.and_then(|s| s.code()) {
        Some(code) => format!("exit code {code}"),
        None if status.is_some() => "terminated by signal".to_string(),
        None => "no exit status".to_string(),
    }
}
