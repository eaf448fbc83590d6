//! FFprobe integration for media analysis
//!
//! This module runs ffprobe (through the `ffprobe` crate) and extracts the
//! handful of fields the planner needs: width, height and frame rate of the
//! first video stream plus the container duration. The values are returned
//! unvalidated; see `processing::probe` for interpretation.
use crate::error::{CoreError, CoreResult, describe_exit};
use ffprobe::{FfProbeError, ffprobe};
use std::io;
use std::path::Path;

/// Unvalidated metadata as reported by ffprobe.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RawProbe {
    /// Width of the first video stream
    pub width: Option<i64>,
    /// Height of the first video stream
    pub height: Option<i64>,
    /// Container duration in seconds, as ffprobe prints it
    pub duration: Option<String>,
    /// `r_frame_rate` of the first video stream, e.g. "30000/1001"
    pub frame_rate: Option<String>,
}

/// Trait representing something that can probe a media file.
pub trait FfprobeExecutor {
    /// Probes `input_path` and returns its raw video metadata.
    fn probe(&self, input_path: &Path) -> CoreResult<RawProbe>;
}

/// Concrete implementation of `FfprobeExecutor` using the `ffprobe` crate.
#[derive(Debug, Clone, Default)]
pub struct CrateFfprobeExecutor;

impl CrateFfprobeExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl FfprobeExecutor for CrateFfprobeExecutor {
    fn probe(&self, input_path: &Path) -> CoreResult<RawProbe> {
        log::debug!(
            "Running ffprobe (via crate) for video properties on: {}",
            input_path.display()
        );
        let metadata = ffprobe(input_path).map_err(|err| {
            log::debug!("ffprobe failed on {}: {:?}", input_path.display(), err);
            map_ffprobe_error(err, input_path)
        })?;

        let video_stream = metadata
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| CoreError::MissingMetadata {
                path: input_path.to_path_buf(),
                field: "video stream",
            })?;

        let frame_rate = Some(video_stream.r_frame_rate.trim().to_string())
            .filter(|rate| !rate.is_empty());

        Ok(RawProbe {
            width: video_stream.width,
            height: video_stream.height,
            duration: metadata.format.duration.clone(),
            frame_rate,
        })
    }
}

fn map_ffprobe_error(err: FfProbeError, input_path: &Path) -> CoreError {
    match err {
        FfProbeError::Io(io_err) if io_err.kind() == io::ErrorKind::NotFound => {
            CoreError::ProbeUnavailable("ffprobe".to_string())
        }
        FfProbeError::Io(io_err) => CoreError::Io(io_err),
        FfProbeError::Status(output) => CoreError::ProbeFailed {
            path: input_path.to_path_buf(),
            status: describe_exit(Some(output.status)),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        },
        FfProbeError::Deserialize(err) => CoreError::ProbeParse(format!(
            "ffprobe output for {} could not be decoded: {err}",
            input_path.display()
        )),
        #[allow(unreachable_patterns)]
        _ => CoreError::ProbeParse(format!(
            "Unknown ffprobe error for {}: {err:?}",
            input_path.display()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_maps_to_unavailable() {
        let err = map_ffprobe_error(
            FfProbeError::Io(io::Error::new(io::ErrorKind::NotFound, "no such file")),
            Path::new("clip.mp4"),
        );
        assert!(matches!(err, CoreError::ProbeUnavailable(tool) if tool == "ffprobe"));
    }

    #[test]
    fn test_other_io_errors_stay_io() {
        let err = map_ffprobe_error(
            FfProbeError::Io(io::Error::new(io::ErrorKind::PermissionDenied, "denied")),
            Path::new("clip.mp4"),
        );
        assert!(matches!(err, CoreError::Io(_)));
    }
}
