//! Probe interpretation.
//!
//! Turns the loosely typed metadata reported by ffprobe ([`RawProbe`]) into a
//! validated [`MediaProbe`]. Width, height and duration are required; the
//! frame rate is best effort and only ever downgrades to "unknown".

use crate::error::{CoreError, CoreResult};
use crate::external::RawProbe;

use log::warn;
use serde::Serialize;

use std::fmt;
use std::path::Path;

/// Validated media properties of one input file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MediaProbe {
    pub width: u32,
    pub height: u32,
    pub duration_secs: f64,
    /// `None` when the probe reported no usable frame rate
    pub frame_rate: Option<f64>,
}

/// Why a frame rate string was ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameRateIssue {
    ZeroDenominator,
    NonPositive(f64),
    Unparseable,
}

impl fmt::Display for FrameRateIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDenominator => write!(f, "denominator is 0"),
            Self::NonPositive(fps) => write!(f, "parsed value {fps} is not positive"),
            Self::Unparseable => write!(f, "could not be parsed"),
        }
    }
}

/// Parses an ffprobe frame rate, either "N/D" (e.g. "30000/1001") or a plain number.
pub fn parse_frame_rate(raw: &str) -> Result<f64, FrameRateIssue> {
    let raw = raw.trim();
    let fps = match raw.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().map_err(|_| FrameRateIssue::Unparseable)?;
            let den: f64 = den.trim().parse().map_err(|_| FrameRateIssue::Unparseable)?;
            if den == 0.0 {
                return Err(FrameRateIssue::ZeroDenominator);
            }
            num / den
        }
        None => raw.parse().map_err(|_| FrameRateIssue::Unparseable)?,
    };

    if fps.is_finite() && fps > 0.0 {
        Ok(fps)
    } else if fps.is_nan() {
        Err(FrameRateIssue::Unparseable)
    } else {
        Err(FrameRateIssue::NonPositive(fps))
    }
}

/// Validates raw probe output for `path`.
///
/// # Errors
///
/// * `MissingMetadata` - width, height or duration absent
/// * `InvalidMetadata` - a dimension is not positive or the duration is not a number
/// * `NonPositiveDuration` - the duration parsed but is zero, negative or infinite
pub fn interpret_probe(path: &Path, raw: &RawProbe) -> CoreResult<MediaProbe> {
    let width = positive_dimension(path, "width", raw.width)?;
    let height = positive_dimension(path, "height", raw.height)?;

    let duration_str = raw.duration.as_deref().ok_or_else(|| CoreError::MissingMetadata {
        path: path.to_path_buf(),
        field: "duration",
    })?;
    let duration_secs: f64 =
        duration_str
            .trim()
            .parse()
            .map_err(|_| CoreError::InvalidMetadata {
                path: path.to_path_buf(),
                field: "duration",
                value: duration_str.to_string(),
            })?;
    if duration_secs.is_nan() {
        return Err(CoreError::InvalidMetadata {
            path: path.to_path_buf(),
            field: "duration",
            value: duration_str.to_string(),
        });
    }
    if duration_secs <= 0.0 || duration_secs.is_infinite() {
        return Err(CoreError::NonPositiveDuration {
            path: path.to_path_buf(),
            duration: duration_secs,
        });
    }

    let frame_rate = match raw.frame_rate.as_deref() {
        Some(rate) => match parse_frame_rate(rate) {
            Ok(fps) => Some(fps),
            Err(issue) => {
                warn!(
                    "Frame rate '{}' for {} {}. Framerate will not be changed.",
                    rate,
                    path.display(),
                    issue
                );
                None
            }
        },
        None => {
            warn!(
                "Frame rate not found in video stream info for {}. Framerate will not be changed.",
                path.display()
            );
            None
        }
    };

    Ok(MediaProbe {
        width,
        height,
        duration_secs,
        frame_rate,
    })
}

fn positive_dimension(path: &Path, field: &'static str, value: Option<i64>) -> CoreResult<u32> {
    let value = value.ok_or_else(|| CoreError::MissingMetadata {
        path: path.to_path_buf(),
        field,
    })?;
    u32::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| CoreError::InvalidMetadata {
            path: path.to_path_buf(),
            field,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(width: Option<i64>, height: Option<i64>, duration: Option<&str>, fps: Option<&str>) -> RawProbe {
        RawProbe {
            width,
            height,
            duration: duration.map(str::to_string),
            frame_rate: fps.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_frame_rate_forms() {
        assert_eq!(parse_frame_rate("30/1"), Ok(30.0));
        assert_eq!(parse_frame_rate("60"), Ok(60.0));
        assert_eq!(parse_frame_rate(" 25 "), Ok(25.0));
        let ntsc = parse_frame_rate("30000/1001").unwrap();
        assert!((ntsc - 29.97).abs() < 0.01);
    }

    #[test]
    fn test_parse_frame_rate_rejections() {
        assert_eq!(parse_frame_rate("0/0"), Err(FrameRateIssue::ZeroDenominator));
        assert_eq!(parse_frame_rate("30/0"), Err(FrameRateIssue::ZeroDenominator));
        assert_eq!(parse_frame_rate("0/1"), Err(FrameRateIssue::NonPositive(0.0)));
        assert_eq!(parse_frame_rate("-24"), Err(FrameRateIssue::NonPositive(-24.0)));
        assert_eq!(parse_frame_rate("abc"), Err(FrameRateIssue::Unparseable));
        assert_eq!(parse_frame_rate("1/2/3"), Err(FrameRateIssue::Unparseable));
        assert_eq!(parse_frame_rate(""), Err(FrameRateIssue::Unparseable));
    }

    #[test]
    fn test_interpret_complete_probe() {
        let probe = interpret_probe(
            Path::new("clip.mp4"),
            &raw(Some(1920), Some(1080), Some("60.5"), Some("60/1")),
        )
        .unwrap();
        assert_eq!(
            probe,
            MediaProbe {
                width: 1920,
                height: 1080,
                duration_secs: 60.5,
                frame_rate: Some(60.0),
            }
        );
    }

    #[test]
    fn test_bad_frame_rate_is_not_an_error() {
        let probe = interpret_probe(
            Path::new("clip.mp4"),
            &raw(Some(640), Some(480), Some("10"), Some("0/0")),
        )
        .unwrap();
        assert_eq!(probe.frame_rate, None);

        let probe = interpret_probe(Path::new("clip.mp4"), &raw(Some(640), Some(480), Some("10"), None)).unwrap();
        assert_eq!(probe.frame_rate, None);
    }

    #[test]
    fn test_missing_fields_are_named() {
        let path = Path::new("clip.mp4");
        let cases = [
            (raw(None, Some(480), Some("10"), None), "width"),
            (raw(Some(640), None, Some("10"), None), "height"),
            (raw(Some(640), Some(480), None, None), "duration"),
        ];
        for (probe, expected) in cases {
            match interpret_probe(path, &probe) {
                Err(CoreError::MissingMetadata { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected MissingMetadata({expected}), got {other:?}"),
            }
        }
    }

    #[test]
    fn test_invalid_fields_are_named() {
        let path = Path::new("clip.mp4");
        match interpret_probe(path, &raw(Some(0), Some(480), Some("10"), None)) {
            Err(CoreError::InvalidMetadata { field, value, .. }) => {
                assert_eq!(field, "width");
                assert_eq!(value, "0");
            }
            other => panic!("unexpected: {other:?}"),
        }
        match interpret_probe(path, &raw(Some(640), Some(480), Some("N/A"), None)) {
            Err(CoreError::InvalidMetadata { field, .. }) => assert_eq!(field, "duration"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_non_positive_duration_rejected() {
        let path = Path::new("clip.mp4");
        for duration in ["0", "0.000", "-3.5"] {
            assert!(matches!(
                interpret_probe(path, &raw(Some(640), Some(480), Some(duration), None)),
                Err(CoreError::NonPositiveDuration { .. })
            ));
        }
    }
}
