// discordpressor-cli/src/cli.rs
//
// Defines the command-line argument structure using clap.

use clap::Parser;
use discordpressor_core::config::{
    DEFAULT_AUDIO_BITRATE, DEFAULT_ENCODER_PRESET, DEFAULT_MAX_SIZE_MB, DEFAULT_VIDEO_BITRATE,
    X264_PRESETS,
};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Discordpressor: re-encode videos to fit under a size limit",
    long_about = "Re-encodes each video with ffmpeg (libx264/aac) so the result fits under \
                  the size limit. A single pass at a default bitrate is tried first; if the \
                  result is too large the file is re-encoded with a two-pass encode at a \
                  bitrate computed from its duration. Output is written next to each input \
                  as <name>_discordpressed.mp4."
)]
pub struct Cli {
    /// Video files to compress
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Size limit for each output file, in megabytes (1 MB = 1024 * 1024 bytes)
    #[arg(
        long,
        value_name = "MB",
        env = "DISCORDPRESSOR_MAX_SIZE_MB",
        default_value_t = DEFAULT_MAX_SIZE_MB,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub max_size_mb: u64,

    /// x264 encoder preset (slower presets compress better)
    #[arg(
        long,
        value_name = "PRESET",
        env = "DISCORDPRESSOR_PRESET",
        default_value = DEFAULT_ENCODER_PRESET,
        value_parser = clap::builder::PossibleValuesParser::new(X264_PRESETS)
    )]
    pub preset: String,

    /// Audio bitrate in bits per second
    #[arg(long, value_name = "BPS", default_value_t = DEFAULT_AUDIO_BITRATE)]
    pub audio_bitrate: u64,

    /// Video bitrate of the first, single-pass attempt in bits per second
    #[arg(long, value_name = "BPS", default_value_t = DEFAULT_VIDEO_BITRATE)]
    pub default_video_bitrate: u64,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the results as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["discordpressor", "a.mov", "b.mkv"]).unwrap();
        assert_eq!(cli.files, vec![PathBuf::from("a.mov"), PathBuf::from("b.mkv")]);
        assert_eq!(cli.max_size_mb, 9);
        assert_eq!(cli.preset, "slower");
        assert_eq!(cli.audio_bitrate, 128_000);
        assert_eq!(cli.default_video_bitrate, 5_000_000);
        assert!(!cli.verbose);
        assert!(!cli.json);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "discordpressor",
            "--max-size-mb",
            "25",
            "--preset",
            "veryfast",
            "-v",
            "--json",
            "clip.mp4",
        ])
        .unwrap();
        assert_eq!(cli.max_size_mb, 25);
        assert_eq!(cli.preset, "veryfast");
        assert!(cli.verbose);
        assert!(cli.json);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Cli::try_parse_from(["discordpressor"]).is_err());
        assert!(Cli::try_parse_from(["discordpressor", "--preset", "turbo", "a.mp4"]).is_err());
        assert!(Cli::try_parse_from(["discordpressor", "--max-size-mb", "0", "a.mp4"]).is_err());
    }
}
