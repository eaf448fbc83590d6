//! Implementation of the compress run.
//!
//! Builds the configuration from the parsed arguments, runs the batch with the
//! real ffmpeg/ffprobe executors and prints the summary or JSON.

use crate::cli::Cli;
use crate::error::{CliErrorContext, CliResult};
use crate::output;

use discordpressor_core::external::{CrateFfprobeExecutor, FfmpegRunner, FfprobeExecutor, SidecarRunner};
use discordpressor_core::{BatchReport, PressorConfig, PressorConfigBuilder, process_videos};

use log::{debug, info};
use std::io::{self, Write};
use std::time::Instant;

/// Builds and validates the configuration for this run.
pub fn build_config(args: &Cli) -> CliResult<PressorConfig> {
    let config = PressorConfigBuilder::new()
        .max_size_mb(args.max_size_mb)
        .preset(&args.preset)
        .audio_bitrate(args.audio_bitrate)
        .default_video_bitrate(args.default_video_bitrate)
        .build();
    config.validate()?;
    debug!("Using configuration: {config:?}");
    Ok(config)
}

/// Runs the batch with the given executors.
pub fn run_with<R: FfmpegRunner, P: FfprobeExecutor>(
    runner: &R,
    prober: &P,
    config: &PressorConfig,
    args: &Cli,
) -> BatchReport {
    let start_time = Instant::now();
    info!(
        "Compressing {} file(s) to at most {} MB each (preset: {})",
        args.files.len(),
        config.max_size_mb,
        config.preset
    );

    let report = process_videos(runner, prober, config, &args.files);

    info!(
        "Finished {} file(s) in {:.1}s: {} compressed, {} failed",
        args.files.len(),
        start_time.elapsed().as_secs_f64(),
        report.results.len(),
        report.failures.len()
    );
    report
}

/// Entry point for a normal run: real tools, output to stdout.
pub fn run_compress(args: &Cli) -> CliResult<BatchReport> {
    let config = build_config(args)?;
    let report = run_with(&SidecarRunner, &CrateFfprobeExecutor::new(), &config, args);
    write_report(&mut io::stdout().lock(), &report, args)?;
    Ok(report)
}

/// Prints the report as JSON or as the human-readable summary.
pub fn write_report<W: Write>(out: &mut W, report: &BatchReport, args: &Cli) -> CliResult<()> {
    if args.json {
        let json = serde_json::to_string_pretty(report).cli_context("Failed to render results as JSON")?;
        writeln!(out, "{json}").cli_context("Failed to write results")?;
    } else {
        output::print_summary(out, report, &args.preset, args.max_size_mb)
            .cli_context("Failed to write summary")?;
    }
    out.flush().cli_context("Failed to write results")
}
