// ============================================================================
// discordpressor-core/src/processing/pipeline.rs
// ============================================================================
//
// ENCODE PIPELINE: Per-file state machine and batch loop
//
// Each input goes through the same sequence:
//
//   probe -> single pass at the default bitrate into a temp file
//         -> within budget? keep it (rename to the final name)
//         -> oversized?     drop it, two-pass encode at the budget bitrate
//         -> verify the final output exists and is non-empty
//
// Temporary outputs and pass logs are RAII handles from output_paths, so a
// failure at any step leaves nothing behind except a previous final output.
//
// AI-ASSISTANT-INFO: Main per-file encode orchestration and batch processing

// ---- Internal crate imports ----
use crate::config::PressorConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegJob, FfmpegRunner, FfprobeExecutor};
use crate::processing::commands::{EncodeStage, pass_one_args, pass_two_args, single_pass_args};
use crate::processing::output_paths::{
    OutputPaths, PASS_LOG_NAME, PartialOutputGuard, non_empty_size, promote_temp_output,
};
use crate::processing::planner::{
    EncodingPlan, SizeVerdict, evaluate_size, plan_default_attempt, plan_two_pass,
};
use crate::processing::probe::{MediaProbe, interpret_probe};
use crate::utils::{bytes_to_mb, format_bytes, format_duration};
use crate::{BatchReport, EncodeResult, FailedFile};

// ---- External crate imports ----
use log::{error, info, warn};

// ---- Standard library imports ----
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

// ============================================================================
// SINGLE FILE
// ============================================================================

/// Re-encodes one file so it fits the configured size budget.
///
/// The file is first encoded once at the default bitrate. If that result is
/// within budget it becomes the final output; otherwise a two-pass encode at
/// the computed target bitrate writes the final output directly.
///
/// # Arguments
///
/// * `runner` - Runs ffmpeg invocations
/// * `prober` - Reads stream metadata
/// * `config` - Validated configuration
/// * `input` - The video to re-encode
///
/// # Returns
///
/// * `Ok(EncodeResult)` - The final output and how it was produced
/// * `Err(CoreError)` - The file could not be processed; no temporary files remain
pub fn process_video<R: FfmpegRunner, P: FfprobeExecutor>(
    runner: &R,
    prober: &P,
    config: &PressorConfig,
    input: &Path,
) -> CoreResult<EncodeResult> {
    let start_time = Instant::now();

    if !input.is_file() {
        return Err(CoreError::InputNotFound(input.to_path_buf()));
    }
    let input_size = fs::metadata(input)?.len();
    let paths = OutputPaths::for_input(input)?;

    info!("Processing: {} (Preset: {})", input.display(), config.preset);

    let raw = prober.probe(input)?;
    let probe = interpret_probe(input, &raw)?;
    info!(
        "Resolution: {}x{}, Duration: {:.2}s ({}), Original FPS: {}",
        probe.width,
        probe.height,
        probe.duration_secs,
        format_duration(probe.duration_secs),
        probe
            .frame_rate
            .map_or_else(|| "unknown".to_string(), |fps| format!("{fps:.2}"))
    );

    let budget = config.size_budget();
    let default_plan = plan_default_attempt(&probe, config);

    // ---- Attempt: single pass at the default bitrate ----
    info!(
        "1. Trying default bitrate encoding (single pass, {} kbps)...",
        default_plan.video_bitrate_bps / 1000
    );
    let temp_output = paths.create_temp_output()?;
    run_stage(
        runner,
        EncodeStage::SinglePass,
        single_pass_args(input, &temp_output, &default_plan, config),
        &probe,
    )?;

    let attempt_size = non_empty_size(&temp_output)
        .ok_or_else(|| CoreError::OutputMissingOrEmpty(temp_output.to_path_buf()))?;

    // ---- Evaluate ----
    let final_plan = match evaluate_size(attempt_size, &budget) {
        SizeVerdict::WithinBudget => {
            info!(
                "Default encode is {:.2}MB (<= {} MB). Keeping it.",
                bytes_to_mb(attempt_size),
                config.max_size_mb
            );
            promote_temp_output(temp_output, &paths.final_output)?;
            default_plan
        }
        SizeVerdict::Oversized => {
            info!(
                "Default encode is {:.2}MB (> {} MB). Re-encoding with 2-pass.",
                bytes_to_mb(attempt_size),
                config.max_size_mb
            );
            if let Err(e) = temp_output.close() {
                warn!("Could not remove oversized temp output: {e}");
            }
            let two_pass_plan = plan_two_pass(&default_plan, &probe, config);
            run_two_pass(runner, config, input, &paths, &two_pass_plan, &probe)?;
            two_pass_plan
        }
    };

    // ---- Done ----
    let output_size = verify_final_output(&paths.final_output)?;
    let over_budget = output_size > config.oversize_warning_bytes();
    if over_budget {
        warn!(
            "Final file {} is {:.2}MB, over the {} MB limit.",
            paths.final_output.display(),
            bytes_to_mb(output_size),
            config.max_size_mb
        );
    }

    let elapsed = start_time.elapsed();
    info!(
        "Final file: {} ({}, {:.2}MB) in {}",
        paths.final_output.display(),
        format_bytes(output_size),
        bytes_to_mb(output_size),
        format_duration(elapsed.as_secs_f64())
    );

    Ok(EncodeResult {
        input: input.to_path_buf(),
        output: paths.final_output,
        probe,
        plan: final_plan,
        input_size,
        output_size,
        over_budget,
        elapsed_secs: elapsed.as_secs_f64(),
    })
}

/// Runs pass 1 and pass 2 with a private pass-log directory.
///
/// The directory is removed whether or not the passes succeed. A pass 2
/// failure also removes whatever pass 2 managed to write.
fn run_two_pass<R: FfmpegRunner>(
    runner: &R,
    config: &PressorConfig,
    input: &Path,
    paths: &OutputPaths,
    plan: &EncodingPlan,
    probe: &MediaProbe,
) -> CoreResult<()> {
    let log_dir = paths.create_pass_log_dir()?;
    let prefix = log_dir.path().join(PASS_LOG_NAME);

    let result = (|| -> CoreResult<()> {
        info!("Running 2-pass: Pass 1...");
        run_stage(
            runner,
            EncodeStage::PassOne,
            pass_one_args(input, &prefix, plan, config),
            probe,
        )?;

        info!("Running 2-pass: Pass 2...");
        let guard = PartialOutputGuard::new(&paths.final_output);
        run_stage(
            runner,
            EncodeStage::PassTwo,
            pass_two_args(input, &paths.final_output, &prefix, plan, config),
            probe,
        )?;
        guard.disarm();
        Ok(())
    })();

    if let Err(e) = log_dir.close() {
        warn!("Could not remove pass log directory: {e}");
    }
    result
}

fn run_stage<R: FfmpegRunner>(
    runner: &R,
    stage: EncodeStage,
    args: Vec<OsString>,
    probe: &MediaProbe,
) -> CoreResult<()> {
    let job = FfmpegJob {
        stage,
        args,
        duration_secs: Some(probe.duration_secs),
    };
    runner
        .run(&job)
        .into_result(stage)
        .inspect_err(|e| error!("Error during {stage} encoding: {e}"))
}

/// Size of the final output; an empty file is removed and reported as an error.
fn verify_final_output(path: &Path) -> CoreResult<u64> {
    if let Some(size) = non_empty_size(path) {
        return Ok(size);
    }
    if path.exists() {
        if let Err(e) = fs::remove_file(path) {
            warn!("Could not remove empty output {}: {}", path.display(), e);
        }
    }
    Err(CoreError::OutputMissingOrEmpty(path.to_path_buf()))
}

// ============================================================================
// BATCH
// ============================================================================

/// Processes files in order. A failure is logged and recorded, then the
/// next file is processed.
pub fn process_videos<R: FfmpegRunner, P: FfprobeExecutor>(
    runner: &R,
    prober: &P,
    config: &PressorConfig,
    files: &[PathBuf],
) -> BatchReport {
    let mut report = BatchReport::default();

    for input in files {
        match process_video(runner, prober, config, input) {
            Ok(result) => report.results.push(result),
            Err(e) => {
                error!("Skipping {}: {}", input.display(), e);
                report.failures.push(FailedFile {
                    input: input.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    report
}
