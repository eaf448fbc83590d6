// discordpressor-core/tests/pipeline_tests.rs

use discordpressor_core::config::PressorConfig;
use discordpressor_core::error::CoreError;
use discordpressor_core::external::mocks::{MockFfmpegRunner, MockFfprobeExecutor, MockResponse};
use discordpressor_core::external::RawProbe;
use discordpressor_core::processing::{PassStrategy, process_video, process_videos};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const WITHIN_BUDGET: u64 = 1_000_000;
const OVERSIZED: u64 = 12_000_000;

// Helper to create a dummy input file with some content
fn create_dummy_file(dir: &Path, filename: &str) -> PathBuf {
    let file_path = dir.join(filename);
    let mut file = File::create(&file_path).expect("Failed to create dummy file");
    file.write_all(b"dummy content").expect("Failed to write dummy content");
    file_path
}

// Everything in `dir` except the given input.
fn leftovers(dir: &Path, input: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read_dir")
        .map(|entry| entry.expect("entry").path())
        .filter(|path| path != input)
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_small_output_is_accepted_after_single_pass() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = create_dummy_file(dir.path(), "clip.mov");

    let prober = MockFfprobeExecutor::new();
    prober.expect_video(&input, 1920, 1080, "60.0", Some("30/1"));
    let runner = MockFfmpegRunner::new();
    runner.expect("_temp_", MockResponse::success().with_output(WITHIN_BUDGET));

    let result = process_video(&runner, &prober, &PressorConfig::default(), &input)?;

    assert_eq!(result.output, dir.path().join("clip_discordpressed.mp4"));
    assert_eq!(result.output_size, WITHIN_BUDGET);
    assert_eq!(result.plan.pass, PassStrategy::Single);
    assert_eq!(result.plan.video_bitrate_bps, 5_000_000);
    assert!(!result.over_budget);
    assert_eq!(leftovers(dir.path(), &input), vec!["clip_discordpressed.mp4"]);

    let calls = runner.received_calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].contains("-c:v libx264 -preset slower -b:v 5000000"));
    assert!(calls[0].contains("-c:a aac -b:a 128000 -movflags +faststart"));
    assert!(!calls[0].contains("-vf"));
    Ok(())
}

#[test]
fn test_oversized_output_triggers_two_pass() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = create_dummy_file(dir.path(), "clip.mkv");

    let prober = MockFfprobeExecutor::new();
    prober.expect_video(&input, 1920, 1080, "60.0", Some("30/1"));
    let runner = MockFfmpegRunner::new();
    runner.expect("_temp_", MockResponse::success().with_output(OVERSIZED));
    runner.expect("-pass 1", MockResponse::success().with_pass_logs());
    runner.expect("-pass 2", MockResponse::success().with_output(9_000_000));

    let result = process_video(&runner, &prober, &PressorConfig::default(), &input)?;

    assert_eq!(result.plan.pass, PassStrategy::TwoPass);
    assert_eq!(result.plan.video_bitrate_bps, 1_130_291);
    assert_eq!(result.output_size, 9_000_000);
    assert_eq!(runner.pending_expectations(), 0);

    let calls = runner.received_calls();
    assert_eq!(calls.len(), 3);
    assert!(calls[1].contains("-b:v 1130291 -pass 1 -passlogfile"));
    assert!(calls[1].contains("-an"));
    assert!(calls[2].contains("-b:v 1130291 -pass 2 -passlogfile"));
    assert!(calls[2].ends_with("clip_discordpressed.mp4"));

    // Temp output and pass logs are gone.
    assert_eq!(leftovers(dir.path(), &input), vec!["clip_discordpressed.mp4"]);
    Ok(())
}

// Runs a two-pass encode whose pass 2 writes `final_size` bytes.
fn run_two_pass_with_final_size(
    dir: &Path,
    final_size: u64,
) -> Result<(PathBuf, discordpressor_core::EncodeResult), CoreError> {
    let input = create_dummy_file(dir, "clip.mkv");
    let prober = MockFfprobeExecutor::new();
    prober.expect_video(&input, 1920, 1080, "60.0", Some("30/1"));
    let runner = MockFfmpegRunner::new();
    runner.expect("_temp_", MockResponse::success().with_output(OVERSIZED));
    runner.expect("-pass 1", MockResponse::success().with_pass_logs());
    runner.expect("-pass 2", MockResponse::success().with_output(final_size));

    let result = process_video(&runner, &prober, &PressorConfig::default(), &input)?;
    Ok((input, result))
}

#[test]
fn test_two_pass_output_past_slack_is_kept_and_flagged() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    // About 9.6 MiB: over the 9 MiB limit plus 0.5 MiB slack.
    let (input, result) = run_two_pass_with_final_size(dir.path(), 10_066_329)?;

    assert_eq!(result.plan.pass, PassStrategy::TwoPass);
    assert_eq!(result.output_size, 10_066_329);
    assert!(result.over_budget);
    assert_eq!(leftovers(dir.path(), &input), vec!["clip_discordpressed.mp4"]);
    Ok(())
}

#[test]
fn test_two_pass_output_within_slack_is_not_flagged() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let (input, result) = run_two_pass_with_final_size(dir.path(), 9_900_000)?;
    assert!(!result.over_budget);
    assert_eq!(leftovers(dir.path(), &input), vec!["clip_discordpressed.mp4"]);

    // Exactly max_bytes + slack is still fine.
    let dir = tempdir()?;
    let (_, result) = run_two_pass_with_final_size(dir.path(), 9_961_472)?;
    assert!(!result.over_budget);
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_single_pass_output_has_default_file_mode() -> Result<(), Box<dyn std::error::Error>> {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir()?;
    let input = create_dummy_file(dir.path(), "clip.mov");
    let default_mode = fs::metadata(&input)?.permissions().mode() & 0o777;

    let prober = MockFfprobeExecutor::new();
    prober.expect_video(&input, 1920, 1080, "60.0", Some("30/1"));
    let runner = MockFfmpegRunner::new();
    runner.expect("_temp_", MockResponse::success().with_output(WITHIN_BUDGET));

    let result = process_video(&runner, &prober, &PressorConfig::default(), &input)?;

    let mode = fs::metadata(&result.output)?.permissions().mode() & 0o777;
    assert_eq!(mode, default_mode, "accepted output mode {mode:o}");
    Ok(())
}

#[test]
fn test_tall_high_frame_rate_video_is_scaled_and_slowed() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = create_dummy_file(dir.path(), "uhd.mp4");

    let prober = MockFfprobeExecutor::new();
    prober.expect_video(&input, 3840, 2160, "10.0", Some("120/1"));
    let runner = MockFfmpegRunner::new();
    runner.expect("_temp_", MockResponse::success().with_output(WITHIN_BUDGET));

    let result = process_video(&runner, &prober, &PressorConfig::default(), &input)?;

    let scale = result.plan.scale.expect("scale decision");
    assert_eq!((scale.width, scale.height), (1920, 1080));
    assert_eq!(result.plan.frame_rate, Some(30.0));
    assert!(runner.received_calls()[0]
        .contains("-vf scale=trunc(iw/2/2)*2:trunc(ih/2/2)*2,fps=fps=30.00"));
    Ok(())
}

#[test]
fn test_pass_one_failure_cleans_up() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = create_dummy_file(dir.path(), "clip.mkv");

    let prober = MockFfprobeExecutor::new();
    prober.expect_video(&input, 1280, 720, "30.0", Some("30/1"));
    let runner = MockFfmpegRunner::new();
    runner.expect("_temp_", MockResponse::success().with_output(OVERSIZED));
    runner.expect("-pass 1", MockResponse::exit_error(1, "Invalid argument").with_pass_logs());

    let err = process_video(&runner, &prober, &PressorConfig::default(), &input).unwrap_err();

    assert!(matches!(err, CoreError::EncoderFailed { ref stage, .. } if stage == "2-pass (pass 1)"));
    assert!(err.to_string().contains("Invalid argument"));
    assert!(leftovers(dir.path(), &input).is_empty());
    Ok(())
}

#[test]
fn test_pass_two_failure_removes_partial_output() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = create_dummy_file(dir.path(), "clip.mkv");

    let prober = MockFfprobeExecutor::new();
    prober.expect_video(&input, 1280, 720, "30.0", None);
    let runner = MockFfmpegRunner::new();
    runner.expect("_temp_", MockResponse::success().with_output(OVERSIZED));
    runner.expect("-pass 1", MockResponse::success().with_pass_logs());
    runner.expect("-pass 2", MockResponse::exit_error(1, "Conversion failed!").with_output(4_096));

    let err = process_video(&runner, &prober, &PressorConfig::default(), &input).unwrap_err();

    assert!(matches!(err, CoreError::EncoderFailed { ref stage, .. } if stage == "2-pass (pass 2)"));
    assert!(leftovers(dir.path(), &input).is_empty());
    Ok(())
}

#[test]
fn test_single_pass_failure_cleans_up() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = create_dummy_file(dir.path(), "clip.mkv");

    let prober = MockFfprobeExecutor::new();
    prober.expect_video(&input, 1280, 720, "30.0", Some("30/1"));
    let runner = MockFfmpegRunner::new();
    runner.expect("_temp_", MockResponse::exit_error(1, "moov atom not found"));

    let err = process_video(&runner, &prober, &PressorConfig::default(), &input).unwrap_err();

    assert!(matches!(err, CoreError::EncoderFailed { ref stage, .. } if stage == "single pass"));
    assert!(leftovers(dir.path(), &input).is_empty());
    Ok(())
}

#[test]
fn test_missing_encoder_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = create_dummy_file(dir.path(), "clip.mkv");

    let prober = MockFfprobeExecutor::new();
    prober.expect_video(&input, 1280, 720, "30.0", Some("30/1"));
    let runner = MockFfmpegRunner::new();
    runner.expect("_temp_", MockResponse::tool_not_found());

    let err = process_video(&runner, &prober, &PressorConfig::default(), &input).unwrap_err();

    assert!(matches!(err, CoreError::EncoderUnavailable { ref tool, .. } if tool == "ffmpeg"));
    assert!(leftovers(dir.path(), &input).is_empty());
    Ok(())
}

#[test]
fn test_empty_two_pass_output_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = create_dummy_file(dir.path(), "clip.mkv");

    let prober = MockFfprobeExecutor::new();
    prober.expect_video(&input, 1280, 720, "30.0", Some("30/1"));
    let runner = MockFfmpegRunner::new();
    runner.expect("_temp_", MockResponse::success().with_output(OVERSIZED));
    runner.expect("-pass 1", MockResponse::success());
    runner.expect("-pass 2", MockResponse::success().with_output(0));

    let err = process_video(&runner, &prober, &PressorConfig::default(), &input).unwrap_err();

    assert!(matches!(err, CoreError::OutputMissingOrEmpty(_)));
    assert!(leftovers(dir.path(), &input).is_empty());
    Ok(())
}

#[test]
fn test_single_pass_without_output_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = create_dummy_file(dir.path(), "clip.mkv");

    let prober = MockFfprobeExecutor::new();
    prober.expect_video(&input, 1280, 720, "30.0", Some("30/1"));
    let runner = MockFfmpegRunner::new();
    runner.expect("_temp_", MockResponse::success());

    let err = process_video(&runner, &prober, &PressorConfig::default(), &input).unwrap_err();

    assert!(matches!(err, CoreError::OutputMissingOrEmpty(_)));
    assert!(leftovers(dir.path(), &input).is_empty());
    Ok(())
}

#[test]
fn test_invalid_probe_skips_encoding() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = create_dummy_file(dir.path(), "clip.mkv");

    let prober = MockFfprobeExecutor::new();
    prober.expect_probe(
        &input,
        Ok(RawProbe {
            width: Some(1920),
            height: Some(1080),
            duration: Some("N/A".to_string()),
            frame_rate: Some("30/1".to_string()),
        }),
    );
    let runner = MockFfmpegRunner::new();

    let err = process_video(&runner, &prober, &PressorConfig::default(), &input).unwrap_err();

    assert!(matches!(err, CoreError::InvalidMetadata { field: "duration", .. }));
    assert!(runner.received_calls().is_empty());
    Ok(())
}

#[test]
fn test_missing_input_is_reported() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("missing.mp4");

    let err = process_video(
        &MockFfmpegRunner::new(),
        &MockFfprobeExecutor::new(),
        &PressorConfig::default(),
        &input,
    )
    .unwrap_err();

    assert!(matches!(err, CoreError::InputNotFound(ref path) if path == &input));
    assert!(err.to_string().starts_with("File not found"));
}

#[test]
fn test_batch_continues_after_failure() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let broken = create_dummy_file(dir.path(), "broken.mkv");
    let good = create_dummy_file(dir.path(), "good.mkv");
    let missing = dir.path().join("missing.mkv");

    let prober = MockFfprobeExecutor::new();
    prober.expect_probe(&broken, Err(CoreError::ProbeParse("no streams".to_string())));
    prober.expect_video(&good, 1280, 720, "20.0", Some("25/1"));
    let runner = MockFfmpegRunner::new();
    runner.expect("good_temp_", MockResponse::success().with_output(WITHIN_BUDGET));

    let files = vec![broken.clone(), missing.clone(), good.clone()];
    let report = process_videos(&runner, &prober, &PressorConfig::default(), &files);

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].input, good);
    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.failures[0].input, broken);
    assert_eq!(report.failures[1].input, missing);
    assert!(report.failures[1].error.contains("File not found"));
    assert_eq!(report.total_output_size(), WITHIN_BUDGET);
    assert!(dir.path().join("good_discordpressed.mp4").exists());
    assert!(!dir.path().join("broken_discordpressed.mp4").exists());
    Ok(())
}

#[test]
fn test_existing_output_is_replaced() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = create_dummy_file(dir.path(), "clip.mp4");
    let final_output = dir.path().join("clip_discordpressed.mp4");
    fs::write(&final_output, b"stale")?;

    let prober = MockFfprobeExecutor::new();
    prober.expect_video(&input, 1280, 720, "20.0", Some("30/1"));
    let runner = MockFfmpegRunner::new();
    runner.expect("_temp_", MockResponse::success().with_output(WITHIN_BUDGET));

    process_video(&runner, &prober, &PressorConfig::default(), &input)?;

    assert_eq!(fs::metadata(&final_output)?.len(), WITHIN_BUDGET);
    assert_eq!(leftovers(dir.path(), &input), vec!["clip_discordpressed.mp4"]);
    Ok(())
}

#[test]
fn test_results_serialize_to_json() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = create_dummy_file(dir.path(), "clip.mkv");

    let prober = MockFfprobeExecutor::new();
    prober.expect_video(&input, 1920, 1080, "60.0", Some("60000/1001"));
    let runner = MockFfmpegRunner::new();
    runner.expect("_temp_", MockResponse::success().with_output(WITHIN_BUDGET));

    let report = process_videos(&runner, &prober, &PressorConfig::default(), &[input]);
    let json = serde_json::to_value(&report)?;

    assert_eq!(json["results"][0]["plan"]["pass"], "Single");
    assert_eq!(json["results"][0]["output_size"], WITHIN_BUDGET);
    assert!(json["results"][0]["plan"]["frame_rate"].as_f64().unwrap() > 29.9);
    assert_eq!(json["failures"].as_array().map(Vec::len), Some(0));
    Ok(())
}
