// discordpressor-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// Compiled for unit tests and when the "test-mocks" feature is enabled.
#![cfg(any(test, feature = "test-mocks"))]

use super::{FfmpegJob, FfmpegOutcome, FfmpegRunner, FfprobeExecutor, RawProbe};
use crate::error::{CoreError, CoreResult};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// What the mock does when an expectation matches.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// Outcome reported back to the caller.
    pub outcome: FfmpegOutcome,
    /// When set, the last argument is treated as the output path and a file of this size is written.
    pub output_bytes: Option<u64>,
    /// When set, x264-style pass log files are written next to the `-passlogfile` prefix.
    pub write_pass_logs: bool,
}

impl MockResponse {
    pub fn success() -> Self {
        Self {
            outcome: FfmpegOutcome::Success,
            output_bytes: None,
            write_pass_logs: false,
        }
    }

    pub fn exit_error(code: i32, diagnostics: &str) -> Self {
        Self {
            outcome: FfmpegOutcome::NonZeroExit {
                exit: format!("exit code {code}"),
                diagnostics: diagnostics.to_string(),
            },
            output_bytes: None,
            write_pass_logs: false,
        }
    }

    pub fn tool_not_found() -> Self {
        Self {
            outcome: FfmpegOutcome::ToolNotFound,
            output_bytes: None,
            write_pass_logs: false,
        }
    }

    pub fn with_output(mut self, bytes: u64) -> Self {
        self.output_bytes = Some(bytes);
        self
    }

    pub fn with_pass_logs(mut self) -> Self {
        self.write_pass_logs = true;
        self
    }
}

struct MockFfmpegExpectation {
    pattern: String,
    response: MockResponse,
}

/// Mock implementation of FfmpegRunner supporting multiple expectations.
///
/// Each expectation is matched by a substring of the space-joined argument
/// list and consumed when it matches. An unmatched call panics.
#[derive(Clone, Default)]
pub struct MockFfmpegRunner {
    expectations: Rc<RefCell<Vec<MockFfmpegExpectation>>>,
    received_calls: Rc<RefCell<Vec<String>>>,
}

impl MockFfmpegRunner {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn expect(&self, pattern: &str, response: MockResponse) {
        self.expectations.borrow_mut().push(MockFfmpegExpectation {
            pattern: pattern.to_string(),
            response,
        });
    }

    /// Command lines received so far, in call order.
    pub fn received_calls(&self) -> Vec<String> {
        self.received_calls.borrow().clone()
    }

    /// Number of expectations that were never matched.
    pub fn pending_expectations(&self) -> usize {
        self.expectations.borrow().len()
    }
}

impl FfmpegRunner for MockFfmpegRunner {
    fn run(&self, job: &FfmpegJob) -> FfmpegOutcome {
        let command_line = job.command_line();
        self.received_calls.borrow_mut().push(command_line.clone());

        let response = {
            let mut expectations = self.expectations.borrow_mut();
            let index = expectations
                .iter()
                .position(|exp| command_line.contains(&exp.pattern))
                .unwrap_or_else(|| {
                    panic!("MockFfmpegRunner: No expectation found for command: {command_line}")
                });
            let expectation = expectations.remove(index);
            log::info!(
                "MockFfmpegRunner: Matched expectation with pattern '{}'",
                expectation.pattern
            );
            expectation.response
        };

        if response.write_pass_logs {
            if let Some(prefix) = arg_after(job, "-passlogfile") {
                for suffix in ["-0.log", "-0.log.mbtree"] {
                    let mut name = prefix.clone().into_os_string();
                    name.push(suffix);
                    if let Err(e) = fs::write(&name, b"pass log") {
                        log::error!("MockFfmpegRunner failed to write pass log {:?}: {}", name, e);
                    }
                }
            }
        }

        if let (Some(bytes), Some(output)) = (response.output_bytes, job.args.last()) {
            let output_path = Path::new(output);
            match File::create(output_path).and_then(|f| f.set_len(bytes)) {
                Ok(()) => log::info!("MockFfmpegRunner created dummy output file: {:?}", output_path),
                Err(e) => log::error!("MockFfmpegRunner failed to create dummy output {:?}: {}", output_path, e),
            }
        }

        response.outcome
    }
}

fn arg_after(job: &FfmpegJob, flag: &str) -> Option<PathBuf> {
    let index = job.args.iter().position(|arg| arg == flag)?;
    job.args.get(index + 1).map(PathBuf::from)
}

/// Mock implementation of FfprobeExecutor.
///
/// Results are consumed on use, so each expectation answers one probe call.
#[derive(Clone, Default)]
pub struct MockFfprobeExecutor {
    results: Rc<RefCell<HashMap<PathBuf, CoreResult<RawProbe>>>>,
}

impl MockFfprobeExecutor {
    pub fn new() -> Self {
        Default::default()
    }

    /// Add an expected result for a specific input path.
    pub fn expect_probe(&self, input_path: &Path, result: CoreResult<RawProbe>) {
        self.results
            .borrow_mut()
            .insert(input_path.to_path_buf(), result);
    }

    /// Shorthand for a successful probe of a video stream.
    pub fn expect_video(&self, input_path: &Path, width: i64, height: i64, duration: &str, frame_rate: Option<&str>) {
        self.expect_probe(
            input_path,
            Ok(RawProbe {
                width: Some(width),
                height: Some(height),
                duration: Some(duration.to_string()),
                frame_rate: frame_rate.map(str::to_string),
            }),
        );
    }
}

impl FfprobeExecutor for MockFfprobeExecutor {
    fn probe(&self, input_path: &Path) -> CoreResult<RawProbe> {
        log::info!("MockFfprobeExecutor::probe called for: {}", input_path.display());
        self.results
            .borrow_mut()
            .remove(input_path)
            .unwrap_or_else(|| {
                Err(CoreError::ProbeParse(format!(
                    "MockFfprobeExecutor: No expectation set for path {}",
                    input_path.display()
                )))
            })
    }
}
