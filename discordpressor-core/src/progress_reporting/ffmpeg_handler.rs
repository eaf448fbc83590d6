//! `FFmpeg` progress handler
//!
//! Consumes the event stream of a running ffmpeg process, logs progress at
//! 10% steps and keeps the error lines so a failed run can report them.

use crate::processing::commands::EncodeStage;
use crate::utils::{format_duration, parse_ffmpeg_time};
use ffmpeg_sidecar::event::{FfmpegEvent, FfmpegProgress, LogLevel as FfmpegLogLevel};
use std::collections::VecDeque;
use std::time::Instant;

/// Number of diagnostic lines kept for error reports.
const MAX_DIAGNOSTIC_LINES: usize = 40;

/// Handler for `FFmpeg` events of one invocation
pub struct FfmpegProgressHandler {
    stage: EncodeStage,
    duration: Option<f64>,
    start_time: Instant,
    last_logged_percent_threshold: i32,
    diagnostics: VecDeque<String>,
}

impl FfmpegProgressHandler {
    /// Creates a new `FFmpeg` progress handler
    #[must_use]
    pub fn new(stage: EncodeStage, duration: Option<f64>) -> Self {
        Self {
            stage,
            duration,
            start_time: Instant::now(),
            last_logged_percent_threshold: -1,
            diagnostics: VecDeque::new(),
        }
    }

    /// Handles an `FFmpeg` event
    pub fn handle_event(&mut self, event: FfmpegEvent) {
        match event {
            FfmpegEvent::Progress(progress) => self.handle_progress(&progress),
            FfmpegEvent::Log(level, message) => self.handle_log(&level, &message),
            FfmpegEvent::Error(error) => {
                log::debug!(target: "ffmpeg_log", "{error}");
                self.push_diagnostic(error);
            }
            _ => {}
        }
    }

    /// Error output collected so far, oldest line first
    #[must_use]
    pub fn diagnostics(&self) -> String {
        self.diagnostics
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn handle_progress(&mut self, progress: &FfmpegProgress) {
        let Some(total) = self.duration.filter(|d| *d > 0.0) else {
            return;
        };
        let current_secs = parse_ffmpeg_time(&progress.time).unwrap_or(0.0);
        let percent = (current_secs / total * 100.0).clamp(0.0, 100.0);
        let threshold = (percent as i32 / 10) * 10;

        if threshold > self.last_logged_percent_threshold {
            log::info!(
                target: "discordpressor::progress",
                "{}: {:.0}% | Time: {} / {} | Speed: {:.2}x | Elapsed: {}",
                self.stage,
                percent,
                format_duration(current_secs),
                format_duration(total),
                progress.speed,
                format_duration(self.start_time.elapsed().as_secs_f64())
            );
            self.last_logged_percent_threshold = threshold;
        }
    }

    fn handle_log(&mut self, level: &FfmpegLogLevel, message: &str) {
        match level {
            FfmpegLogLevel::Fatal | FfmpegLogLevel::Error => {
                log::debug!(target: "ffmpeg_log", "{message}");
                self.push_diagnostic(message.to_string());
            }
            FfmpegLogLevel::Warning => log::debug!(target: "ffmpeg_log", "{message}"),
            // With `-loglevel error` ffmpeg prints no level tags, so untagged
            // lines are most likely errors too.
            FfmpegLogLevel::Unknown => {
                log::trace!(target: "ffmpeg_log", "{message}");
                self.push_diagnostic(message.to_string());
            }
            _ => log::trace!(target: "ffmpeg_log", "{message}"),
        }
    }

    fn push_diagnostic(&mut self, line: String) {
        let line = line.trim_end().to_string();
        if line.is_empty() {
            return;
        }
        if self.diagnostics.len() == MAX_DIAGNOSTIC_LINES {
            self.diagnostics.pop_front();
        }
        self.diagnostics.push_back(line);
    }
}
