//! Progress reporting for running ffmpeg processes.
//!
//! Progress is reported through the `log` facade (target
//! `discordpressor::progress`) so it ends up wherever the CLI routes logs.

pub mod ffmpeg_handler;

pub use ffmpeg_handler::FfmpegProgressHandler;
