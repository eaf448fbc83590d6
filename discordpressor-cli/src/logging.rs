// ============================================================================
// discordpressor-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: env_logger initialization
//
// The core library logs through the `log` facade; this module routes those
// records to stderr with a compact, colored format.
//
// USAGE:
// - default: info
// - -v / --verbose: debug
// - RUST_LOG overrides both, e.g. RUST_LOG=ffmpeg_log=debug for raw ffmpeg output
//
// AI-ASSISTANT-INFO: Logger initialization for the CLI

use console::style;
use log::{Level, LevelFilter};
use std::io::Write;

/// Maps the verbosity flag to the default log level.
pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Initialize the global logger. Safe to call more than once; later calls are ignored.
pub fn init(verbose: bool) {
    let level = level_for(verbose);
    let result = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format(|buf, record| {
            let level = match record.level() {
                Level::Error => style("ERROR").red().bold(),
                Level::Warn => style("WARN ").yellow(),
                Level::Info => style("INFO ").green(),
                Level::Debug => style("DEBUG").blue(),
                Level::Trace => style("TRACE").magenta(),
            };
            writeln!(buf, "{} {}", level.for_stderr(), record.args())
        })
        .try_init();

    if result.is_ok() {
        log::debug!("Logger initialized with level: {level}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for(false), LevelFilter::Info);
        assert_eq!(level_for(true), LevelFilter::Debug);
    }
}
