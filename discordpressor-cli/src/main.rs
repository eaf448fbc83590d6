// discordpressor-cli/src/main.rs
//
// Entry point for the discordpressor binary.
//
// Parses arguments, initializes logging and runs the batch. Per-file failures
// are reported in the summary and do not change the exit code; only an
// invalid configuration (or a failure to write the results) exits non-zero.

use clap::Parser;
use discordpressor_cli::{Cli, logging, run_compress};
use std::process;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run_compress(&cli) {
        log::error!("{e}");
        process::exit(1);
    }
}
