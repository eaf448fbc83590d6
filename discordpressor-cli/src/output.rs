//! Console output for the end-of-run summary.
//!
//! Logs go to stderr; the summary (or JSON) goes to stdout so it can be piped.

use console::style;
use discordpressor_core::utils::{bytes_to_mb, calculate_size_reduction};
use discordpressor_core::{BatchReport, PassStrategy, format_bytes, format_duration};
use std::fmt::Display;
use std::io::{self, Write};

/// Print a section heading with a rule above and below
pub fn print_section<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    let line = "-".repeat(40);
    writeln!(out, "\n{}", style(&line).blue())?;
    writeln!(out, " {}", style(text).bold())?;
    writeln!(out, "{}", style(&line).blue())
}

/// Print a label/value line; `highlight` makes the value stand out
pub fn print_status<W: Write, T: Display>(out: &mut W, label: &str, value: T, highlight: bool) -> io::Result<()> {
    let value = value.to_string();
    if highlight {
        writeln!(out, "  {:<14} {}", style(format!("{label}:")).cyan(), style(value).green().bold())
    } else {
        writeln!(out, "  {:<14} {}", style(format!("{label}:")).cyan(), value)
    }
}

fn pass_label(pass: PassStrategy) -> &'static str {
    match pass {
        PassStrategy::Single => "single pass",
        PassStrategy::TwoPass => "2-pass",
    }
}

/// Print per-file results and totals.
pub fn print_summary<W: Write>(out: &mut W, report: &BatchReport, preset: &str, max_size_mb: u64) -> io::Result<()> {
    for result in &report.results {
        print_section(out, &result.output.display().to_string())?;
        print_status(out, "Input", result.input.display(), false)?;
        print_status(out, "Encode", pass_label(result.plan.pass), false)?;
        print_status(out, "Video bitrate", format!("{} kbps", result.plan.video_bitrate_bps / 1000), false)?;
        print_status(out, "Input size", format_bytes(result.input_size), false)?;
        print_status(out, "Output size", format_bytes(result.output_size), false)?;
        print_status(out, "Time", format_duration(result.elapsed_secs), false)?;
        if result.over_budget {
            print_status(
                out,
                "Warning",
                style(format!("{:.2}MB is over the {max_size_mb} MB limit", bytes_to_mb(result.output_size))).yellow(),
                false,
            )?;
        } else {
            print_status(
                out,
                "Reduced by",
                format!("{}%", calculate_size_reduction(result.input_size, result.output_size)),
                true,
            )?;
        }
    }

    if !report.failures.is_empty() {
        print_section(out, "Failed")?;
        for failure in &report.failures {
            writeln!(out, "  {} {}: {}", style("x").red().bold(), failure.input.display(), failure.error)?;
        }
    }

    print_section(out, "Summary")?;
    print_status(out, "Compressed", report.results.len(), true)?;
    print_status(out, "Failed", report.failures.len(), false)?;
    print_status(out, "Total input", format_bytes(report.total_input_size()), false)?;
    print_status(out, "Total output", format_bytes(report.total_output_size()), false)?;
    writeln!(out, "\nAll conversions finished. Used preset: {preset}")
}
