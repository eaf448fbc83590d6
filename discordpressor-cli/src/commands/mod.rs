//! Command implementations for the CLI.

/// Configuration, batch run and result output.
pub mod compress;
