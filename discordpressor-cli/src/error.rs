// ============================================================================
// discordpressor-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Error types and utilities for the CLI
//
// CLI operations return the core error type. Failures that originate in the
// CLI itself (rendering JSON, writing to stdout) are wrapped with context.
//
// KEY COMPONENTS:
// - CliResult: Type alias for CLI operations
// - CliErrorContext: adds a message to foreign errors
//
// AI-ASSISTANT-INFO: CLI error handling utilities

// ---- Internal crate imports ----
use discordpressor_core::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::fmt;

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = CoreResult<T>;

// ============================================================================
// ERROR CONVERSION UTILITIES
// ============================================================================

/// Extension trait for adding context to errors in the CLI.
///
/// Similar to anyhow's `context`, but produces a `CoreError::OperationFailed`.
pub trait CliErrorContext<T> {
    /// Add context to an error.
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display;
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: std::error::Error,
{
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.map_err(|e| CoreError::OperationFailed(format!("{context}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_cli_context_wraps_message() {
        let failed: Result<(), io::Error> = Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
        let err = failed.cli_context("Failed to write results").unwrap_err();
        assert!(matches!(err, CoreError::OperationFailed(_)));
        assert_eq!(err.to_string(), "Failed to write results: pipe closed");
    }

    #[test]
    fn test_cli_context_does_not_label_json_errors_as_io() {
        let failed = serde_json::from_str::<serde_json::Value>("{");
        let err = failed.cli_context("Failed to render results as JSON").unwrap_err();
        assert!(err.to_string().starts_with("Failed to render results as JSON: "));
        assert!(!err.to_string().starts_with("I/O error"));
    }
}
