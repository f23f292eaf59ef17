// ============================================================================
// shotlist-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Error types and utilities for the CLI
//
// The CLI reuses shotlist-core's error type. Failures that only exist at the
// command-line level (output files, logger setup) are wrapped as
// `CoreError::OperationFailed` with a short context prefix.

// ---- Internal crate imports ----
use shotlist_core::{CoreError, CoreResult};

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
pub trait CliErrorContext<T> {
    /// Add context to an error.
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display;

    /// Add context using a closure (for lazy evaluation).
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: Into<CoreError>,
{
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.map_err(|e| {
            let core_error: CoreError = e.into();
            CoreError::OperationFailed(format!("{}: {}", context, core_error))
        })
    }

    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| {
            let core_error: CoreError = e.into();
            CoreError::OperationFailed(format!("{}: {}", f(), core_error))
        })
    }
}

/// Creates a CLI error with a formatted message.
#[macro_export]
macro_rules! cli_error {
    ($($arg:tt)*) => {
        ::shotlist_core::CoreError::OperationFailed(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn context_prefixes_message() {
        let result: Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        let err = result.cli_context("Failed to write shots.json").unwrap_err();
        match err {
            CoreError::OperationFailed(msg) => {
                assert!(msg.starts_with("Failed to write shots.json: "));
                assert!(msg.contains("denied"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn lazy_context_only_on_error() {
        let ok: Result<u8, io::Error> = Ok(3);
        let value = ok
            .cli_with_context(|| -> String { panic!("context built for Ok") })
            .unwrap();
        assert_eq!(value, 3);
    }

    #[test]
    fn macro_builds_operation_failed() {
        let err = cli_error!("bad {}", 42);
        assert!(matches!(err, CoreError::OperationFailed(msg) if msg == "bad 42"));
    }
}
