// ============================================================================
// shotlist-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error types for shot detection
//
// KEY COMPONENTS:
// - CoreError: every failure the library can report
// - CoreResult: result alias used across the crate
// - Helper constructors for external command failures

use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors produced by shot detection and its collaborators.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid engine selection, engine parameters or settings.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Required external dependency not found: {0}")]
    DependencyNotFound(String),

    #[error("Failed to start {0}: {1}")]
    CommandStart(String, io::Error),

    #[error("{0} failed with status {1}: {2}")]
    CommandFailed(String, ExitStatus, String),

    #[error("Failed waiting for {0}: {1}")]
    CommandWait(String, io::Error),

    #[error("ffprobe output parse error: {0}")]
    FfprobeParse(String),

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// The video could not be opened or decoded.
    #[error("Cannot open video source {0}: {1}")]
    SourceOpen(String, String),

    #[error("{0} timed out after {1} seconds")]
    Timeout(String, u64),

    /// Cut-probability model failed to load or run.
    #[error("Model error: {0}")]
    Model(String),

    #[error("{0}")]
    OperationFailed(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::JsonParse(err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type CoreResult<T> = Result<T, CoreError>;

pub fn command_start_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

pub fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed(cmd.into(), status, stderr.into())
}

pub fn command_wait_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}

/// Shorthand for a configuration error with a formatted message.
pub(crate) fn config_error(msg: impl Into<String>) -> CoreError {
    CoreError::Config(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_message() {
        let err = config_error("Unknown shot detection engine: bogus");
        assert_eq!(
            err.to_string(),
            "Configuration error: Unknown shot detection engine: bogus"
        );
    }

    #[test]
    fn json_error_converts() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: CoreError = parse.unwrap_err().into();
        assert!(matches!(err, CoreError::JsonParse(_)));
    }
}
