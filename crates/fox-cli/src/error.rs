//! CLI error types.

use fox_enrich::FoxError;
use fox_telemetry::TelemetryError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The payload could not be read or parsed.
    #[error("invalid input: {0}")]
    Input(String),

    /// The action ran and reported failure.
    #[error("action failed: {0}")]
    ActionFailed(String),

    /// The payload was rejected by validation.
    #[error("validation failed: {0}")]
    Invalid(String),

    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),

    /// The worker thread could not be joined.
    #[error("runtime error: {0}")]
    Runtime(String),

    /// Telemetry setup or flush failed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// Pipeline error.
    #[error(transparent)]
    Enrich(#[from] FoxError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Returns the process exit code for this error.
    ///
    /// Failed or rejected payloads exit with 1; setup problems with 2.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::ActionFailed(_) | Self::Invalid(_) => 1,
            _ => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_error_display_config() {
        let err = CliError::Config("bad ttl".into());
        assert_eq!(err.to_string(), "configuration error: bad ttl");
    }

    #[test]
    fn cli_error_from_fox_error_is_transparent() {
        let err = CliError::from(FoxError::InvalidPayload {
            reason: "empty".into(),
        });
        assert_eq!(err.to_string(), "invalid payload: empty");
    }

    #[test]
    fn cli_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err = CliError::from(io_err);
        assert!(matches!(cli_err, CliError::Io(_)));
    }

    #[test]
    fn exit_codes() {
        assert_eq!(CliError::ActionFailed("x".into()).exit_code(), 1);
        assert_eq!(CliError::Invalid("x".into()).exit_code(), 1);
        assert_eq!(CliError::Input("x".into()).exit_code(), 2);
    }
}
