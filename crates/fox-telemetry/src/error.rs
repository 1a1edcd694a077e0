//! Error types for the fox-telemetry crate.

use thiserror::Error;

/// Errors that can occur while exporting or shutting down telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// An exporter could not be constructed.
    #[error("exporter setup failed: {reason}")]
    Setup {
        /// The reason setup failed.
        reason: String,
    },

    /// Spans could not be exported.
    #[error("span export failed: {reason}")]
    Export {
        /// The reason the export failed.
        reason: String,
    },

    /// Flushing or shutting down the exporter failed.
    #[error("exporter shutdown failed: {reason}")]
    Shutdown {
        /// The reason the shutdown failed.
        reason: String,
    },
}

/// Result type for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;
