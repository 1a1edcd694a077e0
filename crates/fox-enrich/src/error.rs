//! Error types for the fox-enrich crate.

use thiserror::Error;

/// Errors that can occur in the enrichment pipeline.
///
/// None of these escape [`crate::FoxEnrichAction::execute`]; they are turned
/// into failed results or per-alert error entries.
#[derive(Debug, Error)]
pub enum FoxError {
    /// The inbound payload has the wrong shape.
    #[error("invalid payload: {reason}")]
    InvalidPayload {
        /// The reason the payload was rejected.
        reason: String,
    },

    /// A single alert record could not be parsed.
    #[error("invalid alert: {reason}")]
    InvalidAlert {
        /// The reason the alert was rejected.
        reason: String,
    },

    /// Invalid configuration value.
    #[error("invalid configuration: {reason}")]
    Config {
        /// The reason the configuration is invalid.
        reason: String,
    },

    /// A ProjectContext authority could not be queried.
    #[error("context source '{source_name}' failed: {reason}")]
    ContextSource {
        /// The source that failed.
        source_name: String,
        /// The reason the query failed.
        reason: String,
    },

    /// An action with the same name is already registered.
    #[error("action already registered: {name}")]
    DuplicateAction {
        /// The duplicated action name.
        name: String,
    },

    /// Reading a file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for FoxError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for FoxError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for FoxError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config {
            reason: err.to_string(),
        }
    }
}

/// Result type for enrichment operations.
pub type Result<T> = std::result::Result<T, FoxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_invalid_payload() {
        let err = FoxError::InvalidPayload {
            reason: "not an object".to_string(),
        };
        assert_eq!(err.to_string(), "invalid payload: not an object");
    }

    #[test]
    fn error_display_invalid_alert() {
        let err = FoxError::InvalidAlert {
            reason: "labels must be an object".to_string(),
        };
        assert_eq!(err.to_string(), "invalid alert: labels must be an object");
    }

    #[test]
    fn error_display_config() {
        let err = FoxError::Config {
            reason: "FOX_USE_KUBERNETES must be true or false".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid configuration: FOX_USE_KUBERNETES must be true or false"
        );
    }

    #[test]
    fn error_display_context_source() {
        let err = FoxError::ContextSource {
            source_name: "kubernetes".to_string(),
            reason: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "context source 'kubernetes' failed: connection refused"
        );
    }

    #[test]
    fn error_display_duplicate_action() {
        let err = FoxError::DuplicateAction {
            name: "log".to_string(),
        };
        assert_eq!(err.to_string(), "action already registered: log");
    }

    #[test]
    fn error_from_serde_json() {
        let json_err = serde_json::from_str::<String>("invalid json");
        assert!(json_err.is_err());
        let err: FoxError = json_err.unwrap_err().into();
        assert!(matches!(err, FoxError::SerializationError(_)));
    }

    #[test]
    fn error_from_toml() {
        let toml_err = toml::from_str::<toml::Value>("= broken");
        assert!(toml_err.is_err());
        let err: FoxError = toml_err.unwrap_err().into();
        assert!(matches!(err, FoxError::Config { .. }));
    }
}
