//! Error types for the Courier messaging client.

use serde::Serialize;
use thiserror::Error;

/// A shared error type for the entire Courier client.
///
/// The first four variants form the taxonomy a message backend can produce;
/// the rest cover local failures (configuration, files, session misuse).
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CourierError {
    /// Input rejected before or by the server (empty content, bad type, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown target, message or profile
    #[error("Not found: {entity} '{id}'")]
    NotFound { entity: String, id: String },

    /// The viewer lacks permission for the operation
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// Network failure or unexpected server response
    #[error("Transport error: {0}")]
    Transport(String),

    /// Operation not allowed in the current session state
    #[error("Cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CourierError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates an Authorization error
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization(message.into())
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates an InvalidState error
    pub fn invalid_state(operation: &'static str, state: impl ToString) -> Self {
        Self::InvalidState {
            operation,
            state: state.to_string(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Authorization(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }

    /// Whether retrying the same request later could succeed.
    ///
    /// Only transport failures qualify; the other server-side errors are
    /// answers, not outages.
    pub fn is_transient(&self) -> bool {
        self.is_transport()
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for CourierError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for CourierError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for CourierError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for CourierError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, CourierError>`.
pub type Result<T> = std::result::Result<T, CourierError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = CourierError::not_found("target", "engineering");
        assert_eq!(err.to_string(), "Not found: target 'engineering'");

        let err = CourierError::invalid_state("send", "Loading");
        assert_eq!(err.to_string(), "Cannot send while session is Loading");
    }

    #[test]
    fn test_only_transport_is_transient() {
        assert!(CourierError::transport("connection reset").is_transient());
        assert!(!CourierError::validation("empty").is_transient());
        assert!(!CourierError::authorization("denied").is_transient());
        assert!(!CourierError::not_found("message", "1").is_transient());
    }

    #[test]
    fn test_io_error_conversion_keeps_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err: CourierError = io.into();
        match err {
            CourierError::Io { message } => assert!(message.contains("PermissionDenied")),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
