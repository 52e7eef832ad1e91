//! Error taxonomy for the Linear dispatch layer.
//!
//! Every tool invocation ends in exactly one of these outcomes. Validation
//! errors are raised before any backend call; transport and upstream errors
//! after it. Nothing here is retried.

use thiserror::Error;

pub type LinearResult<T> = Result<T, LinearError>;

/// Failure reported by the backend transport itself (network, protocol,
/// GraphQL `errors` array). The message is echoed to the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        TransportError(message.into())
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum LinearError {
    #[error("Invalid arguments: {0}")]
    Validation(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("operation failed: {0}")]
    Transport(#[from] TransportError),

    /// The backend answered with `success: false`.
    #[error("Failed to {action}")]
    Upstream { action: String },

    #[error("{step} step failed: {source}")]
    Composite {
        step: String,
        #[source]
        source: Box<LinearError>,
    },

    /// A variable map did not match the operation's declared variables.
    #[error("Variable binding error for {operation}: {message}")]
    Binding { operation: String, message: String },

    /// The backend answered, but not in the shape the chosen operation declares.
    #[error("Unexpected result: {0}")]
    Unexpected(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl LinearError {
    pub fn validation(message: impl Into<String>) -> Self {
        LinearError::Validation(message.into())
    }

    pub fn upstream(action: impl Into<String>) -> Self {
        LinearError::Upstream {
            action: action.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, LinearError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_are_prefixed() {
        let err = LinearError::from(TransportError::new("connection reset"));
        assert_eq!(err.to_string(), "operation failed: connection reset");
    }

    #[test]
    fn upstream_failures_name_the_action() {
        assert_eq!(
            LinearError::upstream("update issue").to_string(),
            "Failed to update issue"
        );
    }

    #[test]
    fn composite_failures_name_the_step() {
        let err = LinearError::Composite {
            step: "create issues".to_string(),
            source: Box::new(LinearError::upstream("create issues")),
        };
        assert_eq!(
            err.to_string(),
            "create issues step failed: Failed to create issues"
        );
    }
}
