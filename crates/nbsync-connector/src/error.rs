//! Connector error types
//!
//! Error definitions with transient/permanent classification. Transient errors
//! are left for the next sync cycle; permanent ones need an operator.

use thiserror::Error;

/// Error that can occur while talking to an inventory system.
#[derive(Debug, Error)]
pub enum ConnectorError {
    // Transport errors (transient)
    /// Failed to establish a connection (refused, DNS failure, TLS).
    #[error("connection failed: {message}")]
    ConnectionFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Request did not complete within the configured timeout.
    #[error("request timeout after {timeout_secs} seconds")]
    ConnectionTimeout { timeout_secs: u64 },

    /// Remote system answered with 5xx or 429.
    #[error("target system unavailable: {message}")]
    TargetUnavailable { message: String },

    /// Network error while the request was in flight.
    #[error("network error: {message}")]
    NetworkError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Authentication errors (permanent)
    /// API token rejected.
    #[error("authentication failed: invalid credentials")]
    AuthenticationFailed,

    /// Token accepted but lacks permission for the call.
    #[error("authorization failed: insufficient permissions for {operation}")]
    AuthorizationFailed { operation: String },

    // Configuration errors (permanent)
    /// Connector configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    // Response errors
    /// Object not found in the remote system.
    #[error("object not found: {identifier}")]
    ObjectNotFound { identifier: String },

    /// Response body is missing expected fields or has the wrong shape.
    #[error("unexpected response from {endpoint}: {message}")]
    UnexpectedResponse { endpoint: String, message: String },

    /// API reported a failure in its response envelope.
    #[error("API error from {endpoint}: {message}")]
    ApiError { endpoint: String, message: String },
}

impl ConnectorError {
    /// Check if this error is transient.
    ///
    /// Nothing is retried inside a cycle; transient errors simply clear up by
    /// the next one.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ConnectorError::ConnectionFailed { .. }
                | ConnectorError::ConnectionTimeout { .. }
                | ConnectorError::TargetUnavailable { .. }
                | ConnectorError::NetworkError { .. }
        )
    }

    /// Check if this error is permanent and waiting won't help.
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConnectorError::ConnectionFailed { .. } => "CONNECTION_FAILED",
            ConnectorError::ConnectionTimeout { .. } => "CONNECTION_TIMEOUT",
            ConnectorError::TargetUnavailable { .. } => "TARGET_UNAVAILABLE",
            ConnectorError::NetworkError { .. } => "NETWORK_ERROR",
            ConnectorError::AuthenticationFailed => "AUTH_FAILED",
            ConnectorError::AuthorizationFailed { .. } => "AUTHORIZATION_FAILED",
            ConnectorError::InvalidConfiguration { .. } => "INVALID_CONFIG",
            ConnectorError::ObjectNotFound { .. } => "OBJECT_NOT_FOUND",
            ConnectorError::UnexpectedResponse { .. } => "UNEXPECTED_RESPONSE",
            ConnectorError::ApiError { .. } => "API_ERROR",
        }
    }

    // Convenience constructors

    /// Create a connection failed error.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        ConnectorError::ConnectionFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection failed error with source.
    pub fn connection_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConnectorError::ConnectionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a network error with source.
    pub fn network_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConnectorError::NetworkError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an unexpected-shape error for an endpoint.
    pub fn unexpected(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        ConnectorError::UnexpectedResponse {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }
}

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        let transient_errors = vec![
            ConnectorError::connection_failed("refused"),
            ConnectorError::ConnectionTimeout { timeout_secs: 30 },
            ConnectorError::TargetUnavailable {
                message: "502".to_string(),
            },
            ConnectorError::NetworkError {
                message: "reset".to_string(),
                source: None,
            },
        ];

        for err in transient_errors {
            assert!(
                err.is_transient(),
                "Expected {} to be transient",
                err.error_code()
            );
            assert!(!err.is_permanent());
        }
    }

    #[test]
    fn test_permanent_errors() {
        let permanent_errors = vec![
            ConnectorError::AuthenticationFailed,
            ConnectorError::AuthorizationFailed {
                operation: "PATCH /devices/1".to_string(),
            },
            ConnectorError::unexpected("/devices", "missing field `devices`"),
            ConnectorError::ApiError {
                endpoint: "/devices".to_string(),
                message: "Device already exists".to_string(),
            },
            ConnectorError::ObjectNotFound {
                identifier: "/devices/9".to_string(),
            },
        ];

        for err in permanent_errors {
            assert!(
                err.is_permanent(),
                "Expected {} to be permanent",
                err.error_code()
            );
        }
    }

    #[test]
    fn test_error_display() {
        let err = ConnectorError::ConnectionTimeout { timeout_secs: 30 };
        assert_eq!(err.to_string(), "request timeout after 30 seconds");

        let err = ConnectorError::unexpected("/dcim/devices/", "missing field `results`");
        assert_eq!(
            err.to_string(),
            "unexpected response from /dcim/devices/: missing field `results`"
        );
        assert_eq!(err.error_code(), "UNEXPECTED_RESPONSE");
    }

    #[test]
    fn test_error_with_source() {
        let source_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = ConnectorError::connection_failed_with_source("connect", source_err);

        assert!(err.is_transient());
        if let ConnectorError::ConnectionFailed { source, .. } = &err {
            assert!(source.is_some());
        } else {
            panic!("Expected ConnectionFailed variant");
        }
    }
}
