//! Broker client error types
//!
//! Error definitions with transient/permanent classification. The
//! provisioning engine never retries; the classification is exposed so
//! callers can decide.

use thiserror::Error;

/// Error that can occur while talking to the broker control plane.
#[derive(Debug, Error)]
pub enum ClientError {
    // Connection errors (usually transient)
    /// Failed to establish a connection to the control plane.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The call did not complete within the client's timeout.
    #[error("request timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The control plane is temporarily unavailable.
    #[error("control plane unavailable: {message}")]
    Unavailable { message: String },

    // Rejections (permanent)
    /// The control plane rejected the request.
    #[error("request rejected (status {status}): {message}")]
    Rejected { status: u16, message: String },

    /// Entity already exists (broker-side create conflict).
    #[error("entity already exists: {path}")]
    EntityAlreadyExists { path: String },

    /// Entity does not exist (broker-side delete target missing).
    #[error("entity not found: {path}")]
    EntityNotFound { path: String },

    /// Malformed data returned by or sent to the control plane.
    #[error("invalid data: {message}")]
    InvalidData { message: String },
}

impl ClientError {
    /// Check if this error is transient and the call could succeed later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ClientError::ConnectionFailed { .. }
                | ClientError::Timeout { .. }
                | ClientError::Unavailable { .. }
        )
    }

    /// Check if this error is permanent and retrying won't help.
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::ConnectionFailed { .. } => "CONNECTION_FAILED",
            ClientError::Timeout { .. } => "TIMEOUT",
            ClientError::Unavailable { .. } => "UNAVAILABLE",
            ClientError::Rejected { .. } => "REJECTED",
            ClientError::EntityAlreadyExists { .. } => "ENTITY_EXISTS",
            ClientError::EntityNotFound { .. } => "ENTITY_NOT_FOUND",
            ClientError::InvalidData { .. } => "INVALID_DATA",
        }
    }

    /// Create a connection failed error.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        ClientError::ConnectionFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection failed error with source.
    pub fn connection_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ClientError::ConnectionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        ClientError::Unavailable {
            message: message.into(),
        }
    }

    /// Create an invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        ClientError::InvalidData {
            message: message.into(),
        }
    }
}

/// Result type for broker client calls.
pub type ClientResult<T> = Result<T, ClientError>;
