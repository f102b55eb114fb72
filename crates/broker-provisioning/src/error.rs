//! Provisioning error types
//!
//! Every failure of the reconciliation engine is returned to the caller as a
//! typed variant. Nothing is retried.

use broker_client::error::ClientError;
use broker_client::types::EntityKind;
use thiserror::Error;

/// Error that can occur while provisioning or decommissioning an entity.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    /// Malformed input, caught before any broker call.
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// The broker could not be reached or rejected the call.
    #[error("transport error: {0}")]
    Transport(#[from] ClientError),

    /// The entity already exists under its own kind.
    #[error("{kind} '{path}' already exists")]
    AlreadyExists { kind: EntityKind, path: String },

    /// The path is already taken by the sibling kind in the shared
    /// queue/topic namespace.
    #[error("cannot create {requested} '{path}': a {existing} with that path already exists")]
    CrossKindCollision {
        path: String,
        requested: EntityKind,
        existing: EntityKind,
    },

    /// The parent topic of a subscription does not exist.
    #[error("topic '{topic}' not found")]
    ParentNotFound { topic: String },

    /// The entity to delete does not exist.
    #[error("{kind} '{path}' not found")]
    NotFound { kind: EntityKind, path: String },

    /// Deleting would discard messages that have not been drained.
    #[error("{kind} '{path}' still holds {count} message(s); use force to delete anyway")]
    NonEmptyEntity {
        kind: EntityKind,
        path: String,
        count: u64,
    },
}

impl ProvisioningError {
    /// Create a validation error.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ProvisioningError::Validation {
            field,
            message: message.into(),
        }
    }

    /// True for both plain and cross-kind "already exists" failures.
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            ProvisioningError::AlreadyExists { .. } | ProvisioningError::CrossKindCollision { .. }
        )
    }

    /// Check if the underlying transport failure is transient.
    pub fn is_transient(&self) -> bool {
        match self {
            ProvisioningError::Transport(err) => err.is_transient(),
            _ => false,
        }
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            ProvisioningError::Validation { .. } => "VALIDATION_ERROR",
            ProvisioningError::Transport(_) => "TRANSPORT_ERROR",
            ProvisioningError::AlreadyExists { .. } => "ALREADY_EXISTS",
            ProvisioningError::CrossKindCollision { .. } => "CROSS_KIND_COLLISION",
            ProvisioningError::ParentNotFound { .. } => "PARENT_NOT_FOUND",
            ProvisioningError::NotFound { .. } => "NOT_FOUND",
            ProvisioningError::NonEmptyEntity { .. } => "NON_EMPTY_ENTITY",
        }
    }
}

/// Result type for provisioning operations.
pub type ProvisioningResult<T> = Result<T, ProvisioningError>;
