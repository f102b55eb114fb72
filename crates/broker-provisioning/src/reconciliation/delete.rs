//! Delete reconciler
//!
//! Deletion walks a small state machine:
//!
//! ```text
//! NotChecked ──► Verified ──► Proceeding ──► Deleted
//!     │             │  ▲           │
//!     │             ▼  │ (force)   │
//!     │          Blocked           │
//!     ▼             ▼              ▼
//!   Failed       (terminal       Failed
//!              without force)
//! ```
//!
//! An entity holding messages is `Blocked`. Without `force` that is final and
//! the caller gets `NonEmptyEntity`; with `force` a warning is recorded and
//! deletion proceeds.

use std::fmt;
use std::sync::Arc;

use broker_client::entity::EntityPath;
use broker_client::error::ClientError;
use broker_client::ids::OperationId;
use broker_client::traits::{EntityClient, EntityClientFactory};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{ProvisioningError, ProvisioningResult};
use crate::reconciliation::{validate_path, verify_parent};
use crate::resolver::NamespaceResolver;

/// Phase of a delete reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePhase {
    /// Nothing queried yet.
    NotChecked,
    /// Entity (and parent, for subscriptions) confirmed to exist.
    Verified,
    /// Entity still holds messages.
    Blocked,
    /// Delete call about to be issued.
    Proceeding,
    /// Entity removed.
    Deleted,
    /// Sequence aborted with an error.
    Failed,
}

impl DeletePhase {
    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DeletePhase::NotChecked => "not_checked",
            DeletePhase::Verified => "verified",
            DeletePhase::Blocked => "blocked",
            DeletePhase::Proceeding => "proceeding",
            DeletePhase::Deleted => "deleted",
            DeletePhase::Failed => "failed",
        }
    }

    /// Check if a transition from this phase to another is valid.
    #[must_use]
    pub fn can_transition_to(&self, target: &Self, force: bool) -> bool {
        match (self, target) {
            (Self::NotChecked, Self::Verified | Self::Failed) => true,
            (Self::Verified, Self::Blocked | Self::Proceeding | Self::Failed) => true,
            (Self::Blocked, Self::Proceeding) => force,
            (Self::Proceeding, Self::Deleted | Self::Failed) => true,
            _ => false,
        }
    }

    /// Check if this is a terminal phase.
    ///
    /// `Blocked` is terminal only when the caller did not force deletion.
    #[must_use]
    pub fn is_terminal(&self, force: bool) -> bool {
        match self {
            Self::Deleted | Self::Failed => true,
            Self::Blocked => !force,
            _ => false,
        }
    }
}

impl fmt::Display for DeletePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub path: EntityPath,
    /// Phase the sequence finished in.
    pub phase: DeletePhase,
    /// Messages the entity held when it was checked.
    pub message_count: u64,
    /// True when `force` overrode a non-empty entity.
    pub forced: bool,
}

/// Deletes entities after verifying they exist and are drained.
#[derive(Clone)]
pub struct DeleteReconciler {
    resolver: NamespaceResolver,
    clients: Arc<dyn EntityClientFactory>,
}

impl DeleteReconciler {
    /// Create a reconciler resolving namespaces through `resolver`.
    pub fn new(resolver: NamespaceResolver, clients: Arc<dyn EntityClientFactory>) -> Self {
        Self { resolver, clients }
    }

    /// Delete the entity at `path` in `namespace` (or the configured default).
    ///
    /// Fails with `NonEmptyEntity` when the entity still holds messages,
    /// unless `force` is set.
    #[instrument(
        skip(self, namespace, path),
        fields(
            operation_id = %OperationId::new(),
            namespace = namespace.unwrap_or("<default>"),
            kind = %path.kind(),
            path = %path,
        )
    )]
    pub async fn delete_entity(
        &self,
        namespace: Option<&str>,
        path: &EntityPath,
        force: bool,
    ) -> ProvisioningResult<DeleteOutcome> {
        validate_path(path)?;

        let mut phase = Phase::new(force);
        match self.run(namespace, path, &mut phase).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                if phase.current != DeletePhase::Blocked {
                    phase.advance(DeletePhase::Failed);
                }
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        namespace: Option<&str>,
        path: &EntityPath,
        phase: &mut Phase,
    ) -> ProvisioningResult<DeleteOutcome> {
        let handle = self.resolver.resolve_or_default(namespace).await?;
        let client = self.clients.client_for(&handle).await?;

        verify_parent(client.as_ref(), path).await?;
        if !client.exists(path).await? {
            return Err(ProvisioningError::NotFound {
                kind: path.kind(),
                path: path.to_string(),
            });
        }
        phase.advance(DeletePhase::Verified);

        let message_count = client.message_count(path).await?;
        let forced = message_count > 0;
        if forced {
            phase.advance(DeletePhase::Blocked);
            if !phase.force {
                return Err(ProvisioningError::NonEmptyEntity {
                    kind: path.kind(),
                    path: path.to_string(),
                    count: message_count,
                });
            }
            warn!(
                message_count,
                "Force deleting {} that still holds messages",
                path.kind()
            );
        }
        phase.advance(DeletePhase::Proceeding);

        delete_at(client.as_ref(), path)
            .await
            .map_err(|e| rejected_delete(path, e))?;
        phase.advance(DeletePhase::Deleted);

        info!(namespace = %handle.name(), message_count, "Deleted {}", path.kind());
        Ok(DeleteOutcome {
            path: path.clone(),
            phase: phase.current,
            message_count,
            forced,
        })
    }
}

/// Phase tracker that logs each transition.
struct Phase {
    current: DeletePhase,
    force: bool,
}

impl Phase {
    fn new(force: bool) -> Self {
        Self {
            current: DeletePhase::NotChecked,
            force,
        }
    }

    fn advance(&mut self, next: DeletePhase) {
        debug_assert!(
            self.current.can_transition_to(&next, self.force),
            "invalid delete transition {} -> {}",
            self.current,
            next
        );
        debug!(from = %self.current, to = %next, "Delete phase transition");
        self.current = next;
    }
}

async fn delete_at(client: &dyn EntityClient, path: &EntityPath) -> Result<(), ClientError> {
    match path {
        EntityPath::Queue { path } => client.delete_queue(path).await,
        EntityPath::Topic { path } => client.delete_topic(path).await,
        EntityPath::Subscription { topic, name } => client.delete_subscription(topic, name).await,
    }
}

/// Map a broker rejection raised after the checks passed.
fn rejected_delete(path: &EntityPath, err: ClientError) -> ProvisioningError {
    match err {
        ClientError::EntityNotFound { .. } => ProvisioningError::NotFound {
            kind: path.kind(),
            path: path.to_string(),
        },
        err => ProvisioningError::Transport(err),
    }
}
