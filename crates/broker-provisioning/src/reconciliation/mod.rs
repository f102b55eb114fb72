//! Entity lifecycle reconciliation
//!
//! One-shot create and delete sequences against the broker. Each sequence is
//! check-then-act: existence queries followed by a separate create or delete
//! call. The broker offers no conditional create, so a concurrent actor can
//! slip in between the two steps; when that happens the broker's rejection is
//! surfaced as the matching typed error. Callers only ever see the single
//! reconciler call, so an atomic broker API could replace the two steps
//! without touching them.

pub mod create;
pub mod delete;

pub use create::CreateReconciler;
pub use delete::{DeleteOutcome, DeletePhase, DeleteReconciler};

use broker_client::entity::EntityPath;
use broker_client::traits::EntityClient;

use crate::error::{ProvisioningError, ProvisioningResult};

/// Fail with `ParentNotFound` if `path` is a subscription whose topic is missing.
pub(crate) async fn verify_parent(
    client: &dyn EntityClient,
    path: &EntityPath,
) -> ProvisioningResult<()> {
    if let Some(topic) = path.parent_topic() {
        if !client.topic_exists(topic).await? {
            return Err(ProvisioningError::ParentNotFound {
                topic: topic.to_string(),
            });
        }
    }
    Ok(())
}

/// Reject blank paths before any broker call.
pub(crate) fn validate_path(path: &EntityPath) -> ProvisioningResult<()> {
    fn blank(value: &str) -> bool {
        value.trim().is_empty()
    }

    match path {
        EntityPath::Queue { path } | EntityPath::Topic { path } if blank(path) => Err(
            ProvisioningError::validation("entity path", "must not be empty"),
        ),
        EntityPath::Subscription { topic, .. } if blank(topic) => Err(
            ProvisioningError::validation("topic path", "must not be empty"),
        ),
        EntityPath::Subscription { name, .. } if blank(name) => Err(
            ProvisioningError::validation("subscription name", "must not be empty"),
        ),
        _ => Ok(()),
    }
}
