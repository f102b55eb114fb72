//! Create reconciler

use std::sync::Arc;

use broker_client::entity::{EntityDescription, EntityHandle, EntityPath};
use broker_client::error::ClientError;
use broker_client::ids::OperationId;
use broker_client::traits::EntityClientFactory;
use tracing::{info, instrument};

use crate::collision::CollisionGuard;
use crate::error::{ProvisioningError, ProvisioningResult};
use crate::reconciliation::{validate_path, verify_parent};
use crate::resolver::NamespaceResolver;

/// Creates entities after verifying the parent and the path are free.
#[derive(Clone)]
pub struct CreateReconciler {
    resolver: NamespaceResolver,
    clients: Arc<dyn EntityClientFactory>,
}

impl CreateReconciler {
    /// Create a reconciler resolving namespaces through `resolver`.
    pub fn new(resolver: NamespaceResolver, clients: Arc<dyn EntityClientFactory>) -> Self {
        Self { resolver, clients }
    }

    /// Create the entity described by `description` in `namespace` (or the
    /// configured default namespace).
    ///
    /// Order of checks:
    /// 1. the path must not be blank; nothing is sent to the broker otherwise
    /// 2. resolve (and lazily create) the namespace
    /// 3. for subscriptions, the parent topic must exist
    /// 4. the path must be free under both queue and topic kinds (or under
    ///    the subscription's own key)
    /// 5. the broker creates the entity
    #[instrument(
        skip(self, namespace, description),
        fields(
            operation_id = %OperationId::new(),
            namespace = namespace.unwrap_or("<default>"),
            kind = %description.kind(),
            path = %description.path,
        )
    )]
    pub async fn create_entity(
        &self,
        namespace: Option<&str>,
        description: &EntityDescription,
    ) -> ProvisioningResult<EntityHandle> {
        validate_path(&description.path)?;

        let handle = self.resolver.resolve_or_default(namespace).await?;
        let client = self.clients.client_for(&handle).await?;

        verify_parent(client.as_ref(), &description.path).await?;
        CollisionGuard::new(client.as_ref())
            .check(&description.path)
            .await?;

        let created = match &description.path {
            EntityPath::Queue { .. } => client.create_queue(description).await,
            EntityPath::Topic { .. } => client.create_topic(description).await,
            EntityPath::Subscription { .. } => {
                client
                    .create_subscription(description, description.rule())
                    .await
            }
        }
        .map_err(|e| rejected_create(&description.path, e))?;

        info!(
            namespace = %handle.name(),
            created_at = %created.created_at,
            "Created {}",
            description.kind()
        );
        Ok(created)
    }
}

/// Map a broker rejection raised after the checks passed.
fn rejected_create(path: &EntityPath, err: ClientError) -> ProvisioningError {
    match (err, path) {
        (ClientError::EntityAlreadyExists { .. }, _) => ProvisioningError::AlreadyExists {
            kind: path.kind(),
            path: path.to_string(),
        },
        (ClientError::EntityNotFound { .. }, EntityPath::Subscription { topic, .. }) => {
            ProvisioningError::ParentNotFound {
                topic: topic.clone(),
            }
        }
        (err, _) => ProvisioningError::Transport(err),
    }
}
