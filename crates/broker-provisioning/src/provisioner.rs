//! Provisioner
//!
//! Caller-facing surface: one operation per create/delete and entity kind.
//! Each call normalizes its parameters, then hands off to the reconcilers.

use std::sync::Arc;

use broker_client::entity::{EntityHandle, EntityPath};
use broker_client::traits::{EntityClientFactory, NamespaceDirectory};

use crate::config::ProvisioningConfig;
use crate::error::ProvisioningResult;
use crate::normalize::normalize;
use crate::params::{QueueParams, RawParams, SubscriptionParams, TopicParams};
use crate::reconciliation::{CreateReconciler, DeleteOutcome, DeleteReconciler};
use crate::resolver::NamespaceResolver;

/// Entry point for provisioning and decommissioning broker entities.
///
/// `namespace` arguments fall back to the configured default namespace when
/// `None`.
#[derive(Clone)]
pub struct Provisioner {
    config: ProvisioningConfig,
    resolver: NamespaceResolver,
    creator: CreateReconciler,
    deleter: DeleteReconciler,
}

impl std::fmt::Debug for Provisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provisioner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Provisioner {
    /// Create a provisioner over a namespace directory and client factory.
    pub fn new(
        config: ProvisioningConfig,
        directory: Arc<dyn NamespaceDirectory>,
        clients: Arc<dyn EntityClientFactory>,
    ) -> Self {
        let resolver = NamespaceResolver::new(directory, &config);
        Self {
            creator: CreateReconciler::new(resolver.clone(), clients.clone()),
            deleter: DeleteReconciler::new(resolver.clone(), clients),
            resolver,
            config,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &ProvisioningConfig {
        &self.config
    }

    /// The namespace resolver used by every operation.
    pub fn resolver(&self) -> &NamespaceResolver {
        &self.resolver
    }

    /// Normalize `raw` and create the entity it describes.
    pub async fn create(
        &self,
        namespace: Option<&str>,
        raw: &RawParams,
    ) -> ProvisioningResult<EntityHandle> {
        let description = normalize(raw.kind(), raw)?;
        self.creator.create_entity(namespace, &description).await
    }

    /// Create a queue.
    pub async fn create_queue(
        &self,
        namespace: Option<&str>,
        params: QueueParams,
    ) -> ProvisioningResult<EntityHandle> {
        self.create(namespace, &params.into()).await
    }

    /// Create a topic.
    pub async fn create_topic(
        &self,
        namespace: Option<&str>,
        params: TopicParams,
    ) -> ProvisioningResult<EntityHandle> {
        self.create(namespace, &params.into()).await
    }

    /// Create a subscription.
    pub async fn create_subscription(
        &self,
        namespace: Option<&str>,
        params: SubscriptionParams,
    ) -> ProvisioningResult<EntityHandle> {
        self.create(namespace, &params.into()).await
    }

    /// Delete the entity at `path`.
    pub async fn delete(
        &self,
        namespace: Option<&str>,
        path: &EntityPath,
        force: bool,
    ) -> ProvisioningResult<DeleteOutcome> {
        self.deleter.delete_entity(namespace, path, force).await
    }

    /// Delete a queue.
    pub async fn delete_queue(
        &self,
        namespace: Option<&str>,
        path: &str,
        force: bool,
    ) -> ProvisioningResult<DeleteOutcome> {
        self.delete(namespace, &EntityPath::queue(path), force).await
    }

    /// Delete a topic and, with it, its subscriptions.
    pub async fn delete_topic(
        &self,
        namespace: Option<&str>,
        path: &str,
        force: bool,
    ) -> ProvisioningResult<DeleteOutcome> {
        self.delete(namespace, &EntityPath::topic(path), force).await
    }

    /// Delete a subscription.
    pub async fn delete_subscription(
        &self,
        namespace: Option<&str>,
        topic: &str,
        name: &str,
        force: bool,
    ) -> ProvisioningResult<DeleteOutcome> {
        self.delete(namespace, &EntityPath::subscription(topic, name), force)
            .await
    }
}
