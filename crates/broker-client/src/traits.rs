//! Collaborator traits
//!
//! The provisioning engine only ever talks to the broker through these
//! traits. Implementations own transport, credentials and timeouts.

use async_trait::async_trait;
use std::sync::Arc;

use crate::entity::{EntityDescription, EntityHandle, EntityPath, FilterRule};
use crate::error::ClientResult;
use crate::namespace::{NamespaceHandle, NamespaceName};

/// Directory of namespaces known to the control plane.
#[async_trait]
pub trait NamespaceDirectory: Send + Sync {
    /// Check whether a namespace exists.
    async fn exists(&self, name: &NamespaceName) -> ClientResult<bool>;

    /// Create a namespace. Fails if it already exists.
    async fn create(&self, name: &NamespaceName) -> ClientResult<()>;

    /// Fetch the connection string for an existing namespace.
    async fn connection_string_for(&self, name: &NamespaceName) -> ClientResult<String>;
}

/// Entity operations against a single namespace.
#[async_trait]
pub trait EntityClient: Send + Sync {
    /// Check whether a queue exists at `path`.
    async fn queue_exists(&self, path: &str) -> ClientResult<bool>;

    /// Check whether a topic exists at `path`.
    async fn topic_exists(&self, path: &str) -> ClientResult<bool>;

    /// Check whether subscription `name` exists under `topic`.
    async fn subscription_exists(&self, topic: &str, name: &str) -> ClientResult<bool>;

    /// Create a queue.
    async fn create_queue(&self, description: &EntityDescription) -> ClientResult<EntityHandle>;

    /// Create a topic.
    async fn create_topic(&self, description: &EntityDescription) -> ClientResult<EntityHandle>;

    /// Create a subscription, optionally replacing the default rule.
    async fn create_subscription(
        &self,
        description: &EntityDescription,
        rule: Option<&FilterRule>,
    ) -> ClientResult<EntityHandle>;

    /// Delete a queue.
    async fn delete_queue(&self, path: &str) -> ClientResult<()>;

    /// Delete a topic.
    async fn delete_topic(&self, path: &str) -> ClientResult<()>;

    /// Delete subscription `name` under `topic`.
    async fn delete_subscription(&self, topic: &str, name: &str) -> ClientResult<()>;

    /// Number of messages currently held by the entity (active, scheduled
    /// and dead-lettered).
    async fn message_count(&self, path: &EntityPath) -> ClientResult<u64>;

    /// Check whether the entity at `path` exists under its own kind.
    async fn exists(&self, path: &EntityPath) -> ClientResult<bool> {
        match path {
            EntityPath::Queue { path } => self.queue_exists(path).await,
            EntityPath::Topic { path } => self.topic_exists(path).await,
            EntityPath::Subscription { topic, name } => {
                self.subscription_exists(topic, name).await
            }
        }
    }
}

/// Produces entity clients bound to a resolved namespace.
#[async_trait]
pub trait EntityClientFactory: Send + Sync {
    /// Build a client for the namespace behind `namespace`.
    async fn client_for(&self, namespace: &NamespaceHandle) -> ClientResult<Arc<dyn EntityClient>>;
}
