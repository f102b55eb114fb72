//! In-memory broker
//!
//! A reference implementation of the collaborator traits that keeps every
//! namespace and entity in process memory. Used by tests and local dry runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::entity::{EntityDescription, EntityHandle, EntityPath, FilterRule};
use crate::error::{ClientError, ClientResult};
use crate::namespace::{NamespaceHandle, NamespaceName};
use crate::traits::{EntityClient, EntityClientFactory, NamespaceDirectory};

#[derive(Debug, Clone)]
struct StoredEntity {
    description: EntityDescription,
    rule: Option<FilterRule>,
    message_count: u64,
}

#[derive(Debug, Default)]
struct NamespaceState {
    queues: HashMap<String, StoredEntity>,
    topics: HashMap<String, StoredEntity>,
    subscriptions: HashMap<(String, String), StoredEntity>,
}

impl NamespaceState {
    fn get(&self, path: &EntityPath) -> Option<&StoredEntity> {
        match path {
            EntityPath::Queue { path } => self.queues.get(path),
            EntityPath::Topic { path } => self.topics.get(path),
            EntityPath::Subscription { topic, name } => {
                self.subscriptions.get(&(topic.clone(), name.clone()))
            }
        }
    }

    fn get_mut(&mut self, path: &EntityPath) -> Option<&mut StoredEntity> {
        match path {
            EntityPath::Queue { path } => self.queues.get_mut(path),
            EntityPath::Topic { path } => self.topics.get_mut(path),
            EntityPath::Subscription { topic, name } => {
                self.subscriptions.get_mut(&(topic.clone(), name.clone()))
            }
        }
    }

    fn path_in_use(&self, path: &str) -> bool {
        self.queues.contains_key(path) || self.topics.contains_key(path)
    }
}

#[derive(Debug, Default)]
struct Shared {
    namespaces: RwLock<HashMap<NamespaceName, NamespaceState>>,
    unavailable: AtomicBool,
    namespace_creates: AtomicUsize,
    entity_creates: AtomicUsize,
    entity_deletes: AtomicUsize,
}

/// Broker that lives entirely in memory.
///
/// Cloning is cheap; clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBroker {
    shared: Arc<Shared>,
}

impl InMemoryBroker {
    /// Create an empty broker with no namespaces.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with a transient error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.shared.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of namespace create calls received.
    pub fn namespace_create_count(&self) -> usize {
        self.shared.namespace_creates.load(Ordering::SeqCst)
    }

    /// Number of entity create calls that reached the broker.
    pub fn entity_create_count(&self) -> usize {
        self.shared.entity_creates.load(Ordering::SeqCst)
    }

    /// Number of entity delete calls that reached the broker.
    pub fn entity_delete_count(&self) -> usize {
        self.shared.entity_deletes.load(Ordering::SeqCst)
    }

    /// Create a namespace directly, bypassing the directory API.
    pub async fn insert_namespace(&self, name: &NamespaceName) {
        self.shared
            .namespaces
            .write()
            .await
            .entry(name.clone())
            .or_default();
    }

    /// Whether the namespace exists.
    pub async fn has_namespace(&self, name: &NamespaceName) -> bool {
        self.shared.namespaces.read().await.contains_key(name)
    }

    /// Whether the entity exists.
    pub async fn has_entity(&self, namespace: &NamespaceName, path: &EntityPath) -> bool {
        self.shared
            .namespaces
            .read()
            .await
            .get(namespace)
            .is_some_and(|ns| ns.get(path).is_some())
    }

    /// Description the entity was created with.
    pub async fn description_of(
        &self,
        namespace: &NamespaceName,
        path: &EntityPath,
    ) -> Option<EntityDescription> {
        self.shared
            .namespaces
            .read()
            .await
            .get(namespace)
            .and_then(|ns| ns.get(path))
            .map(|entity| entity.description.clone())
    }

    /// Rule the subscription was created with.
    pub async fn rule_of(&self, namespace: &NamespaceName, path: &EntityPath) -> Option<FilterRule> {
        self.shared
            .namespaces
            .read()
            .await
            .get(namespace)
            .and_then(|ns| ns.get(path))
            .and_then(|entity| entity.rule.clone())
    }

    /// Set the number of in-flight messages held by an existing entity.
    pub async fn set_message_count(
        &self,
        namespace: &NamespaceName,
        path: &EntityPath,
        count: u64,
    ) -> ClientResult<()> {
        let mut namespaces = self.shared.namespaces.write().await;
        let entity = namespaces
            .get_mut(namespace)
            .and_then(|ns| ns.get_mut(path))
            .ok_or_else(|| ClientError::EntityNotFound {
                path: path.to_string(),
            })?;
        entity.message_count = count;
        Ok(())
    }

    fn check_available(&self) -> ClientResult<()> {
        if self.shared.unavailable.load(Ordering::SeqCst) {
            return Err(ClientError::unavailable("in-memory broker marked unavailable"));
        }
        Ok(())
    }

    fn client(&self, namespace: NamespaceName) -> InMemoryEntityClient {
        InMemoryEntityClient {
            broker: self.clone(),
            namespace,
        }
    }
}

#[async_trait]
impl NamespaceDirectory for InMemoryBroker {
    async fn exists(&self, name: &NamespaceName) -> ClientResult<bool> {
        self.check_available()?;
        Ok(self.has_namespace(name).await)
    }

    async fn create(&self, name: &NamespaceName) -> ClientResult<()> {
        self.check_available()?;
        self.shared.namespace_creates.fetch_add(1, Ordering::SeqCst);

        let mut namespaces = self.shared.namespaces.write().await;
        if namespaces.contains_key(name) {
            return Err(ClientError::EntityAlreadyExists {
                path: name.to_string(),
            });
        }
        namespaces.insert(name.clone(), NamespaceState::default());
        debug!(namespace = %name, "Created namespace");
        Ok(())
    }

    async fn connection_string_for(&self, name: &NamespaceName) -> ClientResult<String> {
        self.check_available()?;
        if !self.has_namespace(name).await {
            return Err(ClientError::EntityNotFound {
                path: name.to_string(),
            });
        }
        Ok(format!(
            "Endpoint=sb://{name}.broker.local/;SharedAccessKeyName=RootManageSharedAccessKey;SharedAccessKey=local-{name}"
        ))
    }
}

#[async_trait]
impl EntityClientFactory for InMemoryBroker {
    async fn client_for(&self, namespace: &NamespaceHandle) -> ClientResult<Arc<dyn EntityClient>> {
        self.check_available()?;
        Ok(Arc::new(self.client(namespace.name().clone())))
    }
}

/// Entity client bound to one namespace of an [`InMemoryBroker`].
#[derive(Debug, Clone)]
pub struct InMemoryEntityClient {
    broker: InMemoryBroker,
    namespace: NamespaceName,
}

impl InMemoryEntityClient {
    async fn read<T>(&self, f: impl FnOnce(&NamespaceState) -> T) -> ClientResult<T> {
        self.broker.check_available()?;
        let namespaces = self.broker.shared.namespaces.read().await;
        let ns = namespaces
            .get(&self.namespace)
            .ok_or_else(|| ClientError::EntityNotFound {
                path: self.namespace.to_string(),
            })?;
        Ok(f(ns))
    }

    async fn write<T>(
        &self,
        f: impl FnOnce(&mut NamespaceState) -> ClientResult<T>,
    ) -> ClientResult<T> {
        self.broker.check_available()?;
        let mut namespaces = self.broker.shared.namespaces.write().await;
        let ns = namespaces
            .get_mut(&self.namespace)
            .ok_or_else(|| ClientError::EntityNotFound {
                path: self.namespace.to_string(),
            })?;
        f(ns)
    }

    async fn insert_queue_or_topic(
        &self,
        description: &EntityDescription,
    ) -> ClientResult<EntityHandle> {
        self.broker
            .shared
            .entity_creates
            .fetch_add(1, Ordering::SeqCst);

        let stored = StoredEntity {
            description: description.clone(),
            rule: None,
            message_count: 0,
        };
        self.write(|ns| match &description.path {
            EntityPath::Queue { path } | EntityPath::Topic { path } if ns.path_in_use(path) => {
                if ns.get(&description.path).is_some() {
                    Err(ClientError::EntityAlreadyExists { path: path.clone() })
                } else {
                    Err(ClientError::Rejected {
                        status: 409,
                        message: format!("path '{path}' is in use by another entity kind"),
                    })
                }
            }
            EntityPath::Queue { path } => {
                ns.queues.insert(path.clone(), stored);
                Ok(())
            }
            EntityPath::Topic { path } => {
                ns.topics.insert(path.clone(), stored);
                Ok(())
            }
            EntityPath::Subscription { .. } => Err(ClientError::invalid_data(
                "subscription description passed to queue/topic create",
            )),
        })
        .await?;

        debug!(namespace = %self.namespace, path = %description.path, "Created entity");
        Ok(EntityHandle::new(description.path.clone()))
    }
}

#[async_trait]
impl EntityClient for InMemoryEntityClient {
    async fn queue_exists(&self, path: &str) -> ClientResult<bool> {
        self.read(|ns| ns.queues.contains_key(path)).await
    }

    async fn topic_exists(&self, path: &str) -> ClientResult<bool> {
        self.read(|ns| ns.topics.contains_key(path)).await
    }

    async fn subscription_exists(&self, topic: &str, name: &str) -> ClientResult<bool> {
        self.read(|ns| {
            ns.subscriptions
                .contains_key(&(topic.to_string(), name.to_string()))
        })
        .await
    }

    async fn create_queue(&self, description: &EntityDescription) -> ClientResult<EntityHandle> {
        self.insert_queue_or_topic(description).await
    }

    async fn create_topic(&self, description: &EntityDescription) -> ClientResult<EntityHandle> {
        self.insert_queue_or_topic(description).await
    }

    async fn create_subscription(
        &self,
        description: &EntityDescription,
        rule: Option<&FilterRule>,
    ) -> ClientResult<EntityHandle> {
        let EntityPath::Subscription { topic, name } = &description.path else {
            return Err(ClientError::invalid_data(
                "queue/topic description passed to subscription create",
            ));
        };
        self.broker
            .shared
            .entity_creates
            .fetch_add(1, Ordering::SeqCst);

        let key = (topic.clone(), name.clone());
        let stored = StoredEntity {
            description: description.clone(),
            rule: rule.cloned(),
            message_count: 0,
        };
        self.write(|ns| {
            if !ns.topics.contains_key(topic) {
                return Err(ClientError::EntityNotFound {
                    path: topic.clone(),
                });
            }
            if ns.subscriptions.contains_key(&key) {
                return Err(ClientError::EntityAlreadyExists {
                    path: description.path.to_string(),
                });
            }
            ns.subscriptions.insert(key, stored);
            Ok(())
        })
        .await?;

        debug!(namespace = %self.namespace, path = %description.path, "Created subscription");
        Ok(EntityHandle::new(description.path.clone()))
    }

    async fn delete_queue(&self, path: &str) -> ClientResult<()> {
        self.broker
            .shared
            .entity_deletes
            .fetch_add(1, Ordering::SeqCst);
        self.write(|ns| {
            ns.queues
                .remove(path)
                .map(|_| ())
                .ok_or_else(|| ClientError::EntityNotFound {
                    path: path.to_string(),
                })
        })
        .await
    }

    async fn delete_topic(&self, path: &str) -> ClientResult<()> {
        self.broker
            .shared
            .entity_deletes
            .fetch_add(1, Ordering::SeqCst);
        self.write(|ns| {
            ns.topics
                .remove(path)
                .ok_or_else(|| ClientError::EntityNotFound {
                    path: path.to_string(),
                })?;
            // Subscriptions go with their topic.
            ns.subscriptions.retain(|(topic, _), _| topic != path);
            Ok(())
        })
        .await
    }

    async fn delete_subscription(&self, topic: &str, name: &str) -> ClientResult<()> {
        self.broker
            .shared
            .entity_deletes
            .fetch_add(1, Ordering::SeqCst);
        self.write(|ns| {
            ns.subscriptions
                .remove(&(topic.to_string(), name.to_string()))
                .map(|_| ())
                .ok_or_else(|| ClientError::EntityNotFound {
                    path: EntityPath::subscription(topic, name).to_string(),
                })
        })
        .await
    }

    async fn message_count(&self, path: &EntityPath) -> ClientResult<u64> {
        self.read(|ns| ns.get(path).map(|entity| entity.message_count))
            .await?
            .ok_or_else(|| ClientError::EntityNotFound {
                path: path.to_string(),
            })
    }
}
