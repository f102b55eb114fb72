//! Shared test fixtures.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use broker_client::async_trait;
use broker_client::entity::{EntityDescription, EntityHandle, EntityPath, FilterRule};
use broker_client::error::{ClientError, ClientResult};
use broker_client::memory::InMemoryBroker;
use broker_client::namespace::{NamespaceHandle, NamespaceName};
use broker_client::traits::{EntityClient, EntityClientFactory, NamespaceDirectory};
use broker_provisioning::{CreateReconciler, NamespaceResolver, Provisioner, ProvisioningConfig};

pub const NAMESPACE: &str = "orders";

pub fn namespace() -> NamespaceName {
    NamespaceName::parse(NAMESPACE).unwrap()
}

/// Provisioner wired to an in-memory broker.
pub fn in_memory_provisioner(config: ProvisioningConfig) -> (Provisioner, InMemoryBroker) {
    let broker = InMemoryBroker::new();
    let provisioner = Provisioner::new(config, Arc::new(broker.clone()), Arc::new(broker.clone()));
    (provisioner, broker)
}

// =============================================================================
// Scripted broker
// =============================================================================

/// What the broker does when the create/delete call finally arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActBehavior {
    Success,
    /// Another actor created the entity between check and act.
    RaceAlreadyExists,
    /// Another actor deleted the entity between check and act.
    RaceNotFound,
    Unavailable,
}

#[derive(Debug)]
struct Script {
    queues: HashSet<String>,
    topics: HashSet<String>,
    subscriptions: HashSet<(String, String)>,
    message_counts: HashMap<String, u64>,
    act: ActBehavior,
    calls: Mutex<Vec<String>>,
    create_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    directory_down: AtomicBool,
}

/// Broker answering from a fixed script and recording every call in order.
#[derive(Debug, Clone)]
pub struct ScriptedBroker {
    script: Arc<Script>,
}

impl ScriptedBroker {
    pub fn new() -> ScriptedBrokerBuilder {
        ScriptedBrokerBuilder::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.script.calls.lock().unwrap().clone()
    }

    pub fn create_calls(&self) -> usize {
        self.script.create_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.script.delete_calls.load(Ordering::SeqCst)
    }

    pub fn set_directory_down(&self, down: bool) {
        self.script.directory_down.store(down, Ordering::SeqCst);
    }

    pub fn provisioner(&self) -> Provisioner {
        Provisioner::new(
            ProvisioningConfig::new(),
            Arc::new(self.clone()),
            Arc::new(self.clone()),
        )
    }

    /// Create reconciler used directly, without the normalizer in front.
    pub fn create_reconciler(&self) -> CreateReconciler {
        let resolver = NamespaceResolver::new(Arc::new(self.clone()), &ProvisioningConfig::new());
        CreateReconciler::new(resolver, Arc::new(self.clone()))
    }

    fn record(&self, call: impl Into<String>) {
        self.script.calls.lock().unwrap().push(call.into());
    }

    fn act(&self, path: &EntityPath) -> ClientResult<()> {
        match self.script.act {
            ActBehavior::Success => Ok(()),
            ActBehavior::RaceAlreadyExists => Err(ClientError::EntityAlreadyExists {
                path: path.to_string(),
            }),
            ActBehavior::RaceNotFound => Err(ClientError::EntityNotFound {
                path: path.to_string(),
            }),
            ActBehavior::Unavailable => Err(ClientError::unavailable("scripted outage")),
        }
    }

    fn created(&self, description: &EntityDescription) -> ClientResult<EntityHandle> {
        self.script.create_calls.fetch_add(1, Ordering::SeqCst);
        self.act(&description.path)?;
        Ok(EntityHandle::new(description.path.clone()))
    }

    fn deleted(&self, path: EntityPath) -> ClientResult<()> {
        self.script.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.act(&path)
    }
}

#[derive(Debug)]
pub struct ScriptedBrokerBuilder {
    queues: HashSet<String>,
    topics: HashSet<String>,
    subscriptions: HashSet<(String, String)>,
    message_counts: HashMap<String, u64>,
    act: ActBehavior,
}

impl Default for ScriptedBrokerBuilder {
    fn default() -> Self {
        Self {
            queues: HashSet::new(),
            topics: HashSet::new(),
            subscriptions: HashSet::new(),
            message_counts: HashMap::new(),
            act: ActBehavior::Success,
        }
    }
}

impl ScriptedBrokerBuilder {
    pub fn with_queue(mut self, path: &str) -> Self {
        self.queues.insert(path.to_string());
        self
    }

    pub fn with_topic(mut self, path: &str) -> Self {
        self.topics.insert(path.to_string());
        self
    }

    pub fn with_subscription(mut self, topic: &str, name: &str) -> Self {
        self.subscriptions
            .insert((topic.to_string(), name.to_string()));
        self
    }

    pub fn with_messages(mut self, path: &EntityPath, count: u64) -> Self {
        self.message_counts.insert(path.to_string(), count);
        self
    }

    pub fn with_act(mut self, act: ActBehavior) -> Self {
        self.act = act;
        self
    }

    pub fn build(self) -> ScriptedBroker {
        ScriptedBroker {
            script: Arc::new(Script {
                queues: self.queues,
                topics: self.topics,
                subscriptions: self.subscriptions,
                message_counts: self.message_counts,
                act: self.act,
                calls: Mutex::new(Vec::new()),
                create_calls: AtomicUsize::new(0),
                delete_calls: AtomicUsize::new(0),
                directory_down: AtomicBool::new(false),
            }),
        }
    }
}

#[async_trait]
impl NamespaceDirectory for ScriptedBroker {
    async fn exists(&self, name: &NamespaceName) -> ClientResult<bool> {
        self.record(format!("namespace_exists:{name}"));
        if self.script.directory_down.load(Ordering::SeqCst) {
            return Err(ClientError::connection_failed("directory unreachable"));
        }
        Ok(true)
    }

    async fn create(&self, name: &NamespaceName) -> ClientResult<()> {
        self.record(format!("namespace_create:{name}"));
        Ok(())
    }

    async fn connection_string_for(&self, name: &NamespaceName) -> ClientResult<String> {
        Ok(format!("Endpoint=sb://{name}.scripted/;SharedAccessKey=scripted"))
    }
}

#[async_trait]
impl EntityClientFactory for ScriptedBroker {
    async fn client_for(&self, _namespace: &NamespaceHandle) -> ClientResult<Arc<dyn EntityClient>> {
        Ok(Arc::new(self.clone()))
    }
}

#[async_trait]
impl EntityClient for ScriptedBroker {
    async fn queue_exists(&self, path: &str) -> ClientResult<bool> {
        self.record(format!("queue_exists:{path}"));
        Ok(self.script.queues.contains(path))
    }

    async fn topic_exists(&self, path: &str) -> ClientResult<bool> {
        self.record(format!("topic_exists:{path}"));
        Ok(self.script.topics.contains(path))
    }

    async fn subscription_exists(&self, topic: &str, name: &str) -> ClientResult<bool> {
        self.record(format!("subscription_exists:{topic}/{name}"));
        Ok(self
            .script
            .subscriptions
            .contains(&(topic.to_string(), name.to_string())))
    }

    async fn create_queue(&self, description: &EntityDescription) -> ClientResult<EntityHandle> {
        self.record(format!("create_queue:{}", description.path));
        self.created(description)
    }

    async fn create_topic(&self, description: &EntityDescription) -> ClientResult<EntityHandle> {
        self.record(format!("create_topic:{}", description.path));
        self.created(description)
    }

    async fn create_subscription(
        &self,
        description: &EntityDescription,
        rule: Option<&FilterRule>,
    ) -> ClientResult<EntityHandle> {
        let rule = rule.map_or("default", |r| r.name.as_str());
        self.record(format!("create_subscription:{}:{rule}", description.path));
        self.created(description)
    }

    async fn delete_queue(&self, path: &str) -> ClientResult<()> {
        self.record(format!("delete_queue:{path}"));
        self.deleted(EntityPath::queue(path))
    }

    async fn delete_topic(&self, path: &str) -> ClientResult<()> {
        self.record(format!("delete_topic:{path}"));
        self.deleted(EntityPath::topic(path))
    }

    async fn delete_subscription(&self, topic: &str, name: &str) -> ClientResult<()> {
        self.record(format!("delete_subscription:{topic}/{name}"));
        self.deleted(EntityPath::subscription(topic, name))
    }

    async fn message_count(&self, path: &EntityPath) -> ClientResult<u64> {
        self.record(format!("message_count:{path}"));
        Ok(self
            .script
            .message_counts
            .get(&path.to_string())
            .copied()
            .unwrap_or(0))
    }
}
