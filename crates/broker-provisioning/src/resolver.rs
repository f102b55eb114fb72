//! Namespace resolver
//!
//! Looks a namespace up in the directory and creates it on first use.

use std::sync::Arc;

use broker_client::error::ClientError;
use broker_client::namespace::{NamespaceHandle, NamespaceName};
use broker_client::traits::NamespaceDirectory;
use tracing::{debug, info, instrument};

use crate::config::ProvisioningConfig;
use crate::error::{ProvisioningError, ProvisioningResult};

/// Resolves namespace names to handles, creating missing namespaces.
#[derive(Clone)]
pub struct NamespaceResolver {
    directory: Arc<dyn NamespaceDirectory>,
    default_namespace: Option<NamespaceName>,
}

impl std::fmt::Debug for NamespaceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamespaceResolver")
            .field("default_namespace", &self.default_namespace)
            .finish_non_exhaustive()
    }
}

impl NamespaceResolver {
    /// Create a resolver over `directory`.
    pub fn new(directory: Arc<dyn NamespaceDirectory>, config: &ProvisioningConfig) -> Self {
        Self {
            directory,
            default_namespace: config.default_namespace.clone(),
        }
    }

    /// The configured default namespace, if any.
    pub fn default_namespace(&self) -> Option<&NamespaceName> {
        self.default_namespace.as_ref()
    }

    /// Resolve `name`, creating the namespace if it does not exist yet.
    ///
    /// Safe to call repeatedly. Directory failures are returned as
    /// [`ProvisioningError::Transport`] without retrying.
    #[instrument(skip(self))]
    pub async fn resolve(&self, name: &str) -> ProvisioningResult<NamespaceHandle> {
        let name = NamespaceName::parse(name)
            .map_err(|e| ProvisioningError::validation("namespace", e.reason()))?;
        self.resolve_name(&name).await
    }

    /// Resolve the configured default namespace.
    pub async fn resolve_default(&self) -> ProvisioningResult<NamespaceHandle> {
        let name = self.default_namespace.clone().ok_or_else(|| {
            ProvisioningError::validation("namespace", "no namespace given and no default configured")
        })?;
        self.resolve_name(&name).await
    }

    /// Resolve `name` if given, otherwise the configured default.
    pub async fn resolve_or_default(&self, name: Option<&str>) -> ProvisioningResult<NamespaceHandle> {
        match name {
            Some(name) => self.resolve(name).await,
            None => self.resolve_default().await,
        }
    }

    async fn resolve_name(&self, name: &NamespaceName) -> ProvisioningResult<NamespaceHandle> {
        if self.directory.exists(name).await? {
            debug!(namespace = %name, "Namespace exists");
        } else {
            info!(namespace = %name, "Namespace not found, creating");
            match self.directory.create(name).await {
                Ok(()) => {}
                Err(ClientError::EntityAlreadyExists { .. }) => {
                    debug!(namespace = %name, "Namespace created concurrently");
                }
                Err(err) => return Err(err.into()),
            }
        }

        let connection_string = self.directory.connection_string_for(name).await?;
        Ok(NamespaceHandle::new(name.clone(), connection_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use broker_client::async_trait;
    use broker_client::error::ClientResult;
    use broker_client::memory::InMemoryBroker;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Directory that never sees the namespace but loses every create race.
    #[derive(Default)]
    struct LosingRaceDirectory {
        creates: AtomicUsize,
    }

    #[async_trait]
    impl NamespaceDirectory for LosingRaceDirectory {
        async fn exists(&self, _name: &NamespaceName) -> ClientResult<bool> {
            Ok(false)
        }

        async fn create(&self, name: &NamespaceName) -> ClientResult<()> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            Err(ClientError::EntityAlreadyExists {
                path: name.to_string(),
            })
        }

        async fn connection_string_for(&self, name: &NamespaceName) -> ClientResult<String> {
            Ok(format!("Endpoint=sb://{name}.race/;SharedAccessKey=race"))
        }
    }

    fn resolver(broker: &InMemoryBroker, config: &ProvisioningConfig) -> NamespaceResolver {
        NamespaceResolver::new(Arc::new(broker.clone()), config)
    }

    #[tokio::test]
    async fn test_resolve_creates_missing_namespace() {
        let broker = InMemoryBroker::new();
        let resolver = resolver(&broker, &ProvisioningConfig::new());

        let handle = resolver.resolve("orders").await.unwrap();
        assert_eq!(handle.name().as_str(), "orders");
        assert!(handle.connection_string().contains("orders"));
        assert_eq!(broker.namespace_create_count(), 1);
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let broker = InMemoryBroker::new();
        let resolver = resolver(&broker, &ProvisioningConfig::new());

        let first = resolver.resolve("orders").await.unwrap();
        let second = resolver.resolve("orders").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(broker.namespace_create_count(), 1);
    }

    #[tokio::test]
    async fn test_resolve_rejects_invalid_name() {
        let broker = InMemoryBroker::new();
        let resolver = resolver(&broker, &ProvisioningConfig::new());

        let err = resolver.resolve("Orders_Prod").await.unwrap_err();
        assert!(matches!(
            err,
            ProvisioningError::Validation {
                field: "namespace",
                ..
            }
        ));
        assert_eq!(broker.namespace_create_count(), 0);
    }

    #[tokio::test]
    async fn test_resolve_default() {
        let broker = InMemoryBroker::new();
        let config =
            ProvisioningConfig::new().with_default_namespace(NamespaceName::parse("billing").unwrap());
        let resolver = resolver(&broker, &config);

        let handle = resolver.resolve_or_default(None).await.unwrap();
        assert_eq!(handle.name().as_str(), "billing");

        let handle = resolver.resolve_or_default(Some("orders")).await.unwrap();
        assert_eq!(handle.name().as_str(), "orders");
    }

    #[tokio::test]
    async fn test_resolve_default_without_config() {
        let broker = InMemoryBroker::new();
        let resolver = resolver(&broker, &ProvisioningConfig::new());

        let err = resolver.resolve_default().await.unwrap_err();
        assert!(matches!(err, ProvisioningError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let broker = InMemoryBroker::new();
        broker.set_unavailable(true);
        let resolver = resolver(&broker, &ProvisioningConfig::new());

        let err = resolver.resolve("orders").await.unwrap_err();
        assert!(matches!(err, ProvisioningError::Transport(_)));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_namespace_created_concurrently_still_resolves() {
        let directory = Arc::new(LosingRaceDirectory::default());
        let resolver = NamespaceResolver::new(directory.clone(), &ProvisioningConfig::new());

        let handle = resolver.resolve("orders").await.unwrap();
        assert_eq!(handle.name().as_str(), "orders");
        assert!(handle.connection_string().contains("orders.race"));
        assert_eq!(directory.creates.load(Ordering::SeqCst), 1);
    }
}
