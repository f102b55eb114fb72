//! # Broker Client
//!
//! Collaborator contracts and entity model for message-broker control planes.
//!
//! The provisioning engine never speaks a wire protocol itself. Everything it
//! needs from the broker is expressed through three traits:
//!
//! - [`NamespaceDirectory`] - existence, creation and connection strings for namespaces
//! - [`EntityClient`] - existence, creation, deletion and message counts for entities
//! - [`EntityClientFactory`] - entity clients bound to a resolved namespace
//!
//! ## Example
//!
//! ```ignore
//! use broker_client::prelude::*;
//!
//! let broker = InMemoryBroker::new();
//! let name = NamespaceName::parse("orders")?;
//! broker.create(&name).await?;
//!
//! let handle = NamespaceHandle::new(name.clone(), broker.connection_string_for(&name).await?);
//! let client = broker.client_for(&handle).await?;
//! assert!(!client.queue_exists("jobs").await?);
//! ```
//!
//! ## Crate Organization
//!
//! - [`ids`] - Type-safe identifiers (`OperationId`)
//! - [`types`] - Entity kinds
//! - [`namespace`] - Validated namespace names and resolved handles
//! - [`entity`] - Paths, descriptions, filter rules and handles
//! - [`error`] - Error types with transient/permanent classification
//! - [`traits`] - Collaborator traits
//! - [`memory`] - In-memory broker

pub mod entity;
pub mod error;
pub mod ids;
pub mod memory;
pub mod namespace;
pub mod traits;
pub mod types;

pub use traits::{EntityClient, EntityClientFactory, NamespaceDirectory};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::ids::OperationId;

    pub use crate::types::EntityKind;

    pub use crate::error::{ClientError, ClientResult};

    pub use crate::namespace::{NamespaceHandle, NamespaceName};

    pub use crate::entity::{
        CommonSettings, EntityDescription, EntityHandle, EntityPath, EntitySettings, FilterRule,
        QueueTopicSettings, SubscriptionSettings,
    };

    pub use crate::traits::{EntityClient, EntityClientFactory, NamespaceDirectory};

    pub use crate::memory::{InMemoryBroker, InMemoryEntityClient};
}

// Re-export async_trait for collaborator implementors
pub use async_trait::async_trait;
