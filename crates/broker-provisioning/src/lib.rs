//! # Broker Provisioning
//!
//! Entity lifecycle reconciliation for message brokers.
//!
//! Given a desired entity description this crate makes sure the entity
//! exists with those properties, or that it is removed without silently
//! dropping in-flight messages. It performs one-shot create and delete
//! sequences; it is not a drift-detection loop.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐    ┌──────────────┐    ┌────────────────┐    ┌──────────────────┐
//! │   Caller   │───►│  Normalizer  │───►│   Namespace    │───►│ Collision Guard  │
//! │ (params)   │    │  (pure)      │    │   Resolver     │    │ + Create         │
//! └────────────┘    └──────────────┘    └───────┬────────┘    │   Reconciler     │
//!                                               │             └──────────────────┘
//!                                               │             ┌──────────────────┐
//!                                               └────────────►│ Delete           │
//!                                                             │   Reconciler     │
//!                                                             └──────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use broker_client::memory::InMemoryBroker;
//! use broker_provisioning::prelude::*;
//!
//! let broker = Arc::new(InMemoryBroker::new());
//! let provisioner = Provisioner::new(ProvisioningConfig::from_env()?, broker.clone(), broker);
//!
//! provisioner
//!     .create_queue(Some("orders"), QueueParams::new("jobs"))
//!     .await?;
//! provisioner.delete_queue(Some("orders"), "jobs", false).await?;
//! ```

pub mod collision;
pub mod config;
pub mod error;
pub mod normalize;
pub mod params;
pub mod provisioner;
pub mod reconciliation;
pub mod resolver;

pub use collision::{CollisionGuard, Presence};
pub use config::ProvisioningConfig;
pub use error::{ProvisioningError, ProvisioningResult};
pub use normalize::normalize;
pub use params::{QueueParams, RawParams, SubscriptionParams, TopicParams};
pub use provisioner::Provisioner;
pub use reconciliation::{
    CreateReconciler, DeleteOutcome, DeletePhase, DeleteReconciler,
};
pub use resolver::NamespaceResolver;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::ProvisioningConfig;
    pub use crate::error::{ProvisioningError, ProvisioningResult};
    pub use crate::params::{QueueParams, RawParams, SubscriptionParams, TopicParams};
    pub use crate::provisioner::Provisioner;
    pub use crate::reconciliation::{DeleteOutcome, DeletePhase};

    pub use broker_client::prelude::*;
}
