//! Provisioning configuration parsed from environment variables.

use broker_client::namespace::NamespaceName;
use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{ProvisioningError, ProvisioningResult};

/// Environment variable naming the namespace used when a caller supplies none.
pub const DEFAULT_NAMESPACE_VAR: &str = "BROKER_DEFAULT_NAMESPACE";

/// Engine configuration.
///
/// Passed explicitly into the resolver; there is no process-wide default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningConfig {
    /// Namespace used when a caller does not name one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_namespace: Option<NamespaceName>,
}

impl ProvisioningConfig {
    /// Create a configuration with no default namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default namespace.
    #[must_use]
    pub fn with_default_namespace(mut self, namespace: NamespaceName) -> Self {
        self.default_namespace = Some(namespace);
        self
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> ProvisioningResult<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// Unset or blank variables leave the field at its default; set but
    /// invalid values are rejected.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> ProvisioningResult<Self> {
        let default_namespace = match lookup(DEFAULT_NAMESPACE_VAR) {
            Some(value) if !value.trim().is_empty() => Some(
                NamespaceName::parse(value.trim()).map_err(|e| {
                    ProvisioningError::validation(
                        "default namespace",
                        format!("{DEFAULT_NAMESPACE_VAR}: {e}"),
                    )
                })?,
            ),
            _ => None,
        };

        Ok(Self { default_namespace })
    }
}
