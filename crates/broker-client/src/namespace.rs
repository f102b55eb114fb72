//! Namespace identifiers and handles

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of a namespace name.
pub const MAX_NAMESPACE_LEN: usize = 50;

const REDACTED: &str = "[REDACTED]";

/// Validated namespace name: lowercase ASCII alphanumerics only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NamespaceName(String);

impl NamespaceName {
    /// Validate and wrap a namespace name.
    pub fn parse(name: &str) -> Result<Self, InvalidNamespaceName> {
        if name.is_empty() {
            return Err(InvalidNamespaceName::new(name, "must not be empty"));
        }
        if name.len() > MAX_NAMESPACE_LEN {
            return Err(InvalidNamespaceName::new(
                name,
                "must be at most 50 characters",
            ));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(InvalidNamespaceName::new(
                name,
                "must contain only lowercase letters and digits",
            ));
        }
        Ok(Self(name.to_string()))
    }

    /// Get the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NamespaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NamespaceName {
    type Err = InvalidNamespaceName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for NamespaceName {
    type Error = InvalidNamespaceName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<NamespaceName> for String {
    fn from(name: NamespaceName) -> Self {
        name.0
    }
}

impl AsRef<str> for NamespaceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Error returned when a namespace name fails validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidNamespaceName {
    name: String,
    reason: &'static str,
}

impl InvalidNamespaceName {
    fn new(name: &str, reason: &'static str) -> Self {
        Self {
            name: name.to_string(),
            reason,
        }
    }

    /// The rejected input.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Why the input was rejected.
    pub fn reason(&self) -> &'static str {
        self.reason
    }
}

impl fmt::Display for InvalidNamespaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid namespace name '{}': {}", self.name, self.reason)
    }
}

impl std::error::Error for InvalidNamespaceName {}

/// A resolved namespace: its name plus the connection string used to reach
/// its entities.
///
/// Handles are created once by the resolver and never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct NamespaceHandle {
    name: NamespaceName,
    connection_string: String,
}

impl NamespaceHandle {
    /// Create a handle from a resolved name and connection string.
    pub fn new(name: NamespaceName, connection_string: impl Into<String>) -> Self {
        Self {
            name,
            connection_string: connection_string.into(),
        }
    }

    /// The namespace name.
    pub fn name(&self) -> &NamespaceName {
        &self.name
    }

    /// The raw connection string. Contains credentials; never log it.
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// Connection string with the shared access key masked.
    #[must_use]
    pub fn redacted_connection_string(&self) -> String {
        redact_connection_string(&self.connection_string)
    }
}

impl fmt::Debug for NamespaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamespaceHandle")
            .field("name", &self.name.as_str())
            .field("connection_string", &self.redacted_connection_string())
            .finish()
    }
}

/// Mask the `SharedAccessKey` segment of a `key=value;` connection string.
pub fn redact_connection_string(connection_string: &str) -> String {
    connection_string
        .split(';')
        .map(|segment| match segment.split_once('=') {
            Some((key, _)) if key.trim().eq_ignore_ascii_case("SharedAccessKey") => {
                format!("{key}={REDACTED}")
            }
            _ => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join(";")
}
