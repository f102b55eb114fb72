//! Entity kind definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of broker entity managed by the provisioning engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Point-to-point queue
    Queue,
    /// Publish-subscribe topic
    Topic,
    /// Subscription under a topic
    Subscription,
}

impl EntityKind {
    /// Get all entity kinds.
    #[must_use]
    pub fn all() -> &'static [EntityKind] {
        &[EntityKind::Queue, EntityKind::Topic, EntityKind::Subscription]
    }

    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Queue => "queue",
            EntityKind::Topic => "topic",
            EntityKind::Subscription => "subscription",
        }
    }

    /// The other kind in the queue/topic path namespace, if any.
    ///
    /// A path can only be a queue or a topic at a time.
    #[must_use]
    pub fn sibling(&self) -> Option<EntityKind> {
        match self {
            EntityKind::Queue => Some(EntityKind::Topic),
            EntityKind::Topic => Some(EntityKind::Queue),
            EntityKind::Subscription => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = ParseEntityKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "queue" => Ok(EntityKind::Queue),
            "topic" => Ok(EntityKind::Topic),
            "subscription" => Ok(EntityKind::Subscription),
            _ => Err(ParseEntityKindError(s.to_string())),
        }
    }
}

/// Error parsing entity kind from string.
#[derive(Debug, Clone)]
pub struct ParseEntityKindError(String);

impl fmt::Display for ParseEntityKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid entity kind '{}', expected one of: queue, topic, subscription",
            self.0
        )
    }
}

impl std::error::Error for ParseEntityKindError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_roundtrip() {
        for kind in EntityKind::all() {
            let parsed: EntityKind = kind.as_str().parse().unwrap();
            assert_eq!(*kind, parsed);
        }
        assert_eq!("TOPIC".parse::<EntityKind>().unwrap(), EntityKind::Topic);
    }

    #[test]
    fn test_entity_kind_parse_error() {
        let err = "exchange".parse::<EntityKind>().unwrap_err();
        assert!(err.to_string().contains("exchange"));
    }

    #[test]
    fn test_sibling_kinds() {
        assert_eq!(EntityKind::Queue.sibling(), Some(EntityKind::Topic));
        assert_eq!(EntityKind::Topic.sibling(), Some(EntityKind::Queue));
        assert_eq!(EntityKind::Subscription.sibling(), None);
    }

    #[test]
    fn test_entity_kind_serde_lowercase() {
        let json = serde_json::to_string(&EntityKind::Subscription).unwrap();
        assert_eq!(json, "\"subscription\"");
    }
}
