//! Entity model
//!
//! Paths, canonical descriptions and handles for queues, topics and
//! subscriptions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::types::EntityKind;

/// Location of an entity within a namespace.
///
/// Queue and topic paths share one uniqueness namespace. Subscriptions are
/// keyed by their parent topic and are independent of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntityPath {
    Queue { path: String },
    Topic { path: String },
    Subscription { topic: String, name: String },
}

impl EntityPath {
    /// Path of a queue.
    pub fn queue(path: impl Into<String>) -> Self {
        EntityPath::Queue { path: path.into() }
    }

    /// Path of a topic.
    pub fn topic(path: impl Into<String>) -> Self {
        EntityPath::Topic { path: path.into() }
    }

    /// Path of a subscription under `topic`.
    pub fn subscription(topic: impl Into<String>, name: impl Into<String>) -> Self {
        EntityPath::Subscription {
            topic: topic.into(),
            name: name.into(),
        }
    }

    /// The kind of entity this path addresses.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityPath::Queue { .. } => EntityKind::Queue,
            EntityPath::Topic { .. } => EntityKind::Topic,
            EntityPath::Subscription { .. } => EntityKind::Subscription,
        }
    }

    /// The same path under the sibling queue/topic kind. `None` for
    /// subscriptions.
    #[must_use]
    pub fn sibling(&self) -> Option<EntityPath> {
        let sibling = self.kind().sibling()?;
        match (self, sibling) {
            (EntityPath::Queue { path } | EntityPath::Topic { path }, EntityKind::Queue) => {
                Some(EntityPath::queue(path.clone()))
            }
            (EntityPath::Queue { path } | EntityPath::Topic { path }, EntityKind::Topic) => {
                Some(EntityPath::topic(path.clone()))
            }
            _ => None,
        }
    }

    /// Parent topic for subscriptions.
    #[must_use]
    pub fn parent_topic(&self) -> Option<&str> {
        match self {
            EntityPath::Subscription { topic, .. } => Some(topic),
            _ => None,
        }
    }
}

impl fmt::Display for EntityPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityPath::Queue { path } | EntityPath::Topic { path } => f.write_str(path),
            EntityPath::Subscription { topic, name } => {
                write!(f, "{topic}/Subscriptions/{name}")
            }
        }
    }
}

/// A named filter rule attached to a subscription at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRule {
    /// Rule name.
    pub name: String,
    /// SQL-like filter expression.
    pub filter: String,
    /// Optional SQL-like action applied to matching messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl FilterRule {
    /// Name used for rules created without an explicit name.
    pub const DEFAULT_NAME: &'static str = "CustomRule";

    /// Filter expression matching every message.
    pub const MATCH_ALL: &'static str = "1=1";

    /// Create a rule.
    pub fn new(name: impl Into<String>, filter: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filter: filter.into(),
            action: None,
        }
    }

    /// Attach an action expression.
    #[must_use]
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

/// Settings shared by every entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonSettings {
    /// Idle interval after which the entity is deleted. `None` disables it.
    pub auto_delete_on_idle: Option<Duration>,
    /// Message time-to-live. `None` leaves the broker default.
    pub default_message_time_to_live: Option<Duration>,
    pub enable_batched_operations: bool,
    /// Peek-lock duration. Topics carry no lock.
    pub lock_duration: Option<Duration>,
    pub max_delivery_count: u32,
    pub requires_duplicate_detection: bool,
    /// Only set when duplicate detection is enabled.
    pub duplicate_detection_history_time_window: Option<Duration>,
    pub support_ordering: bool,
    pub user_metadata: Option<String>,
}

/// Settings for queues and topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueTopicSettings {
    pub max_size_in_megabytes: u32,
    pub enable_partitioning: bool,
    pub is_anonymous_accessible: bool,
    /// Entity that receives every message sent here.
    pub forward_to: Option<String>,
}

/// Settings for subscriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionSettings {
    pub enable_dead_lettering_on_message_expiration: bool,
    pub enable_dead_lettering_on_filter_evaluation_exceptions: bool,
    pub requires_session: bool,
    /// Custom rule replacing the broker's default match-all rule.
    pub rule: Option<FilterRule>,
}

/// Kind-specific part of an entity description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntitySettings {
    Queue(QueueTopicSettings),
    Topic(QueueTopicSettings),
    Subscription(SubscriptionSettings),
}

/// Canonical configuration of an entity about to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescription {
    pub path: EntityPath,
    pub common: CommonSettings,
    pub settings: EntitySettings,
}

impl EntityDescription {
    /// The kind of entity described.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.path.kind()
    }

    /// Whether the entity is partitioned. Always false for subscriptions.
    #[must_use]
    pub fn is_partitioned(&self) -> bool {
        match &self.settings {
            EntitySettings::Queue(s) | EntitySettings::Topic(s) => s.enable_partitioning,
            EntitySettings::Subscription(_) => false,
        }
    }

    /// Custom rule for subscriptions, if one was requested.
    #[must_use]
    pub fn rule(&self) -> Option<&FilterRule> {
        match &self.settings {
            EntitySettings::Subscription(s) => s.rule.as_ref(),
            _ => None,
        }
    }
}

/// Handle returned by the broker for a created entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityHandle {
    pub path: EntityPath,
    pub created_at: DateTime<Utc>,
}

impl EntityHandle {
    /// Create a handle stamped with the current time.
    pub fn new(path: EntityPath) -> Self {
        Self {
            path,
            created_at: Utc::now(),
        }
    }

    /// The kind of entity created.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.path.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_path_kind_and_display() {
        let queue = EntityPath::queue("orders");
        assert_eq!(queue.kind(), EntityKind::Queue);
        assert_eq!(queue.to_string(), "orders");
        assert_eq!(queue.parent_topic(), None);

        let sub = EntityPath::subscription("events", "audit");
        assert_eq!(sub.kind(), EntityKind::Subscription);
        assert_eq!(sub.to_string(), "events/Subscriptions/audit");
        assert_eq!(sub.parent_topic(), Some("events"));
    }

    #[test]
    fn test_entity_path_sibling() {
        assert_eq!(
            EntityPath::queue("orders").sibling(),
            Some(EntityPath::topic("orders"))
        );
        assert_eq!(
            EntityPath::topic("events").sibling(),
            Some(EntityPath::queue("events"))
        );
        assert_eq!(EntityPath::subscription("events", "audit").sibling(), None);
    }

    #[test]
    fn test_entity_path_serde_is_tagged() {
        let json = serde_json::to_value(EntityPath::subscription("events", "audit")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "subscription", "topic": "events", "name": "audit"})
        );
    }

    #[test]
    fn test_filter_rule_builder() {
        let rule = FilterRule::new(FilterRule::DEFAULT_NAME, FilterRule::MATCH_ALL)
            .with_action("SET priority = 'high'");
        assert_eq!(rule.name, "CustomRule");
        assert_eq!(rule.filter, "1=1");
        assert_eq!(rule.action.as_deref(), Some("SET priority = 'high'"));
    }
}
