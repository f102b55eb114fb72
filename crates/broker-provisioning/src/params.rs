//! Raw parameter sets
//!
//! Optional, loosely-typed inputs as a caller supplies them. Durations are
//! plain integers in the unit named by the field; zero, negative and
//! below-floor values are meaningful and resolved by the normalizer.

use broker_client::types::EntityKind;
use serde::{Deserialize, Serialize};

/// Parameters for creating a queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueueParams {
    pub path: String,
    pub auto_delete_on_idle_minutes: Option<i64>,
    pub default_message_ttl_minutes: Option<i64>,
    /// Defaults to enabled.
    pub enable_batched_operations: Option<bool>,
    pub lock_duration_seconds: Option<i64>,
    pub max_delivery_count: Option<i64>,
    pub requires_duplicate_detection: bool,
    pub duplicate_detection_window_minutes: Option<i64>,
    pub support_ordering: bool,
    pub user_metadata: Option<String>,
    pub max_size_megabytes: Option<i64>,
    pub enable_partitioning: bool,
    pub is_anonymous_accessible: bool,
    pub forward_to: Option<String>,
}

impl QueueParams {
    /// Parameters for a queue at `path` with every option unset.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

/// Parameters for creating a topic.
///
/// Topics never hand out locks or deliver directly, so lock duration and
/// delivery count are not accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TopicParams {
    pub path: String,
    pub auto_delete_on_idle_minutes: Option<i64>,
    pub default_message_ttl_minutes: Option<i64>,
    pub enable_batched_operations: Option<bool>,
    pub requires_duplicate_detection: bool,
    pub duplicate_detection_window_minutes: Option<i64>,
    pub support_ordering: bool,
    pub user_metadata: Option<String>,
    pub max_size_megabytes: Option<i64>,
    pub enable_partitioning: bool,
    pub is_anonymous_accessible: bool,
    pub forward_to: Option<String>,
}

impl TopicParams {
    /// Parameters for a topic at `path` with every option unset.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

/// Parameters for creating a subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubscriptionParams {
    pub topic_path: String,
    pub name: String,
    pub auto_delete_on_idle_minutes: Option<i64>,
    pub default_message_ttl_minutes: Option<i64>,
    pub enable_batched_operations: Option<bool>,
    pub lock_duration_seconds: Option<i64>,
    pub max_delivery_count: Option<i64>,
    pub user_metadata: Option<String>,
    pub dead_lettering_on_message_expiration: bool,
    pub dead_lettering_on_filter_evaluation_exceptions: bool,
    pub requires_session: bool,
    /// Filter expression. Only used together with `action`.
    pub filter: Option<String>,
    /// Action expression. Supplying one creates a custom rule.
    pub action: Option<String>,
    pub rule_name: Option<String>,
}

impl SubscriptionParams {
    /// Parameters for subscription `name` under `topic_path`.
    pub fn new(topic_path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            topic_path: topic_path.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Raw parameters for any entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RawParams {
    Queue(QueueParams),
    Topic(TopicParams),
    Subscription(SubscriptionParams),
}

impl RawParams {
    /// The entity kind these parameters describe.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            RawParams::Queue(_) => EntityKind::Queue,
            RawParams::Topic(_) => EntityKind::Topic,
            RawParams::Subscription(_) => EntityKind::Subscription,
        }
    }
}

impl From<QueueParams> for RawParams {
    fn from(params: QueueParams) -> Self {
        RawParams::Queue(params)
    }
}

impl From<TopicParams> for RawParams {
    fn from(params: TopicParams) -> Self {
        RawParams::Topic(params)
    }
}

impl From<SubscriptionParams> for RawParams {
    fn from(params: SubscriptionParams) -> Self {
        RawParams::Subscription(params)
    }
}
