//! Description normalizer
//!
//! Turns raw parameter sets into canonical [`EntityDescription`]s. Pure: no
//! broker calls, same input always yields the same description.
//!
//! Rules applied:
//!
//! - Auto-delete-on-idle below the broker's 5 minute floor is treated as unset.
//! - Zero or negative time-to-live and duplicate-detection windows mean
//!   "broker default" and are omitted.
//! - Lock durations are capped at 5 minutes; unset means the kind default.
//! - Partitioning disables ordering support regardless of what was asked.
//! - A subscription action binds with its filter (default `1=1`) into one
//!   named rule. Without an action no custom rule is created.

use std::time::Duration;

use broker_client::entity::{
    CommonSettings, EntityDescription, EntityPath, EntitySettings, FilterRule, QueueTopicSettings,
    SubscriptionSettings,
};
use broker_client::types::EntityKind;
use tracing::debug;

use crate::error::{ProvisioningError, ProvisioningResult};
use crate::params::{QueueParams, RawParams, SubscriptionParams, TopicParams};

/// Smallest auto-delete-on-idle interval the broker accepts, in minutes.
pub const AUTO_DELETE_ON_IDLE_FLOOR_MINUTES: i64 = 5;

/// Duplicate detection window used when detection is on but no window given.
pub const DEFAULT_DUPLICATE_DETECTION_WINDOW: Duration = Duration::from_secs(10 * 60);

/// Longest lock the broker grants.
pub const MAX_LOCK_DURATION: Duration = Duration::from_secs(5 * 60);

pub const DEFAULT_QUEUE_LOCK_DURATION: Duration = Duration::from_secs(60);

pub const DEFAULT_SUBSCRIPTION_LOCK_DURATION: Duration = Duration::from_secs(30);

pub const DEFAULT_MAX_DELIVERY_COUNT: u32 = 10;

pub const DEFAULT_MAX_SIZE_MEGABYTES: u32 = 1024;

/// Normalize `raw` into the canonical description of a `kind` entity.
pub fn normalize(kind: EntityKind, raw: &RawParams) -> ProvisioningResult<EntityDescription> {
    if raw.kind() != kind {
        return Err(ProvisioningError::validation(
            "parameters",
            format!("{} parameters supplied for a {kind}", raw.kind()),
        ));
    }

    match raw {
        RawParams::Queue(params) => normalize_queue(params),
        RawParams::Topic(params) => normalize_topic(params),
        RawParams::Subscription(params) => normalize_subscription(params),
    }
}

/// Normalize queue parameters.
pub fn normalize_queue(params: &QueueParams) -> ProvisioningResult<EntityDescription> {
    require("entity path", &params.path)?;

    let common = CommonSettings {
        auto_delete_on_idle: auto_delete_on_idle(params.auto_delete_on_idle_minutes),
        default_message_time_to_live: positive_minutes(params.default_message_ttl_minutes),
        enable_batched_operations: params.enable_batched_operations.unwrap_or(true),
        lock_duration: Some(lock_duration(
            params.lock_duration_seconds,
            DEFAULT_QUEUE_LOCK_DURATION,
        )),
        max_delivery_count: positive_u32(params.max_delivery_count)
            .unwrap_or(DEFAULT_MAX_DELIVERY_COUNT),
        requires_duplicate_detection: params.requires_duplicate_detection,
        duplicate_detection_history_time_window: duplicate_window(
            params.requires_duplicate_detection,
            params.duplicate_detection_window_minutes,
        ),
        support_ordering: params.support_ordering && !params.enable_partitioning,
        user_metadata: non_blank(params.user_metadata.as_deref()),
    };

    Ok(EntityDescription {
        path: EntityPath::queue(params.path.clone()),
        common,
        settings: EntitySettings::Queue(QueueTopicSettings {
            max_size_in_megabytes: positive_u32(params.max_size_megabytes)
                .unwrap_or(DEFAULT_MAX_SIZE_MEGABYTES),
            enable_partitioning: params.enable_partitioning,
            is_anonymous_accessible: params.is_anonymous_accessible,
            forward_to: non_blank(params.forward_to.as_deref()),
        }),
    })
}

/// Normalize topic parameters.
pub fn normalize_topic(params: &TopicParams) -> ProvisioningResult<EntityDescription> {
    require("entity path", &params.path)?;

    let common = CommonSettings {
        auto_delete_on_idle: auto_delete_on_idle(params.auto_delete_on_idle_minutes),
        default_message_time_to_live: positive_minutes(params.default_message_ttl_minutes),
        enable_batched_operations: params.enable_batched_operations.unwrap_or(true),
        lock_duration: None,
        max_delivery_count: DEFAULT_MAX_DELIVERY_COUNT,
        requires_duplicate_detection: params.requires_duplicate_detection,
        duplicate_detection_history_time_window: duplicate_window(
            params.requires_duplicate_detection,
            params.duplicate_detection_window_minutes,
        ),
        support_ordering: params.support_ordering && !params.enable_partitioning,
        user_metadata: non_blank(params.user_metadata.as_deref()),
    };

    Ok(EntityDescription {
        path: EntityPath::topic(params.path.clone()),
        common,
        settings: EntitySettings::Topic(QueueTopicSettings {
            max_size_in_megabytes: positive_u32(params.max_size_megabytes)
                .unwrap_or(DEFAULT_MAX_SIZE_MEGABYTES),
            enable_partitioning: params.enable_partitioning,
            is_anonymous_accessible: params.is_anonymous_accessible,
            forward_to: non_blank(params.forward_to.as_deref()),
        }),
    })
}

/// Normalize subscription parameters.
pub fn normalize_subscription(
    params: &SubscriptionParams,
) -> ProvisioningResult<EntityDescription> {
    require("topic path", &params.topic_path)?;
    require("subscription name", &params.name)?;

    let common = CommonSettings {
        auto_delete_on_idle: auto_delete_on_idle(params.auto_delete_on_idle_minutes),
        default_message_time_to_live: positive_minutes(params.default_message_ttl_minutes),
        enable_batched_operations: params.enable_batched_operations.unwrap_or(true),
        lock_duration: Some(lock_duration(
            params.lock_duration_seconds,
            DEFAULT_SUBSCRIPTION_LOCK_DURATION,
        )),
        max_delivery_count: positive_u32(params.max_delivery_count)
            .unwrap_or(DEFAULT_MAX_DELIVERY_COUNT),
        requires_duplicate_detection: false,
        duplicate_detection_history_time_window: None,
        support_ordering: false,
        user_metadata: non_blank(params.user_metadata.as_deref()),
    };

    Ok(EntityDescription {
        path: EntityPath::subscription(params.topic_path.clone(), params.name.clone()),
        common,
        settings: EntitySettings::Subscription(SubscriptionSettings {
            enable_dead_lettering_on_message_expiration: params
                .dead_lettering_on_message_expiration,
            enable_dead_lettering_on_filter_evaluation_exceptions: params
                .dead_lettering_on_filter_evaluation_exceptions,
            requires_session: params.requires_session,
            rule: subscription_rule(params),
        }),
    })
}

fn subscription_rule(params: &SubscriptionParams) -> Option<FilterRule> {
    let filter = non_blank(params.filter.as_deref());

    let Some(action) = non_blank(params.action.as_deref()) else {
        if filter.is_some() {
            debug!(
                topic = %params.topic_path,
                subscription = %params.name,
                "Filter supplied without an action, broker default rule applies"
            );
        }
        return None;
    };

    let name = non_blank(params.rule_name.as_deref())
        .unwrap_or_else(|| FilterRule::DEFAULT_NAME.to_string());
    let filter = filter.unwrap_or_else(|| FilterRule::MATCH_ALL.to_string());

    Some(FilterRule::new(name, filter).with_action(action))
}

fn require(field: &'static str, value: &str) -> ProvisioningResult<()> {
    if value.trim().is_empty() {
        return Err(ProvisioningError::validation(field, "must not be empty"));
    }
    Ok(())
}

fn auto_delete_on_idle(minutes: Option<i64>) -> Option<Duration> {
    minutes
        .filter(|m| *m >= AUTO_DELETE_ON_IDLE_FLOOR_MINUTES)
        .map(minutes_to_duration)
}

fn positive_minutes(minutes: Option<i64>) -> Option<Duration> {
    minutes.filter(|m| *m > 0).map(minutes_to_duration)
}

fn duplicate_window(enabled: bool, minutes: Option<i64>) -> Option<Duration> {
    if !enabled {
        return None;
    }
    Some(positive_minutes(minutes).unwrap_or(DEFAULT_DUPLICATE_DETECTION_WINDOW))
}

fn lock_duration(seconds: Option<i64>, default: Duration) -> Duration {
    seconds
        .filter(|s| *s > 0)
        .map(|s| Duration::from_secs(s.unsigned_abs()).min(MAX_LOCK_DURATION))
        .unwrap_or(default)
}

fn positive_u32(value: Option<i64>) -> Option<u32> {
    value
        .filter(|v| *v > 0)
        .map(|v| u32::try_from(v).unwrap_or(u32::MAX))
}

fn minutes_to_duration(minutes: i64) -> Duration {
    Duration::from_secs(minutes.unsigned_abs().saturating_mul(60))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
