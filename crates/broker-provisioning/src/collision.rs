//! Collision guard
//!
//! Queues and topics share one path namespace, so a queue or topic path is
//! queried under both kinds before either is created.

use broker_client::entity::EntityPath;
use broker_client::traits::EntityClient;
use broker_client::types::EntityKind;
use tracing::debug;

use crate::error::{ProvisioningError, ProvisioningResult};

/// Where a path currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Nothing exists at the path.
    Absent,
    /// An entity of the requested kind exists.
    ExistsAsSelf,
    /// An entity of another kind holds the path.
    ExistsAsOther(EntityKind),
}

/// Pre-creation existence checks against one namespace.
pub struct CollisionGuard<'a> {
    client: &'a dyn EntityClient,
}

impl<'a> CollisionGuard<'a> {
    /// Guard creations through `client`.
    pub fn new(client: &'a dyn EntityClient) -> Self {
        Self { client }
    }

    /// Query where `path` currently lives.
    ///
    /// Queue and topic paths are checked under both kinds. Subscriptions only
    /// under their own (topic, name) pair.
    pub async fn presence(&self, path: &EntityPath) -> ProvisioningResult<Presence> {
        let own = self.client.exists(path).await?;
        let other = match path.sibling() {
            Some(sibling) if self.client.exists(&sibling).await? => Some(sibling.kind()),
            _ => None,
        };

        let presence = match (own, other) {
            (true, _) => Presence::ExistsAsSelf,
            (false, Some(existing)) => Presence::ExistsAsOther(existing),
            (false, None) => Presence::Absent,
        };

        debug!(path = %path, kind = %path.kind(), presence = ?presence, "Checked path presence");
        Ok(presence)
    }

    /// Fail unless `path` is free for an entity of its kind.
    pub async fn check(&self, path: &EntityPath) -> ProvisioningResult<()> {
        match self.presence(path).await? {
            Presence::Absent => Ok(()),
            Presence::ExistsAsSelf => Err(ProvisioningError::AlreadyExists {
                kind: path.kind(),
                path: path.to_string(),
            }),
            Presence::ExistsAsOther(existing) => Err(ProvisioningError::CrossKindCollision {
                path: path.to_string(),
                requested: path.kind(),
                existing,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use broker_client::entity::{EntityDescription, EntityHandle, FilterRule};
    use broker_client::error::{ClientError, ClientResult};
    use broker_client::async_trait;
    use std::collections::HashSet;

    /// Client answering existence queries from fixed sets.
    #[derive(Default)]
    struct FixedClient {
        queues: HashSet<String>,
        topics: HashSet<String>,
        subscriptions: HashSet<(String, String)>,
        fail_topic_lookup: bool,
    }

    #[async_trait]
    impl EntityClient for FixedClient {
        async fn queue_exists(&self, path: &str) -> ClientResult<bool> {
            Ok(self.queues.contains(path))
        }

        async fn topic_exists(&self, path: &str) -> ClientResult<bool> {
            if self.fail_topic_lookup {
                return Err(ClientError::unavailable("topic lookup failed"));
            }
            Ok(self.topics.contains(path))
        }

        async fn subscription_exists(&self, topic: &str, name: &str) -> ClientResult<bool> {
            Ok(self
                .subscriptions
                .contains(&(topic.to_string(), name.to_string())))
        }

        async fn create_queue(&self, _: &EntityDescription) -> ClientResult<EntityHandle> {
            unreachable!("guard never creates")
        }

        async fn create_topic(&self, _: &EntityDescription) -> ClientResult<EntityHandle> {
            unreachable!("guard never creates")
        }

        async fn create_subscription(
            &self,
            _: &EntityDescription,
            _: Option<&FilterRule>,
        ) -> ClientResult<EntityHandle> {
            unreachable!("guard never creates")
        }

        async fn delete_queue(&self, _: &str) -> ClientResult<()> {
            unreachable!("guard never deletes")
        }

        async fn delete_topic(&self, _: &str) -> ClientResult<()> {
            unreachable!("guard never deletes")
        }

        async fn delete_subscription(&self, _: &str, _: &str) -> ClientResult<()> {
            unreachable!("guard never deletes")
        }

        async fn message_count(&self, _: &EntityPath) -> ClientResult<u64> {
            Ok(0)
        }
    }

    fn client_with(queues: &[&str], topics: &[&str]) -> FixedClient {
        FixedClient {
            queues: queues.iter().map(|s| (*s).to_string()).collect(),
            topics: topics.iter().map(|s| (*s).to_string()).collect(),
            ..FixedClient::default()
        }
    }

    #[tokio::test]
    async fn test_presence_tri_state() {
        let client = client_with(&["orders"], &["events"]);
        let guard = CollisionGuard::new(&client);

        assert_eq!(
            guard.presence(&EntityPath::queue("orders")).await.unwrap(),
            Presence::ExistsAsSelf
        );
        assert_eq!(
            guard.presence(&EntityPath::queue("events")).await.unwrap(),
            Presence::ExistsAsOther(EntityKind::Topic)
        );
        assert_eq!(
            guard.presence(&EntityPath::topic("orders")).await.unwrap(),
            Presence::ExistsAsOther(EntityKind::Queue)
        );
        assert_eq!(
            guard.presence(&EntityPath::topic("billing")).await.unwrap(),
            Presence::Absent
        );
    }

    #[tokio::test]
    async fn test_check_cross_kind_collision() {
        let client = client_with(&[], &["orders"]);
        let guard = CollisionGuard::new(&client);

        let err = guard.check(&EntityPath::queue("orders")).await.unwrap_err();
        assert!(matches!(
            err,
            ProvisioningError::CrossKindCollision {
                requested: EntityKind::Queue,
                existing: EntityKind::Topic,
                ..
            }
        ));
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn test_check_already_exists() {
        let client = client_with(&["orders"], &[]);
        let guard = CollisionGuard::new(&client);

        let err = guard.check(&EntityPath::queue("orders")).await.unwrap_err();
        assert!(matches!(err, ProvisioningError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_subscription_ignores_queue_topic_namespace() {
        let mut client = client_with(&["audit"], &["events"]);
        client
            .subscriptions
            .insert(("events".to_string(), "existing".to_string()));
        let guard = CollisionGuard::new(&client);

        assert!(guard
            .check(&EntityPath::subscription("events", "audit"))
            .await
            .is_ok());
        let err = guard
            .check(&EntityPath::subscription("events", "existing"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProvisioningError::AlreadyExists {
                kind: EntityKind::Subscription,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_lookup_errors_are_not_swallowed() {
        let client = FixedClient {
            fail_topic_lookup: true,
            ..FixedClient::default()
        };
        let guard = CollisionGuard::new(&client);

        let err = guard.check(&EntityPath::queue("orders")).await.unwrap_err();
        assert!(matches!(err, ProvisioningError::Transport(_)));
    }
}
