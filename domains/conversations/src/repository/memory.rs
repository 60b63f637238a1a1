//! In-memory storage adapter

use std::collections::HashMap;
use tokio::sync::RwLock;

use chatvault_common::{Error, Result};

use super::{ReplaceOutcome, StoragePort, StoredAggregate};
use crate::domain::entities::{Conversation, UserAggregate};

/// Aggregates held in process memory; lost on restart
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    users: RwLock<HashMap<String, StoredAggregate>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl StoragePort for InMemoryStorage {
    async fn find_user(&self, username: &str) -> Result<Option<StoredAggregate>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn insert_user(&self, aggregate: &UserAggregate) -> Result<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&aggregate.username) {
            return Err(Error::Conflict(format!(
                "User '{}' already exists",
                aggregate.username
            )));
        }
        users.insert(
            aggregate.username.clone(),
            StoredAggregate {
                aggregate: aggregate.clone(),
                version: 0,
            },
        );
        Ok(())
    }

    async fn replace_conversations(
        &self,
        username: &str,
        expected_version: i64,
        conversations: &[Conversation],
    ) -> Result<ReplaceOutcome> {
        let mut users = self.users.write().await;
        let Some(stored) = users.get_mut(username) else {
            return Ok(ReplaceOutcome::NotFound);
        };
        if stored.version != expected_version {
            return Ok(ReplaceOutcome::VersionConflict);
        }
        stored.aggregate.conversations = conversations.to_vec();
        stored.version += 1;
        Ok(ReplaceOutcome::Replaced)
    }

    async fn append_conversation(
        &self,
        username: &str,
        conversation: &Conversation,
    ) -> Result<bool> {
        let mut users = self.users.write().await;
        let Some(stored) = users.get_mut(username) else {
            return Ok(false);
        };
        stored.aggregate.conversations.push(conversation.clone());
        stored.version += 1;
        Ok(true)
    }
}
