//! Conversation store
//!
//! All access to user aggregates goes through here. Mutations other than
//! conversation creation run read → modify → conditional replace, and the
//! whole cycle is re-run when another writer got in first.

use std::sync::Arc;

use chatvault_common::{Error, Result};

use crate::domain::entities::{Conversation, Message, MessageView, UserAggregate};
use crate::repository::{ReplaceOutcome, StoragePort};

/// Default bound on read-modify-write cycles per mutation
pub const DEFAULT_MAX_WRITE_ATTEMPTS: u32 = 5;

/// Which entity a lookup failed to find
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundKind {
    User,
    Conversation,
    Message,
}

impl From<NotFoundKind> for Error {
    fn from(kind: NotFoundKind) -> Self {
        let what = match kind {
            NotFoundKind::User => "User",
            NotFoundKind::Conversation => "Conversation",
            NotFoundKind::Message => "Message",
        };
        Error::NotFound(format!("{} not found", what))
    }
}

#[derive(Clone)]
pub struct ConversationStore {
    storage: Arc<dyn StoragePort>,
    max_write_attempts: u32,
}

impl ConversationStore {
    pub fn new(storage: Arc<dyn StoragePort>) -> Self {
        Self {
            storage,
            max_write_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
        }
    }

    pub fn with_max_write_attempts(mut self, attempts: u32) -> Self {
        self.max_write_attempts = attempts.max(1);
        self
    }

    /// Create an empty aggregate for a new user
    pub async fn register_user(&self, username: &str, hashed_password: &str) -> Result<()> {
        let aggregate = UserAggregate::new(username.to_string(), hashed_password.to_string())?;
        self.storage.insert_user(&aggregate).await?;
        tracing::info!(username = %username, "Registered user");
        Ok(())
    }

    pub async fn lookup_user(&self, username: &str) -> Result<UserAggregate> {
        let stored = self
            .storage
            .find_user(username)
            .await?
            .ok_or(NotFoundKind::User)?;
        Ok(stored.aggregate)
    }

    /// Create a conversation and return its id.
    ///
    /// Appended in place, so it does not race with other writers.
    pub async fn create_conversation(&self, username: &str, title: &str) -> Result<String> {
        let conversation = Conversation::new(title.to_string())?;

        if !self
            .storage
            .append_conversation(username, &conversation)
            .await?
        {
            return Err(NotFoundKind::User.into());
        }

        tracing::info!(
            username = %username,
            conversation_id = %conversation.conversation_id,
            "Created conversation"
        );
        Ok(conversation.conversation_id)
    }

    pub async fn list_conversations(&self, username: &str) -> Result<Vec<Conversation>> {
        Ok(self.lookup_user(username).await?.conversations)
    }

    pub async fn delete_conversation(&self, username: &str, conversation_id: &str) -> Result<()> {
        self.modify(username, |conversations| {
            let before = conversations.len();
            conversations.retain(|c| c.conversation_id != conversation_id);
            if conversations.len() == before {
                return Err(NotFoundKind::Conversation.into());
            }
            Ok(())
        })
        .await?;

        tracing::info!(
            username = %username,
            conversation_id = %conversation_id,
            "Deleted conversation"
        );
        Ok(())
    }

    pub async fn append_message(
        &self,
        username: &str,
        conversation_id: &str,
        message: Message,
    ) -> Result<()> {
        let message_id = message.message_id.clone();

        self.modify(username, |conversations| {
            let conversation = find_conversation_mut(conversations, conversation_id)?;
            conversation.messages.push(message.clone());
            conversation.touch();
            Ok(())
        })
        .await?;

        tracing::debug!(
            username = %username,
            conversation_id = %conversation_id,
            message_id = %message_id,
            "Appended message"
        );
        Ok(())
    }

    /// Apply `mutation` to one stored message.
    ///
    /// The mutation may run more than once if the write has to be retried.
    pub async fn update_message_field<F>(
        &self,
        username: &str,
        conversation_id: &str,
        message_id: &str,
        mutation: F,
    ) -> Result<()>
    where
        F: Fn(&mut Message) + Send + Sync,
    {
        self.modify(username, |conversations| {
            let conversation = find_conversation_mut(conversations, conversation_id)?;
            let message = conversation
                .find_message_mut(message_id)
                .ok_or(NotFoundKind::Message)?;
            mutation(message);
            conversation.touch();
            Ok(())
        })
        .await
    }

    /// Messages of one conversation, oldest first, charts resolved
    pub async fn list_messages(
        &self,
        username: &str,
        conversation_id: &str,
    ) -> Result<Vec<MessageView>> {
        let user = self.lookup_user(username).await?;
        let conversation = user
            .conversations
            .into_iter()
            .find(|c| c.conversation_id == conversation_id)
            .ok_or(NotFoundKind::Conversation)?;

        let mut messages = conversation.messages;
        messages.sort_by_key(|m| m.timestamp);

        Ok(messages.into_iter().map(MessageView::from).collect())
    }

    async fn modify<T, F>(&self, username: &str, mut apply: F) -> Result<T>
    where
        F: FnMut(&mut Vec<Conversation>) -> Result<T> + Send,
        T: Send,
    {
        for attempt in 1..=self.max_write_attempts {
            let stored = self
                .storage
                .find_user(username)
                .await?
                .ok_or(NotFoundKind::User)?;

            let mut conversations = stored.aggregate.conversations;
            let output = apply(&mut conversations)?;

            match self
                .storage
                .replace_conversations(username, stored.version, &conversations)
                .await?
            {
                ReplaceOutcome::Replaced => return Ok(output),
                ReplaceOutcome::NotFound => return Err(NotFoundKind::User.into()),
                ReplaceOutcome::VersionConflict => {
                    tracing::debug!(
                        username = %username,
                        attempt,
                        "Concurrent write detected, re-reading aggregate"
                    );
                }
            }
        }

        tracing::warn!(
            username = %username,
            attempts = self.max_write_attempts,
            "Giving up after repeated write conflicts"
        );
        Err(Error::Conflict(
            "Conversation history was modified concurrently, please retry".to_string(),
        ))
    }
}

fn find_conversation_mut<'a>(
    conversations: &'a mut [Conversation],
    conversation_id: &str,
) -> Result<&'a mut Conversation> {
    conversations
        .iter_mut()
        .find(|c| c.conversation_id == conversation_id)
        .ok_or_else(|| NotFoundKind::Conversation.into())
}
