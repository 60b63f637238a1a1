//! Storage port for user aggregates
//!
//! The whole of a user's history is one document. Adapters keep a `version`
//! beside it that is bumped on every write; `replace_conversations` only
//! succeeds against the version that was read.

pub mod memory;
pub mod postgres;

use chatvault_common::Result;

use crate::domain::entities::{Conversation, UserAggregate};

pub use memory::InMemoryStorage;
pub use postgres::PgStorage;

/// An aggregate together with the version it was read at
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAggregate {
    pub aggregate: UserAggregate,
    pub version: i64,
}

/// Result of a conditional replace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    Replaced,
    /// The document changed since it was read
    VersionConflict,
    NotFound,
}

/// Document store holding one aggregate per username
#[async_trait::async_trait]
pub trait StoragePort: Send + Sync {
    async fn find_user(&self, username: &str) -> Result<Option<StoredAggregate>>;

    /// Insert a new aggregate; `Error::Conflict` if the username is taken
    async fn insert_user(&self, aggregate: &UserAggregate) -> Result<()>;

    /// Overwrite the conversation list if the stored version still equals `expected_version`
    async fn replace_conversations(
        &self,
        username: &str,
        expected_version: i64,
        conversations: &[Conversation],
    ) -> Result<ReplaceOutcome>;

    /// Append one conversation without reading the existing list.
    /// Returns `false` when the user does not exist.
    async fn append_conversation(&self, username: &str, conversation: &Conversation)
        -> Result<bool>;
}
