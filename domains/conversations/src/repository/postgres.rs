//! Postgres storage adapter
//!
//! Conversations are kept as a single JSONB array on the `users` row.

use sqlx::types::Json;
use sqlx::PgPool;

use chatvault_common::{Error, Result};

use super::{ReplaceOutcome, StoragePort, StoredAggregate};
use crate::domain::entities::{Conversation, UserAggregate};

#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    username: String,
    hashed_password: String,
    conversations: Json<Vec<Conversation>>,
    version: i64,
}

impl From<UserRow> for StoredAggregate {
    fn from(row: UserRow) -> Self {
        StoredAggregate {
            aggregate: UserAggregate {
                username: row.username,
                hashed_password: row.hashed_password,
                conversations: row.conversations.0,
            },
            version: row.version,
        }
    }
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and bring the schema up to date
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        let storage = Self::new(pool);
        storage.run_migrations().await?;
        Ok(storage)
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Internal(format!("Migration failed: {}", e)))
    }

    /// Get a reference to the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl StoragePort for PgStorage {
    async fn find_user(&self, username: &str) -> Result<Option<StoredAggregate>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT username, hashed_password, conversations, version
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(StoredAggregate::from))
    }

    async fn insert_user(&self, aggregate: &UserAggregate) -> Result<()> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO users (username, hashed_password, conversations, version)
            VALUES ($1, $2, $3, 0)
            ON CONFLICT (username) DO NOTHING
            "#,
        )
        .bind(&aggregate.username)
        .bind(&aggregate.hashed_password)
        .bind(Json(&aggregate.conversations))
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() == 0 {
            return Err(Error::Conflict(format!(
                "User '{}' already exists",
                aggregate.username
            )));
        }
        Ok(())
    }

    async fn replace_conversations(
        &self,
        username: &str,
        expected_version: i64,
        conversations: &[Conversation],
    ) -> Result<ReplaceOutcome> {
        let updated = sqlx::query(
            r#"
            UPDATE users
            SET conversations = $3, version = version + 1, updated_at = NOW()
            WHERE username = $1 AND version = $2
            "#,
        )
        .bind(username)
        .bind(expected_version)
        .bind(Json(conversations))
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 1 {
            return Ok(ReplaceOutcome::Replaced);
        }

        // Nothing matched: either the user is gone or the version moved on
        let exists: Option<(i64,)> = sqlx::query_as("SELECT version FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(match exists {
            Some(_) => ReplaceOutcome::VersionConflict,
            None => ReplaceOutcome::NotFound,
        })
    }

    async fn append_conversation(
        &self,
        username: &str,
        conversation: &Conversation,
    ) -> Result<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE users
            SET conversations = conversations || jsonb_build_array($2::jsonb),
                version = version + 1,
                updated_at = NOW()
            WHERE username = $1
            "#,
        )
        .bind(username)
        .bind(Json(conversation))
        .execute(&self.pool)
        .await?;

        Ok(updated.rows_affected() == 1)
    }
}
