//! Postgres storage adapter tests
//!
//! Skipped unless `TEST_DATABASE_URL` points at a disposable database.

use serial_test::serial;
use tokio_test::{assert_err, assert_ok};

use chatvault_common::Error;
use chatvault_conversations::{
    Conversation, PgStorage, ReplaceOutcome, StoragePort, UserAggregate,
};

use crate::common::TestConfig;

async fn storage() -> Option<PgStorage> {
    let url = TestConfig::from_env().database_url?;
    let storage = PgStorage::connect(&url).await.expect("connect to test database");
    sqlx::query("DELETE FROM users")
        .execute(storage.pool())
        .await
        .expect("clean users table");
    Some(storage)
}

fn user(name: &str) -> UserAggregate {
    UserAggregate::new(name.to_string(), "hashed".to_string()).unwrap()
}

#[tokio::test]
#[serial]
async fn test_insert_find_and_conflict() {
    let Some(storage) = storage().await else {
        return;
    };

    assert_ok!(storage.insert_user(&user("alice")).await);
    let result = storage.insert_user(&user("alice")).await;
    assert!(matches!(assert_err!(result), Error::Conflict(_)));

    let stored = storage.find_user("alice").await.unwrap().unwrap();
    assert_eq!(stored.version, 0);
    assert!(stored.aggregate.conversations.is_empty());
    assert!(storage.find_user("bob").await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn test_append_and_versioned_replace() {
    let Some(storage) = storage().await else {
        return;
    };
    storage.insert_user(&user("alice")).await.unwrap();

    let first = Conversation::new("First".to_string()).unwrap();
    assert!(storage.append_conversation("alice", &first).await.unwrap());
    assert!(!storage.append_conversation("ghost", &first).await.unwrap());

    let stored = storage.find_user("alice").await.unwrap().unwrap();
    assert_eq!(stored.version, 1);
    assert_eq!(stored.aggregate.conversations, vec![first.clone()]);

    let second = Conversation::new("Second".to_string()).unwrap();
    let outcome = storage
        .replace_conversations("alice", 1, &[first.clone(), second.clone()])
        .await
        .unwrap();
    assert_eq!(outcome, ReplaceOutcome::Replaced);

    let stale = storage
        .replace_conversations("alice", 1, &[])
        .await
        .unwrap();
    assert_eq!(stale, ReplaceOutcome::VersionConflict);

    let missing = storage
        .replace_conversations("ghost", 0, &[])
        .await
        .unwrap();
    assert_eq!(missing, ReplaceOutcome::NotFound);

    let stored = storage.find_user("alice").await.unwrap().unwrap();
    assert_eq!(stored.version, 2);
    assert_eq!(stored.aggregate.conversations, vec![first, second]);
}
