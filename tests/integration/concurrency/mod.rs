//! Concurrent requests against one user's history

use std::sync::{Arc, Mutex};

use axum::http::{Method, StatusCode};
use serde_json::json;

use chatvault_common::Result;
use chatvault_conversations::{
    Conversation, InMemoryStorage, ReplaceOutcome, StoragePort, StoredAggregate, UserAggregate,
};

use crate::common::{authed_request, TestApp};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_requests_lose_no_updates() {
    let app = TestApp::new().unwrap();
    let jwt = app.register("alice").await.unwrap();
    let id = app.create_conversation(&jwt, "Busy").await;
    let first = app.send_text(&jwt, &id, "first").await;
    let first_id = first["message_id"].as_str().unwrap().to_string();

    let mut handles = Vec::new();
    for i in 0..8 {
        let router = app.router();
        let request = authed_request(
            Method::POST,
            &format!("/api/v1/conversations/{}/text", id),
            &jwt,
            Some(json!({"question": {"type": "TEXT", "content": format!("q{}", i)}})),
        );
        handles.push((
            false,
            tokio::spawn(async move {
                tower::ServiceExt::oneshot(router, request).await.unwrap().status()
            }),
        ));
    }
    let router = app.router();
    let feedback = authed_request(
        Method::PUT,
        &format!("/api/v1/conversations/{}/messages/{}/feedback", id, first_id),
        &jwt,
        Some(json!({"feedback": "LIKE"})),
    );
    handles.push((
        true,
        tokio::spawn(async move {
            tower::ServiceExt::oneshot(router, feedback)
                .await
                .unwrap()
                .status()
        }),
    ));

    let mut appended = 0;
    let mut feedback_applied = false;
    for (is_feedback, handle) in handles {
        match (is_feedback, handle.await.unwrap()) {
            (false, StatusCode::CREATED) => appended += 1,
            (true, StatusCode::OK) => feedback_applied = true,
            (_, StatusCode::CONFLICT) => {}
            (_, other) => panic!("unexpected status {other}"),
        }
    }

    // Every request that reported success is reflected in storage
    let messages = app.list_messages(&jwt, &id).await;
    assert_eq!(messages.len(), 1 + appended);
    let liked = messages
        .iter()
        .find(|m| m["message_id"] == first_id.as_str())
        .unwrap();
    if feedback_applied {
        assert_eq!(liked["feedback"], "LIKE");
    }
}

/// Creates a conversation between a writer's read and its conditional replace
struct CreatesConversationMidWrite {
    inner: InMemoryStorage,
    pending: Mutex<Option<Conversation>>,
}

#[async_trait::async_trait]
impl StoragePort for CreatesConversationMidWrite {
    async fn find_user(&self, username: &str) -> Result<Option<StoredAggregate>> {
        self.inner.find_user(username).await
    }

    async fn insert_user(&self, aggregate: &UserAggregate) -> Result<()> {
        self.inner.insert_user(aggregate).await
    }

    async fn replace_conversations(
        &self,
        username: &str,
        expected_version: i64,
        conversations: &[Conversation],
    ) -> Result<ReplaceOutcome> {
        let pending = self.pending.lock().unwrap().take();
        if let Some(conversation) = pending {
            self.inner.append_conversation(username, &conversation).await?;
        }
        self.inner
            .replace_conversations(username, expected_version, conversations)
            .await
    }

    async fn append_conversation(
        &self,
        username: &str,
        conversation: &Conversation,
    ) -> Result<bool> {
        self.inner.append_conversation(username, conversation).await
    }
}

#[tokio::test]
async fn test_conversation_created_during_append_survives() {
    let storage = Arc::new(CreatesConversationMidWrite {
        inner: InMemoryStorage::new(),
        pending: Mutex::new(None),
    });
    let app = TestApp::with_storage(storage.clone()).unwrap();
    let jwt = app.register("alice").await.unwrap();
    let id = app.create_conversation(&jwt, "One").await;

    let created = Conversation::new("Two".to_string()).unwrap();
    let created_id = created.conversation_id.clone();
    *storage.pending.lock().unwrap() = Some(created);

    let append = app.send_text(&jwt, &id, "hello").await;
    assert!(append["message_id"].is_string());
    assert!(storage.pending.lock().unwrap().is_none());

    let conversations = app.store.list_conversations("alice").await.unwrap();
    assert_eq!(conversations.len(), 2);
    assert_eq!(conversations[0].messages.len(), 1);
    assert_eq!(conversations[1].conversation_id, created_id);
}
