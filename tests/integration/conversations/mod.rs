//! Conversation endpoint integration tests

use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::common::{anonymous_request, authed_request, create_test_jwt, parse_body, TestApp};

mod test_create_conversation {
    use super::*;

    #[tokio::test]
    async fn test_create_returns_201_with_id_and_title() {
        let app = TestApp::new().unwrap();
        let jwt = app.register("alice").await.unwrap();

        let resp = app
            .send(authed_request(
                Method::POST,
                "/api/v1/conversations/",
                &jwt,
                Some(json!({"title": "Q3 revenue"})),
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body = parse_body(resp).await;
        assert_eq!(body["title"], "Q3 revenue");
        assert!(!body["conversation_id"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_without_trailing_slash() {
        let app = TestApp::new().unwrap();
        let jwt = app.register("alice").await.unwrap();

        let resp = app
            .send(authed_request(
                Method::POST,
                "/api/v1/conversations",
                &jwt,
                Some(json!({"title": "No slash"})),
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let app = TestApp::new().unwrap();
        let jwt = app.register("alice").await.unwrap();

        let resp = app
            .send(authed_request(
                Method::POST,
                "/api/v1/conversations/",
                &jwt,
                Some(json!({"title": ""})),
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = parse_body(resp).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_create_for_unregistered_user_is_404() {
        let app = TestApp::new().unwrap();
        let jwt = create_test_jwt("ghost", &app.config.secret_key).unwrap();

        let resp = app
            .send(authed_request(
                Method::POST,
                "/api/v1/conversations/",
                &jwt,
                Some(json!({"title": "Hello"})),
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body = parse_body(resp).await;
        assert_eq!(body["error"]["message"], "Not found: User not found");
    }
}

mod test_list_conversations {
    use super::*;

    #[tokio::test]
    async fn test_list_in_creation_order() {
        let app = TestApp::new().unwrap();
        let jwt = app.register("alice").await.unwrap();
        let first = app.create_conversation(&jwt, "First").await;
        let second = app.create_conversation(&jwt, "Second").await;

        let resp = app
            .send(authed_request(Method::GET, "/api/v1/conversations/", &jwt, None))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = parse_body(resp).await;
        let conversations = body["conversations"].as_array().unwrap();
        assert_eq!(conversations.len(), 2);
        assert_eq!(conversations[0]["conversation_id"], first.as_str());
        assert_eq!(conversations[0]["title"], "First");
        assert!(conversations[0]["last_interaction"].is_string());
        assert_eq!(conversations[1]["conversation_id"], second.as_str());
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let app = TestApp::new().unwrap();
        let alice = app.register("alice").await.unwrap();
        let bob = app.register("bob").await.unwrap();
        app.create_conversation(&alice, "Alice only").await;

        let resp = app
            .send(authed_request(Method::GET, "/api/v1/conversations/", &bob, None))
            .await;
        let body = parse_body(resp).await;
        assert!(body["conversations"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_bearer_is_401() {
        let app = TestApp::new().unwrap();

        let resp = app
            .send(anonymous_request(Method::GET, "/api/v1/conversations/", None))
            .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_token_signed_with_other_secret_is_401() {
        let app = TestApp::new().unwrap();
        app.register("alice").await.unwrap();
        let forged = create_test_jwt("alice", "some-other-secret").unwrap();

        let resp = app
            .send(authed_request(Method::GET, "/api/v1/conversations/", &forged, None))
            .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}

mod test_delete_conversation {
    use super::*;

    #[tokio::test]
    async fn test_delete_removes_conversation() {
        let app = TestApp::new().unwrap();
        let jwt = app.register("alice").await.unwrap();
        let keep = app.create_conversation(&jwt, "Keep").await;
        let gone = app.create_conversation(&jwt, "Gone").await;
        app.send_text(&jwt, &gone, "hello").await;

        let resp = app
            .send(authed_request(
                Method::DELETE,
                &format!("/api/v1/conversations/{}/", gone),
                &jwt,
                None,
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            parse_body(resp).await["message"],
            "Conversation deleted successfully"
        );

        let remaining = app.store.list_conversations("alice").await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].conversation_id, keep);
    }

    #[tokio::test]
    async fn test_delete_unknown_is_404_and_changes_nothing() {
        let app = TestApp::new().unwrap();
        let jwt = app.register("alice").await.unwrap();
        app.create_conversation(&jwt, "Keep").await;
        let before = app.store.lookup_user("alice").await.unwrap();

        let resp = app
            .send(authed_request(
                Method::DELETE,
                "/api/v1/conversations/does-not-exist",
                &jwt,
                None,
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            parse_body(resp).await["error"]["message"],
            "Not found: Conversation not found"
        );
        assert_eq!(app.store.lookup_user("alice").await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_cannot_delete_another_users_conversation() {
        let app = TestApp::new().unwrap();
        let alice = app.register("alice").await.unwrap();
        let bob = app.register("bob").await.unwrap();
        let id = app.create_conversation(&alice, "Private").await;

        let resp = app
            .send(authed_request(
                Method::DELETE,
                &format!("/api/v1/conversations/{}", id),
                &bob,
                None,
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(app.store.list_conversations("alice").await.unwrap().len(), 1);
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().unwrap();
    let resp = app
        .send(anonymous_request(Method::GET, "/health", None))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
}
