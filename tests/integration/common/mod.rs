//! Common test utilities and fixtures for integration tests
//!
//! - Application assembled over `InMemoryStorage` and `MockGenAiService`
//! - User registration and bearer token helpers
//! - Request and response helpers

use std::env;
use std::sync::{Arc, Once};

use anyhow::Result;
use axum::{
    body::Body,
    http::{Method, Request, Response, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use chatvault_common::config::{Config, DEFAULT_GENAI_API_URL};
use chatvault_conversations::{
    ConversationStore, ConversationsState, InMemoryStorage, StoragePort,
};
use chatvault_genai::mock::MockGenAiService;

static INIT: Once = Once::new();

/// Test environment configuration
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub secret_key: String,
    /// Only set when a Postgres instance is available for storage tests
    pub database_url: Option<String>,
}

impl TestConfig {
    pub fn from_env() -> Self {
        INIT.call_once(|| {
            dotenvy::from_filename(".env.test").ok();
        });

        Self {
            secret_key: env::var("TEST_SECRET_KEY")
                .unwrap_or_else(|_| "test_secret_key_for_testing_only".to_string()),
            database_url: env::var("TEST_DATABASE_URL").ok(),
        }
    }

    pub fn app_config(&self) -> Config {
        Config {
            storage_provider: "memory".to_string(),
            database_url: None,
            secret_key: self.secret_key.clone(),
            algorithm: "HS256".to_string(),
            genai_provider: "mock".to_string(),
            genai_api_url: DEFAULT_GENAI_API_URL.to_string(),
            genai_timeout_secs: 120,
            genai_speech_timeout_secs: 30,
            generate_text_answers: false,
            persist_generated_answers: true,
            store_max_write_attempts: 5,
            frontend_url: "http://localhost:3000".to_string(),
            backend_url: "http://localhost:8000".to_string(),
            rust_log: "info".to_string(),
            port: 8000,
        }
    }
}

/// Router plus handles on its storage and GenAI mock
pub struct TestApp {
    pub config: TestConfig,
    pub state: ConversationsState,
    pub store: ConversationStore,
    pub genai: MockGenAiService,
}

impl TestApp {
    pub fn new() -> Result<Self> {
        Self::with_config(|_| {})
    }

    /// Build the app after letting `adjust` change the configuration
    pub fn with_config(adjust: impl FnOnce(&mut Config)) -> Result<Self> {
        Self::build(adjust, Arc::new(InMemoryStorage::new()))
    }

    /// Build the app over a caller-supplied storage adapter
    pub fn with_storage(storage: Arc<dyn StoragePort>) -> Result<Self> {
        Self::build(|_| {}, storage)
    }

    fn build(adjust: impl FnOnce(&mut Config), storage: Arc<dyn StoragePort>) -> Result<Self> {
        let config = TestConfig::from_env();
        let mut app_config = config.app_config();
        adjust(&mut app_config);

        let genai = MockGenAiService::new();
        let state = chatvault_app::build_state(&app_config, storage, Arc::new(genai.clone()))?;

        Ok(Self {
            config,
            store: state.store.clone(),
            state,
            genai,
        })
    }

    pub fn router(&self) -> Router {
        chatvault_app::router(self.state.clone())
    }

    /// Register `username` and return a bearer token for them
    pub async fn register(&self, username: &str) -> Result<String> {
        self.store.register_user(username, "hashed-password").await?;
        create_test_jwt(username, &self.config.secret_key)
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// Create a conversation through the API and return its id
    pub async fn create_conversation(&self, jwt: &str, title: &str) -> String {
        let resp = self
            .send(authed_request(
                Method::POST,
                "/api/v1/conversations/",
                jwt,
                Some(json!({ "title": title })),
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        parse_body(resp).await["conversation_id"]
            .as_str()
            .expect("conversation_id")
            .to_string()
    }

    /// Ask a text question through the API and return the response body
    pub async fn send_text(&self, jwt: &str, conversation_id: &str, content: &str) -> Value {
        let resp = self
            .send(authed_request(
                Method::POST,
                &format!("/api/v1/conversations/{}/text/", conversation_id),
                jwt,
                Some(json!({ "question": { "type": "TEXT", "content": content } })),
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        parse_body(resp).await
    }

    pub async fn list_messages(&self, jwt: &str, conversation_id: &str) -> Vec<Value> {
        let resp = self
            .send(authed_request(
                Method::GET,
                &format!("/api/v1/conversations/{}/messages/", conversation_id),
                jwt,
                None,
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        parse_body(resp).await["messages"]
            .as_array()
            .cloned()
            .unwrap_or_default()
    }
}

/// Build an authenticated request
pub fn authed_request(method: Method, uri: &str, jwt: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", jwt));
    with_body(builder, body)
}

/// Build a request without credentials
pub fn anonymous_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    with_body(Request::builder().method(method).uri(uri), body)
}

fn with_body(builder: axum::http::request::Builder, body: Option<Value>) -> Request<Body> {
    match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&b).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Parse response body as JSON Value
pub async fn parse_body(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Create a test JWT token for a user
pub fn create_test_jwt(username: &str, secret: &str) -> Result<String> {
    use jsonwebtoken::{Algorithm, EncodingKey, Header};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct TestClaims {
        sub: String,
        exp: u64,
    }

    let now = chrono::Utc::now().timestamp() as u64;
    let claims = TestClaims {
        sub: username.to_string(),
        exp: now + 3600,
    };

    let header = Header::new(Algorithm::HS256);
    let encoding_key = EncodingKey::from_secret(secret.as_ref());

    Ok(jsonwebtoken::encode(&header, &claims, &encoding_key)?)
}
