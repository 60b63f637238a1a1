//! Chatvault application composition root
//!
//! Wires storage, the GenAI client and the auth backend into the
//! Conversations domain and exposes the resulting router.

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use chatvault_auth::{AuthBackend, AuthConfig};
use chatvault_common::Config;
use chatvault_conversations::{
    ConversationStore, ConversationsState, FeedbackManager, GenAiGateway, InMemoryStorage,
    IngestionOptions, MessageIngestionPipeline, PgStorage, StoragePort,
};
use chatvault_genai::{GenAiConfig, GenAiService, GenAiServiceFactory};

/// Largest accepted request body; audio questions arrive base64-encoded
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Create the main application router from configuration
pub async fn create_app(config: &Config) -> Result<Router, anyhow::Error> {
    let storage = create_storage(config).await?;

    let mut genai_config = GenAiConfig::new(&config.genai_provider, &config.genai_api_url);
    genai_config.invoke_timeout = Duration::from_secs(config.genai_timeout_secs);
    genai_config.speech_timeout = Duration::from_secs(config.genai_speech_timeout_secs);
    let genai: Arc<dyn GenAiService> = Arc::from(GenAiServiceFactory::create(genai_config)?);

    let state = build_state(config, storage, genai)?;
    Ok(router(state))
}

/// Select the storage adapter named by `STORAGE_PROVIDER`
pub async fn create_storage(config: &Config) -> Result<Arc<dyn StoragePort>, anyhow::Error> {
    match config.storage_provider.as_str() {
        "postgres" => {
            let url = config.database_url.as_deref().ok_or_else(|| {
                anyhow::anyhow!("DATABASE_URL is required for the postgres storage provider")
            })?;
            let storage = PgStorage::connect(url).await?;
            tracing::info!("Postgres storage ready");
            Ok(Arc::new(storage))
        }
        "memory" => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(InMemoryStorage::new()))
        }
        other => Err(anyhow::anyhow!(
            "Unknown storage provider: {}. Supported providers: postgres, memory",
            other
        )),
    }
}

/// Assemble domain state around an already chosen storage and GenAI service
pub fn build_state(
    config: &Config,
    storage: Arc<dyn StoragePort>,
    genai: Arc<dyn GenAiService>,
) -> Result<ConversationsState, anyhow::Error> {
    let auth = AuthBackend::new(AuthConfig::new(
        config.secret_key.clone(),
        &config.algorithm,
    )?);

    let store =
        ConversationStore::new(storage).with_max_write_attempts(config.store_max_write_attempts);
    let gateway = GenAiGateway::new(genai, store.clone());
    let options = IngestionOptions {
        generate_text_answers: config.generate_text_answers,
        persist_generated_answers: config.persist_generated_answers,
    };

    Ok(ConversationsState {
        pipeline: MessageIngestionPipeline::new(store.clone(), gateway, options),
        feedback: FeedbackManager::new(store.clone()),
        store,
        auth,
    })
}

/// Compose domain routes with shared infrastructure routes
pub fn router(state: ConversationsState) -> Router {
    Router::new()
        .route("/health", axum::routing::get(health_check))
        .route(
            "/",
            axum::routing::get(|| async { "Chatvault API v0.0.1-SNAPSHOT" }),
        )
        .merge(chatvault_conversations::routes().with_state(state))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

/// CORS for the configured browser origins; unparseable origins are skipped
pub fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

pub fn body_limit_layer() -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(MAX_BODY_BYTES)
}

/// Wrap the router with tracing, CORS and the request size limit.
///
/// Each layer is applied to the router separately so every one of them sees
/// axum's own body type.
pub fn with_http_layers(app: Router, cors_origins: &[String]) -> Router {
    app.layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(cors_origins))
        .layer(body_limit_layer())
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
