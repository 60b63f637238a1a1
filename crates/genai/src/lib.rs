//! Chatvault GenAI Service
//!
//! Client for the external generative-AI service:
//! - Speech-to-text (`POST {base}/speech/speech-to-text`)
//! - LLM invocation (`POST {base}/llm/invoke`)
//! - Mock service with programmable outcomes for testing and development
//!
//! This crate reports failures as `GenAiError`; deciding what a failure means
//! for a stored conversation is left to the caller.

pub mod http;
pub mod mock;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default timeout for LLM invocation; generation is slow.
pub const DEFAULT_INVOKE_TIMEOUT: Duration = Duration::from_secs(120);

/// Default timeout for speech-to-text
pub const DEFAULT_SPEECH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum GenAiError {
    #[error("GenAI configuration error: {0}")]
    Configuration(String),

    #[error("GenAI request error: {0}")]
    Request(String),

    #[error("GenAI request timed out after {0:?}")]
    Timeout(Duration),

    #[error("GenAI service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("GenAI response error: {0}")]
    Response(String),

    #[error("GenAI returned an empty transcription")]
    EmptyTranscription,
}

/// One conversational turn sent to the language model.
///
/// `session_id` is the conversation id and `message_id` the stored message the
/// answer belongs to, so the service can correlate the turn with its history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeInput {
    pub message: String,
    pub session_id: String,
    pub user_name: String,
    #[serde(rename = "createTime")]
    pub create_time: String,
    pub message_id: String,
}

/// Wire body of `POST /llm/invoke`
#[derive(Debug, Serialize)]
pub(crate) struct InvokeRequestBody<'a> {
    pub input: &'a InvokeInput,
}

/// Wire body returned by `POST /llm/invoke`
#[derive(Debug, Deserialize)]
pub(crate) struct InvokeResponseBody {
    #[serde(default)]
    pub output: Option<serde_json::Value>,
}

/// Wire body of `POST /speech/speech-to-text`
#[derive(Debug, Serialize)]
pub(crate) struct SpeechRequestBody<'a> {
    pub audio_base64: &'a str,
}

/// Wire body returned by `POST /speech/speech-to-text`
#[derive(Debug, Deserialize)]
pub(crate) struct SpeechResponseBody {
    #[serde(default)]
    pub transcription: Option<String>,
}

/// GenAI service configuration
#[derive(Debug, Clone)]
pub struct GenAiConfig {
    /// Provider (http, mock)
    pub provider: String,
    /// Base URL of the GenAI service
    pub base_url: String,
    pub invoke_timeout: Duration,
    pub speech_timeout: Duration,
}

impl GenAiConfig {
    pub fn new(provider: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            base_url: base_url.into(),
            invoke_timeout: DEFAULT_INVOKE_TIMEOUT,
            speech_timeout: DEFAULT_SPEECH_TIMEOUT,
        }
    }
}

/// GenAI service trait for different implementations
#[async_trait::async_trait]
pub trait GenAiService: Send + Sync {
    /// Transcribe base64-encoded audio. An empty transcription is an error.
    async fn speech_to_text(&self, audio_base64: &str) -> Result<String, GenAiError>;

    /// Run one LLM turn. Returns the response's `output` field, `None` when absent.
    async fn invoke(&self, input: &InvokeInput) -> Result<Option<serde_json::Value>, GenAiError>;
}

/// Factory for creating GenAiService implementations
pub struct GenAiServiceFactory;

impl GenAiServiceFactory {
    pub fn create(config: GenAiConfig) -> Result<Box<dyn GenAiService>, GenAiError> {
        match config.provider.as_str() {
            "http" => {
                tracing::info!(base_url = %config.base_url, "Creating HTTP GenAI service");
                Ok(Box::new(http::HttpGenAiService::new(config)?))
            }
            "mock" => {
                tracing::info!("Creating mock GenAI service");
                Ok(Box::new(mock::MockGenAiService::new()))
            }
            provider => Err(GenAiError::Configuration(format!(
                "Unknown GenAI provider: {}. Supported providers: http, mock",
                provider
            ))),
        }
    }
}
