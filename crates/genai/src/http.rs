//! HTTP GenAI Service Implementation
//!
//! Calls the GenAI service's speech-to-text and LLM endpoints using reqwest.
//! Each call is attempted exactly once.

use reqwest::Client;
use std::time::Duration;

use crate::{
    GenAiConfig, GenAiError, GenAiService, InvokeInput, InvokeRequestBody, InvokeResponseBody,
    SpeechRequestBody, SpeechResponseBody,
};

/// GenAI service reached over HTTP
pub struct HttpGenAiService {
    client: Client,
    base_url: String,
    invoke_timeout: Duration,
    speech_timeout: Duration,
}

impl HttpGenAiService {
    /// Create a new HTTP GenAI service
    pub fn new(config: GenAiConfig) -> Result<Self, GenAiError> {
        if config.base_url.trim().is_empty() {
            return Err(GenAiError::Configuration(
                "GenAI base URL is required for the http provider".to_string(),
            ));
        }

        Ok(Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            invoke_timeout: config.invoke_timeout,
            speech_timeout: config.speech_timeout,
        })
    }

    async fn post_json<B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<reqwest::Response, GenAiError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenAiError::Timeout(timeout)
                } else {
                    GenAiError::Request(format!("HTTP request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(GenAiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

#[async_trait::async_trait]
impl GenAiService for HttpGenAiService {
    async fn speech_to_text(&self, audio_base64: &str) -> Result<String, GenAiError> {
        tracing::debug!(audio_len = audio_base64.len(), "Sending speech-to-text request");

        let response = self
            .post_json(
                "/speech/speech-to-text",
                &SpeechRequestBody { audio_base64 },
                self.speech_timeout,
            )
            .await?;

        let body: SpeechResponseBody = response
            .json()
            .await
            .map_err(|e| GenAiError::Response(format!("Failed to parse response: {}", e)))?;

        match body.transcription {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(GenAiError::EmptyTranscription),
        }
    }

    async fn invoke(&self, input: &InvokeInput) -> Result<Option<serde_json::Value>, GenAiError> {
        tracing::debug!(
            session_id = %input.session_id,
            message_id = %input.message_id,
            "Sending LLM invoke request"
        );

        let response = self
            .post_json(
                "/llm/invoke",
                &InvokeRequestBody { input },
                self.invoke_timeout,
            )
            .await?;

        let body: InvokeResponseBody = response
            .json()
            .await
            .map_err(|e| GenAiError::Response(format!("Failed to parse response: {}", e)))?;

        Ok(body.output)
    }
}
