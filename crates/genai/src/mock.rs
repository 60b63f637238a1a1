//! Mock GenAI Service Implementation
//!
//! Programmable mock for testing message ingestion:
//! - `MockGenAiService`: records every call, answers per `MockGenAiBehavior`
//! - `MockTranscription`: Text, Empty, or Fail
//! - `MockInvokeOutcome`: Echo, Answer, MissingOutput, or Fail

use crate::{GenAiError, GenAiService, InvokeInput};
use std::sync::{Arc, Mutex, RwLock};

/// What speech-to-text should produce
#[derive(Debug, Clone, PartialEq)]
pub enum MockTranscription {
    Text(String),
    /// Service answers with an empty transcription
    Empty,
    /// Service answers with a non-success status
    Fail,
}

impl Default for MockTranscription {
    fn default() -> Self {
        MockTranscription::Text("Mock transcription".to_string())
    }
}

/// What LLM invocation should produce
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MockInvokeOutcome {
    /// `{"type": "TEXT", "content": "Mock response to: <message>"}`
    #[default]
    Echo,
    /// A fixed output value
    Answer(serde_json::Value),
    /// Successful response without an `output` field
    MissingOutput,
    /// Service answers with a non-success status
    Fail,
}

/// Programmable behavior for the mock GenAI service
#[derive(Debug, Clone, Default)]
pub struct MockGenAiBehavior {
    pub transcription: Arc<RwLock<MockTranscription>>,
    pub invoke: Arc<RwLock<MockInvokeOutcome>>,
}

impl MockGenAiBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_transcription(&self, transcription: MockTranscription) {
        *self.transcription.write().unwrap() = transcription;
    }

    pub fn set_invoke_outcome(&self, outcome: MockInvokeOutcome) {
        *self.invoke.write().unwrap() = outcome;
    }

    pub fn reset(&self) {
        *self.transcription.write().unwrap() = MockTranscription::default();
        *self.invoke.write().unwrap() = MockInvokeOutcome::default();
    }

    fn transcription(&self) -> MockTranscription {
        self.transcription.read().unwrap().clone()
    }

    fn invoke_outcome(&self) -> MockInvokeOutcome {
        self.invoke.read().unwrap().clone()
    }
}

/// Mock GenAI service with programmable behavior and call recording
#[derive(Debug, Clone, Default)]
pub struct MockGenAiService {
    behavior: MockGenAiBehavior,
    speech_calls: Arc<Mutex<Vec<String>>>,
    invoke_calls: Arc<Mutex<Vec<InvokeInput>>>,
}

impl MockGenAiService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for changing outcomes after the service has been shared
    pub fn behavior(&self) -> &MockGenAiBehavior {
        &self.behavior
    }

    /// Audio payloads received by speech-to-text, in call order
    pub fn speech_calls(&self) -> Vec<String> {
        self.speech_calls
            .lock()
            .expect("speech call log poisoned")
            .clone()
    }

    /// Inputs received by LLM invocation, in call order
    pub fn invoke_calls(&self) -> Vec<InvokeInput> {
        self.invoke_calls
            .lock()
            .expect("invoke call log poisoned")
            .clone()
    }
}

#[async_trait::async_trait]
impl GenAiService for MockGenAiService {
    async fn speech_to_text(&self, audio_base64: &str) -> Result<String, GenAiError> {
        tracing::debug!("Mock GenAI: speech-to-text");
        self.speech_calls
            .lock()
            .map_err(|e| GenAiError::Request(format!("speech call log poisoned: {e}")))?
            .push(audio_base64.to_string());

        match self.behavior.transcription() {
            MockTranscription::Text(text) => Ok(text),
            MockTranscription::Empty => Err(GenAiError::EmptyTranscription),
            MockTranscription::Fail => Err(GenAiError::Status {
                status: 500,
                body: "mock speech-to-text failure".to_string(),
            }),
        }
    }

    async fn invoke(&self, input: &InvokeInput) -> Result<Option<serde_json::Value>, GenAiError> {
        tracing::debug!(message_id = %input.message_id, "Mock GenAI: invoke");
        self.invoke_calls
            .lock()
            .map_err(|e| GenAiError::Request(format!("invoke call log poisoned: {e}")))?
            .push(input.clone());

        match self.behavior.invoke_outcome() {
            MockInvokeOutcome::Echo => Ok(Some(serde_json::json!({
                "type": "TEXT",
                "content": format!("Mock response to: {}", input.message),
            }))),
            MockInvokeOutcome::Answer(value) => Ok(Some(value)),
            MockInvokeOutcome::MissingOutput => Ok(None),
            MockInvokeOutcome::Fail => Err(GenAiError::Status {
                status: 500,
                body: "mock invoke failure".to_string(),
            }),
        }
    }
}
