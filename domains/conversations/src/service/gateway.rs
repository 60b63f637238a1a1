//! Gateway to the GenAI service
//!
//! Neither call fails outward. A failed transcription becomes `None`; a failed
//! generation rewrites the stored answer with a fixed apology and becomes `None`.

use std::sync::Arc;

use chatvault_genai::{GenAiService, InvokeInput};

use super::store::ConversationStore;
use crate::domain::entities::{AnswerContent, GENERATION_FAILED_ANSWER, NO_LLM_RESPONSE};

#[derive(Clone)]
pub struct GenAiGateway {
    service: Arc<dyn GenAiService>,
    store: ConversationStore,
}

impl GenAiGateway {
    pub fn new(service: Arc<dyn GenAiService>, store: ConversationStore) -> Self {
        Self { service, store }
    }

    pub async fn speech_to_text(&self, audio_base64: &str) -> Option<String> {
        match self.service.speech_to_text(audio_base64).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(error = %e, "Speech-to-text failed");
                None
            }
        }
    }

    /// Run one generation for the stored message named by `input`.
    ///
    /// On failure the message's answer is overwritten with the failure text.
    pub async fn llm_invoke(&self, input: &InvokeInput) -> Option<serde_json::Value> {
        match self.service.invoke(input).await {
            Ok(Some(output)) => Some(output),
            Ok(None) => {
                tracing::warn!(
                    session_id = %input.session_id,
                    message_id = %input.message_id,
                    "LLM response carried no output"
                );
                Some(serde_json::json!({ "content": NO_LLM_RESPONSE }))
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    session_id = %input.session_id,
                    message_id = %input.message_id,
                    "LLM invocation failed"
                );
                self.compensate(input).await;
                None
            }
        }
    }

    async fn compensate(&self, input: &InvokeInput) {
        let result = self
            .store
            .update_message_field(
                &input.user_name,
                &input.session_id,
                &input.message_id,
                |message| message.answer.content = AnswerContent::from(GENERATION_FAILED_ANSWER),
            )
            .await;

        if let Err(e) = result {
            tracing::error!(
                error = %e,
                session_id = %input.session_id,
                message_id = %input.message_id,
                "Failed to record generation failure on message"
            );
        }
    }
}
