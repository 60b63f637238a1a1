//! Message ingestion
//!
//! Turns an incoming text or audio question into a stored message and, where
//! configured, an answer from the language model.

use base64::Engine;
use serde::Serialize;

use chatvault_common::{Error, Result};
use chatvault_genai::InvokeInput;

use super::gateway::GenAiGateway;
use super::store::ConversationStore;
use crate::domain::entities::{
    Answer, GeneratedChart, Message, Question, GENERATION_FAILED_ANSWER, PENDING_ANSWER,
    UNINTELLIGIBLE_AUDIO_ANSWER,
};
use crate::domain::state::{MessageEvent, MessageState, MessageStateMachine, StateError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionOptions {
    /// Generate answers for typed questions as well as spoken ones
    pub generate_text_answers: bool,
    /// Write successful generations back into the stored message
    pub persist_generated_answers: bool,
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            generate_text_answers: false,
            persist_generated_answers: true,
        }
    }
}

/// Answer returned to the caller of an ingestion
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    /// One of the fixed placeholder or apology strings
    Fixed(String),
    /// Language model output, with any encoded chart decoded
    Generated(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestedMessage {
    pub message_id: String,
    pub answer: Reply,
}

#[derive(Clone)]
pub struct MessageIngestionPipeline {
    store: ConversationStore,
    gateway: GenAiGateway,
    options: IngestionOptions,
}

impl MessageIngestionPipeline {
    pub fn new(store: ConversationStore, gateway: GenAiGateway, options: IngestionOptions) -> Self {
        Self {
            store,
            gateway,
            options,
        }
    }

    pub fn options(&self) -> IngestionOptions {
        self.options
    }

    pub async fn create_text_message(
        &self,
        username: &str,
        conversation_id: &str,
        question: &str,
    ) -> Result<IngestedMessage> {
        let message = Message::new(Question::text(question), Answer::pending())?;
        let message_id = message.message_id.clone();
        let create_time = message.timestamp.to_rfc3339();

        self.store
            .append_message(username, conversation_id, message)
            .await?;
        tracing::info!(
            username = %username,
            conversation_id = %conversation_id,
            message_id = %message_id,
            "Stored text message"
        );

        if !self.options.generate_text_answers {
            return Ok(IngestedMessage {
                message_id,
                answer: Reply::Fixed(PENDING_ANSWER.to_string()),
            });
        }

        let input = InvokeInput {
            message: question.to_string(),
            session_id: conversation_id.to_string(),
            user_name: username.to_string(),
            create_time,
            message_id: message_id.clone(),
        };
        let answer = self.generate(MessageState::Created, &input).await?;

        Ok(IngestedMessage { message_id, answer })
    }

    pub async fn create_audio_message(
        &self,
        username: &str,
        conversation_id: &str,
        audio_base64: &str,
    ) -> Result<IngestedMessage> {
        let audio = normalize_audio(audio_base64);

        // Fail fast on a bad conversation before paying for transcription
        let user = self.store.lookup_user(username).await?;
        if user.find_conversation(conversation_id).is_none() {
            return Err(super::store::NotFoundKind::Conversation.into());
        }

        let state = MessageState::Created;

        let transcription = if is_transcribable(&audio) {
            self.gateway.speech_to_text(&audio).await
        } else {
            tracing::warn!(
                username = %username,
                conversation_id = %conversation_id,
                audio_len = audio.len(),
                "Audio payload is empty or not base64, skipping transcription"
            );
            None
        };

        let Some(transcription) = transcription else {
            advance(state, MessageEvent::TranscriptionFailed)?;

            let message = Message::new(
                Question::audio(audio, None),
                Answer::text(UNINTELLIGIBLE_AUDIO_ANSWER),
            )?;
            let message_id = message.message_id.clone();
            self.store
                .append_message(username, conversation_id, message)
                .await?;
            tracing::info!(
                username = %username,
                conversation_id = %conversation_id,
                message_id = %message_id,
                "Stored untranscribable audio message"
            );

            return Ok(IngestedMessage {
                message_id,
                answer: Reply::Fixed(UNINTELLIGIBLE_AUDIO_ANSWER.to_string()),
            });
        };

        let state = advance(state, MessageEvent::TranscriptionSucceeded)?;

        let message = Message::new(
            Question::audio(audio, Some(transcription.clone())),
            Answer::pending(),
        )?;
        let message_id = message.message_id.clone();
        let create_time = message.timestamp.to_rfc3339();
        self.store
            .append_message(username, conversation_id, message)
            .await?;
        tracing::info!(
            username = %username,
            conversation_id = %conversation_id,
            message_id = %message_id,
            "Stored audio message"
        );

        let input = InvokeInput {
            message: transcription,
            session_id: conversation_id.to_string(),
            user_name: username.to_string(),
            create_time,
            message_id: message_id.clone(),
        };
        let answer = self.generate(state, &input).await?;

        Ok(IngestedMessage { message_id, answer })
    }

    async fn generate(&self, state: MessageState, input: &InvokeInput) -> Result<Reply> {
        let Some(output) = self.gateway.llm_invoke(input).await else {
            advance(state, MessageEvent::GenerationFailed)?;
            return Ok(Reply::Fixed(GENERATION_FAILED_ANSWER.to_string()));
        };

        advance(state, MessageEvent::GenerationSucceeded)?;

        if self.options.persist_generated_answers {
            let answer = Answer::from_output(&output);
            self.store
                .update_message_field(
                    &input.user_name,
                    &input.session_id,
                    &input.message_id,
                    |message| message.answer = answer.clone(),
                )
                .await?;
        }

        Ok(Reply::Generated(with_resolved_chart(output)))
    }
}

fn advance(state: MessageState, event: MessageEvent) -> Result<MessageState> {
    let next = MessageStateMachine::transition(state, event)
        .map_err(|e: StateError| Error::Internal(e.to_string()))?;
    tracing::debug!(from = %state, to = %next, "Message state transition");
    Ok(next)
}

/// Strip an optional `data:<mime>;base64,` prefix
fn normalize_audio(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data.to_string(),
        _ => trimmed.to_string(),
    }
}

/// Whether the payload holds any decodable audio bytes
fn is_transcribable(payload: &str) -> bool {
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .is_ok_and(|bytes| !bytes.is_empty())
}

/// Replace an encoded `generated_chart` with its structured form, or null
fn with_resolved_chart(mut output: serde_json::Value) -> serde_json::Value {
    let resolved = match output.get("generated_chart") {
        Some(serde_json::Value::String(raw)) => GeneratedChart::Encoded(raw.clone())
            .resolve()
            .unwrap_or(serde_json::Value::Null),
        _ => return output,
    };
    output["generated_chart"] = resolved;
    output
}
