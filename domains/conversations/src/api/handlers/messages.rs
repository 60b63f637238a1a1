//! Message API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chatvault_auth::AuthUser;
use chatvault_common::{Error, Result, ValidatedJson};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::middleware::ConversationsState;
use crate::domain::entities::{ContentType, Feedback, MessageView};
use crate::service::IngestedMessage;

/// Question as sent by the client.
///
/// Content is not checked here: blank text is refused when the message is
/// built, while empty audio is stored as an unintelligible turn.
#[derive(Debug, Deserialize, Validate)]
pub struct QuestionPayload {
    #[serde(rename = "type")]
    pub kind: ContentType,
    pub content: String,
}

impl QuestionPayload {
    fn expect_kind(self, expected: ContentType) -> Result<String> {
        if self.kind != expected {
            return Err(Error::Validation(format!(
                "Expected a {} question, got {}",
                expected, self.kind
            )));
        }
        Ok(self.content)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct TextMessageRequest {
    #[validate(nested)]
    pub question: QuestionPayload,
}

/// Audio arrives either as an AUDIO question or as a bare `base64_audio` field
#[derive(Debug, Deserialize, Validate)]
pub struct AudioMessageRequest {
    #[validate(nested)]
    pub question: Option<QuestionPayload>,
    pub base64_audio: Option<String>,
}

impl AudioMessageRequest {
    fn into_audio(self) -> Result<String> {
        match (self.question, self.base64_audio) {
            (Some(question), _) => question.expect_kind(ContentType::Audio),
            (None, Some(audio)) => Ok(audio),
            (None, None) => Err(Error::Validation(
                "Either question or base64_audio is required".to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct FeedbackRequest {
    pub feedback: String,
}

#[derive(Debug, Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<MessageView>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub message: String,
    pub feedback: Feedback,
}

/// Ask a typed question
pub async fn create_text_message(
    AuthUser(ctx): AuthUser,
    State(state): State<ConversationsState>,
    Path(conversation_id): Path<String>,
    ValidatedJson(req): ValidatedJson<TextMessageRequest>,
) -> Result<(StatusCode, Json<IngestedMessage>)> {
    let question = req.question.expect_kind(ContentType::Text)?;

    let ingested = state
        .pipeline
        .create_text_message(&ctx.username, &conversation_id, &question)
        .await?;

    Ok((StatusCode::CREATED, Json(ingested)))
}

/// Ask a spoken question
pub async fn create_audio_message(
    AuthUser(ctx): AuthUser,
    State(state): State<ConversationsState>,
    Path(conversation_id): Path<String>,
    ValidatedJson(req): ValidatedJson<AudioMessageRequest>,
) -> Result<(StatusCode, Json<IngestedMessage>)> {
    let audio = req.into_audio()?;

    let ingested = state
        .pipeline
        .create_audio_message(&ctx.username, &conversation_id, &audio)
        .await?;

    Ok((StatusCode::CREATED, Json(ingested)))
}

/// List messages of a conversation, oldest first
pub async fn list_messages(
    AuthUser(ctx): AuthUser,
    State(state): State<ConversationsState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<MessageListResponse>> {
    let messages = state
        .store
        .list_messages(&ctx.username, &conversation_id)
        .await?;

    Ok(Json(MessageListResponse { messages }))
}

/// Set LIKE or DISLIKE on a message
pub async fn set_feedback(
    AuthUser(ctx): AuthUser,
    State(state): State<ConversationsState>,
    Path((conversation_id, message_id)): Path<(String, String)>,
    ValidatedJson(req): ValidatedJson<FeedbackRequest>,
) -> Result<Json<FeedbackResponse>> {
    let feedback = state
        .feedback
        .set_feedback(&ctx.username, &conversation_id, &message_id, &req.feedback)
        .await?;

    Ok(Json(FeedbackResponse {
        message: "Feedback updated successfully".to_string(),
        feedback,
    }))
}
