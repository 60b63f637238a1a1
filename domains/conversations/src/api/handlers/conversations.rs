//! Conversation management API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chatvault_auth::AuthUser;
use chatvault_common::{Result, ValidatedJson};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::middleware::ConversationsState;
use crate::domain::entities::Conversation;

/// Request for creating a conversation
#[derive(Debug, Deserialize, Validate)]
pub struct CreateConversationRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct CreateConversationResponse {
    pub conversation_id: String,
    pub title: String,
}

/// Conversation summary; messages are fetched separately
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub conversation_id: String,
    pub title: String,
    pub last_interaction: DateTime<Utc>,
    pub message_count: usize,
}

impl From<Conversation> for ConversationResponse {
    fn from(c: Conversation) -> Self {
        Self {
            conversation_id: c.conversation_id,
            title: c.title,
            last_interaction: c.last_interaction,
            message_count: c.messages.len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConversationListResponse {
    pub conversations: Vec<ConversationResponse>,
}

#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub message: String,
}

/// Create a new conversation
pub async fn create_conversation(
    AuthUser(ctx): AuthUser,
    State(state): State<ConversationsState>,
    ValidatedJson(req): ValidatedJson<CreateConversationRequest>,
) -> Result<(StatusCode, Json<CreateConversationResponse>)> {
    let conversation_id = state
        .store
        .create_conversation(&ctx.username, &req.title)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateConversationResponse {
            conversation_id,
            title: req.title,
        }),
    ))
}

/// List conversations for the authenticated user
pub async fn list_conversations(
    AuthUser(ctx): AuthUser,
    State(state): State<ConversationsState>,
) -> Result<Json<ConversationListResponse>> {
    let conversations = state.store.list_conversations(&ctx.username).await?;

    Ok(Json(ConversationListResponse {
        conversations: conversations.into_iter().map(Into::into).collect(),
    }))
}

/// Delete a conversation and all of its messages
pub async fn delete_conversation(
    AuthUser(ctx): AuthUser,
    State(state): State<ConversationsState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<StatusMessage>> {
    state
        .store
        .delete_conversation(&ctx.username, &conversation_id)
        .await?;

    Ok(Json(StatusMessage {
        message: "Conversation deleted successfully".to_string(),
    }))
}
