//! Route definitions for Conversations domain API
//!
//! Every path is also served with a trailing slash; browser clients send both.

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use super::handlers::{conversations, messages};
use super::middleware::ConversationsState;

const BASE: &str = "/api/v1/conversations";

/// Create conversation routes
fn conversation_routes() -> Router<ConversationsState> {
    let collection =
        get(conversations::list_conversations).post(conversations::create_conversation);
    let item = delete(conversations::delete_conversation);

    Router::new()
        .route(BASE, collection.clone())
        .route(&format!("{BASE}/"), collection)
        .route(&format!("{BASE}/{{conversation_id}}"), item.clone())
        .route(&format!("{BASE}/{{conversation_id}}/"), item)
}

/// Create message routes
fn message_routes() -> Router<ConversationsState> {
    let text = post(messages::create_text_message);
    let audio = post(messages::create_audio_message);
    let list = get(messages::list_messages);
    let feedback = put(messages::set_feedback);

    Router::new()
        .route(&format!("{BASE}/{{conversation_id}}/text"), text.clone())
        .route(&format!("{BASE}/{{conversation_id}}/text/"), text)
        .route(&format!("{BASE}/{{conversation_id}}/audio"), audio.clone())
        .route(&format!("{BASE}/{{conversation_id}}/audio/"), audio)
        .route(&format!("{BASE}/{{conversation_id}}/messages"), list.clone())
        .route(&format!("{BASE}/{{conversation_id}}/messages/"), list)
        .route(
            &format!("{BASE}/{{conversation_id}}/messages/{{message_id}}/feedback"),
            feedback.clone(),
        )
        .route(
            &format!("{BASE}/{{conversation_id}}/messages/{{message_id}}/feedback/"),
            feedback,
        )
}

/// Create all Conversations domain API routes
pub fn routes() -> Router<ConversationsState> {
    Router::new()
        .merge(conversation_routes())
        .merge(message_routes())
}
