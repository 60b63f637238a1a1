//! Conversations domain state and auth backend integration

use axum::extract::FromRef;
use chatvault_auth::AuthBackend;

use crate::service::{ConversationStore, FeedbackManager, MessageIngestionPipeline};

/// Application state for the Conversations domain
#[derive(Clone)]
pub struct ConversationsState {
    pub store: ConversationStore,
    pub pipeline: MessageIngestionPipeline,
    pub feedback: FeedbackManager,
    pub auth: AuthBackend,
}

impl FromRef<ConversationsState> for AuthBackend {
    fn from_ref(state: &ConversationsState) -> Self {
        state.auth.clone()
    }
}
