//! Feedback on answers

use chatvault_common::Result;

use super::store::ConversationStore;
use crate::domain::entities::Feedback;

#[derive(Clone)]
pub struct FeedbackManager {
    store: ConversationStore,
}

impl FeedbackManager {
    pub fn new(store: ConversationStore) -> Self {
        Self { store }
    }

    /// Overwrite a message's feedback with `value` (LIKE or DISLIKE).
    ///
    /// Anything else is rejected before storage is touched.
    pub async fn set_feedback(
        &self,
        username: &str,
        conversation_id: &str,
        message_id: &str,
        value: &str,
    ) -> Result<Feedback> {
        let feedback: Feedback = value.parse()?;

        self.store
            .update_message_field(username, conversation_id, message_id, |message| {
                message.feedback = Some(feedback)
            })
            .await?;

        tracing::info!(
            username = %username,
            conversation_id = %conversation_id,
            message_id = %message_id,
            feedback = %feedback,
            "Recorded feedback"
        );
        Ok(feedback)
    }
}
