//! Conversations domain: per-user conversation history, message ingestion, feedback

pub mod api;
pub mod domain;
pub mod repository;
pub mod service;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{
    Answer, AnswerContent, ContentType, Conversation, Feedback, GeneratedChart, Message,
    MessageView, Question, UserAggregate, GENERATION_FAILED_ANSWER, PENDING_ANSWER,
    UNINTELLIGIBLE_AUDIO_ANSWER,
};
pub use domain::state::{MessageEvent, MessageState, MessageStateMachine, StateError};

// Re-export repository types
pub use repository::{InMemoryStorage, PgStorage, ReplaceOutcome, StoragePort, StoredAggregate};

// Re-export services
pub use service::{
    ConversationStore, FeedbackManager, GenAiGateway, IngestionOptions, MessageIngestionPipeline,
    Reply,
};

// Re-export API types
pub use api::routes;
pub use api::ConversationsState;
