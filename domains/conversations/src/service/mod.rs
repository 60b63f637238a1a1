//! Services for the Conversations domain

pub mod feedback;
pub mod gateway;
pub mod ingestion;
pub mod store;

pub use feedback::FeedbackManager;
pub use gateway::GenAiGateway;
pub use ingestion::{IngestedMessage, IngestionOptions, MessageIngestionPipeline, Reply};
pub use store::{ConversationStore, NotFoundKind, DEFAULT_MAX_WRITE_ATTEMPTS};
