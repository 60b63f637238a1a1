//! State machine for message answer lifecycle
//!
//! Created → (audio only) Transcribed | TranscriptionFailed → Answered | AnswerFailed.
//! Feedback is orthogonal and not tracked here.

pub use chatvault_common::StateError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageState {
    /// Stored with a placeholder answer
    Created,
    Transcribed,
    TranscriptionFailed,
    Answered,
    /// Answer overwritten by the compensating failure string
    AnswerFailed,
}

impl MessageState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::TranscriptionFailed | Self::Answered | Self::AnswerFailed
        )
    }

    /// Get all valid next states from current state
    pub fn valid_transitions(&self) -> &'static [MessageState] {
        match self {
            Self::Created => &[
                Self::Transcribed,
                Self::TranscriptionFailed,
                Self::Answered,
                Self::AnswerFailed,
            ],
            Self::Transcribed => &[Self::Answered, Self::AnswerFailed],
            Self::TranscriptionFailed | Self::Answered | Self::AnswerFailed => &[],
        }
    }
}

impl std::fmt::Display for MessageState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Transcribed => write!(f, "transcribed"),
            Self::TranscriptionFailed => write!(f, "transcription_failed"),
            Self::Answered => write!(f, "answered"),
            Self::AnswerFailed => write!(f, "answer_failed"),
        }
    }
}

/// Events that move a message through its lifecycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MessageEvent {
    TranscriptionSucceeded,
    TranscriptionFailed,
    GenerationSucceeded,
    GenerationFailed,
}

impl std::fmt::Display for MessageEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TranscriptionSucceeded => write!(f, "transcription_succeeded"),
            Self::TranscriptionFailed => write!(f, "transcription_failed"),
            Self::GenerationSucceeded => write!(f, "generation_succeeded"),
            Self::GenerationFailed => write!(f, "generation_failed"),
        }
    }
}

/// Message state machine
pub struct MessageStateMachine;

impl MessageStateMachine {
    /// Attempt a state transition
    pub fn transition(
        current: MessageState,
        event: MessageEvent,
    ) -> Result<MessageState, StateError> {
        if current.is_terminal() {
            return Err(StateError::TerminalState(current.to_string()));
        }

        let next = match (current, event) {
            (MessageState::Created, MessageEvent::TranscriptionSucceeded) => {
                MessageState::Transcribed
            }
            (MessageState::Created, MessageEvent::TranscriptionFailed) => {
                MessageState::TranscriptionFailed
            }
            (
                MessageState::Created | MessageState::Transcribed,
                MessageEvent::GenerationSucceeded,
            ) => MessageState::Answered,
            (
                MessageState::Created | MessageState::Transcribed,
                MessageEvent::GenerationFailed,
            ) => MessageState::AnswerFailed,
            _ => {
                return Err(StateError::InvalidTransition {
                    from: current.to_string(),
                    event: event.to_string(),
                });
            }
        };

        Ok(next)
    }
}
