//! Domain entities for the Conversations domain
//!
//! A user's conversations and messages live nested inside a single
//! `UserAggregate` document. Entities carry their own validation; the store
//! only ever persists values built through these constructors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chatvault_common::{Error, Result};

/// Placeholder answer stored while a turn has not been answered yet
pub const PENDING_ANSWER: &str = "Processing your request...";

/// Answer stored when the language model call fails
pub const GENERATION_FAILED_ANSWER: &str = "Sorry, an error occurred generating the response.";

/// Answer stored when the audio could not be transcribed
pub const UNINTELLIGIBLE_AUDIO_ANSWER: &str =
    "Sorry, I could not understand the audio. Please try again.";

/// Output used when the language model answers without an `output` field
pub const NO_LLM_RESPONSE: &str = "No response from LLM";

/// Maximum conversation title length
const MAX_TITLE_LENGTH: usize = 200;

/// Kind of content carried by a question or an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContentType {
    Text,
    Audio,
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentType::Text => write!(f, "TEXT"),
            ContentType::Audio => write!(f, "AUDIO"),
        }
    }
}

/// User feedback on an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Feedback {
    Like,
    Dislike,
}

impl std::fmt::Display for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Feedback::Like => write!(f, "LIKE"),
            Feedback::Dislike => write!(f, "DISLIKE"),
        }
    }
}

impl std::str::FromStr for Feedback {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "LIKE" => Ok(Feedback::Like),
            "DISLIKE" => Ok(Feedback::Dislike),
            other => Err(Error::Validation(format!(
                "Invalid feedback '{}': expected LIKE or DISLIKE",
                other
            ))),
        }
    }
}

/// Answer content: plain text, or whatever structure the model produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerContent {
    Text(String),
    Structured(serde_json::Value),
}

impl AnswerContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerContent::Text(s) => Some(s),
            AnswerContent::Structured(_) => None,
        }
    }
}

impl From<&str> for AnswerContent {
    fn from(s: &str) -> Self {
        AnswerContent::Text(s.to_string())
    }
}

/// Chart attached to an answer.
///
/// Older documents hold the chart as a JSON-encoded string; newer ones hold
/// the structure itself. `resolve` is the only place the two are told apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeneratedChart {
    Encoded(String),
    Structured(serde_json::Value),
}

impl GeneratedChart {
    /// Structured form of the chart; `None` when the encoded form does not decode
    pub fn resolve(&self) -> Option<serde_json::Value> {
        match self {
            GeneratedChart::Structured(value) => Some(value.clone()),
            GeneratedChart::Encoded(raw) => match serde_json::from_str(raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding undecodable generated_chart");
                    None
                }
            },
        }
    }
}

/// The user's side of a turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "type")]
    pub kind: ContentType,
    pub content: String,
    #[serde(default)]
    pub transcription: Option<String>,
}

impl Question {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: ContentType::Text,
            content: content.into(),
            transcription: None,
        }
    }

    pub fn audio(audio_base64: impl Into<String>, transcription: Option<String>) -> Self {
        Self {
            kind: ContentType::Audio,
            content: audio_base64.into(),
            transcription,
        }
    }
}

/// The assistant's side of a turn; always text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(rename = "type")]
    pub kind: ContentType,
    pub content: AnswerContent,
    #[serde(default)]
    pub generated_chart: Option<GeneratedChart>,
}

impl Answer {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: ContentType::Text,
            content: AnswerContent::Text(content.into()),
            generated_chart: None,
        }
    }

    pub fn pending() -> Self {
        Self::text(PENDING_ANSWER)
    }

    /// Build an answer from the language model's `output` value.
    ///
    /// An object with a `content` key is read as an answer record (its
    /// `generated_chart`, if any, is kept); a bare string becomes text; any
    /// other value is kept whole as structured content.
    pub fn from_output(output: &serde_json::Value) -> Self {
        match output {
            serde_json::Value::String(s) => Self::text(s.clone()),
            serde_json::Value::Object(map) if map.contains_key("content") => {
                let content = match &map["content"] {
                    serde_json::Value::String(s) => AnswerContent::Text(s.clone()),
                    other => AnswerContent::Structured(other.clone()),
                };
                let generated_chart = match map.get("generated_chart") {
                    None | Some(serde_json::Value::Null) => None,
                    Some(serde_json::Value::String(s)) => Some(GeneratedChart::Encoded(s.clone())),
                    Some(other) => Some(GeneratedChart::Structured(other.clone())),
                };
                Self {
                    kind: ContentType::Text,
                    content,
                    generated_chart,
                }
            }
            other => Self {
                kind: ContentType::Text,
                content: AnswerContent::Structured(other.clone()),
                generated_chart: None,
            },
        }
    }
}

/// One question/answer turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: String,
    pub question: Question,
    pub answer: Answer,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub feedback: Option<Feedback>,
    #[serde(default)]
    pub tools: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub data: Option<Vec<serde_json::Value>>,
}

impl Message {
    /// Create a new message with a fresh id, stamped now.
    ///
    /// Typed questions must carry text. Audio content may be empty.
    pub fn new(question: Question, answer: Answer) -> Result<Self> {
        if question.kind == ContentType::Text && question.content.trim().is_empty() {
            return Err(Error::Validation(
                "Question content cannot be empty or whitespace-only".to_string(),
            ));
        }

        Ok(Message {
            message_id: Uuid::new_v4().to_string(),
            question,
            answer,
            timestamp: Utc::now(),
            feedback: None,
            tools: None,
            data: None,
        })
    }
}

/// Read-side view of a message with the chart resolved to structured form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageView {
    pub message_id: String,
    pub question: Question,
    pub answer: AnswerView,
    pub timestamp: DateTime<Utc>,
    pub feedback: Option<Feedback>,
    pub tools: Option<serde_json::Map<String, serde_json::Value>>,
    pub data: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerView {
    #[serde(rename = "type")]
    pub kind: ContentType,
    pub content: AnswerContent,
    pub generated_chart: Option<serde_json::Value>,
}

impl From<Message> for MessageView {
    fn from(m: Message) -> Self {
        let generated_chart = m.answer.generated_chart.as_ref().and_then(GeneratedChart::resolve);
        Self {
            message_id: m.message_id,
            question: m.question,
            answer: AnswerView {
                kind: m.answer.kind,
                content: m.answer.content,
                generated_chart,
            },
            timestamp: m.timestamp,
            feedback: m.feedback,
            tools: m.tools,
            data: m.data,
        }
    }
}

/// A titled thread of messages, in append order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub conversation_id: String,
    pub title: String,
    pub last_interaction: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Create a new, empty conversation
    pub fn new(title: String) -> Result<Self> {
        if title.trim().is_empty() {
            return Err(Error::Validation("Title is required".to_string()));
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(Error::Validation(format!(
                "Title must be at most {} characters",
                MAX_TITLE_LENGTH
            )));
        }

        Ok(Conversation {
            conversation_id: Uuid::new_v4().to_string(),
            title,
            last_interaction: Utc::now(),
            messages: Vec::new(),
        })
    }

    pub fn find_message_mut(&mut self, message_id: &str) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.message_id == message_id)
    }

    #[mutants::skip] // Clock-dependent
    pub fn touch(&mut self) {
        self.last_interaction = Utc::now();
    }
}

/// Everything stored for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAggregate {
    pub username: String,
    /// Produced and checked by the credential service; opaque here
    pub hashed_password: String,
    #[serde(default)]
    pub conversations: Vec<Conversation>,
}

impl UserAggregate {
    pub fn new(username: String, hashed_password: String) -> Result<Self> {
        if username.trim().is_empty() {
            return Err(Error::Validation("Username is required".to_string()));
        }

        Ok(UserAggregate {
            username,
            hashed_password,
            conversations: Vec::new(),
        })
    }

    pub fn find_conversation(&self, conversation_id: &str) -> Option<&Conversation> {
        self.conversations
            .iter()
            .find(|c| c.conversation_id == conversation_id)
    }
}
