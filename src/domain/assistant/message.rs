//! Thread messages as returned by the provider.

use serde::{Deserialize, Serialize};

/// Author of a thread message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One content segment of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { value: String },
    ImageFile { file_id: String },
    /// Segment types without a text representation.
    #[serde(other)]
    Unsupported,
}

impl MessageContent {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text { value } => Some(value),
            _ => None,
        }
    }
}

/// A message in a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub id: String,
    pub role: MessageRole,
    pub content: Vec<MessageContent>,
    /// Unix seconds.
    pub created_at: i64,
}

impl ThreadMessage {
    pub fn new(id: impl Into<String>, role: MessageRole, content: Vec<MessageContent>) -> Self {
        Self {
            id: id.into(),
            role,
            content,
            created_at: 0,
        }
    }

    /// Text segments joined with newlines, in order.
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .filter_map(MessageContent::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Text of the most recent assistant message.
///
/// `messages` must be ordered newest first, which is how the provider port
/// returns them. Returns `None` when no assistant-authored message exists.
pub fn latest_assistant_text(messages: &[ThreadMessage]) -> Option<String> {
    messages
        .iter()
        .find(|m| m.role == MessageRole::Assistant)
        .map(ThreadMessage::joined_text)
}
