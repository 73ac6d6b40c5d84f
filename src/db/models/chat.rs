use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A single message in a frame's conversation thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Role of the message author: "user", "assistant", or "system"
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }
}

/// The persisted chat row for a frame. Messages are stored as a JSON array
/// and overwritten whole on save (last-writer-wins, no merge).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ChatThread {
    pub id: String,
    pub frame_id: String,
    /// JSON array of ChatMessage
    pub messages: String,
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}
