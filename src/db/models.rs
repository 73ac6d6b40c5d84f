use serde::{Deserialize, Serialize};
use ts_rs::TS;

mod chat;
mod frame;

pub use chat::{ChatMessage, ChatThread};
pub use frame::{Frame, FrameDetails};

// ============================================================================
// User
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub created_at: String,
}

// ============================================================================
// Project
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub project_id: String,
    pub created_by: String,
    pub created_at: String,
}

/// Input for the one-shot project bootstrap: creates the project, its first
/// frame, and an empty chat thread in a single call.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectInput {
    pub project_id: String,
    pub frame_id: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}
