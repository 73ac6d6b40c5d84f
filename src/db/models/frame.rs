use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::ChatMessage;

/// One persisted HTML design variant belonging to a project.
///
/// `design_code` is always a complete HTML fragment — partial stream
/// snapshots are shown in the preview but never written here.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub frame_id: String,
    pub project_id: String,
    pub design_code: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Frame plus its chat history, as returned by the frame-details lookup.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FrameDetails {
    #[serde(flatten)]
    pub frame: Frame,
    pub chat_messages: Vec<ChatMessage>,
}
