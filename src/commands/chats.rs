use std::sync::Arc;

use tauri::State;

use crate::db::models::ChatMessage;
use crate::db::repos::chats as chat_repo;
use crate::error::AppError;
use crate::AppState;

/// Persist the full message list for a frame. Returns whether a save
/// actually ran:
/// - skipped until the frame's initial load completed (avoids re-saving
///   messages that were just loaded), and
/// - skipped while another save for the same frame is still in flight
///   (dropped, not queued).
#[tauri::command]
pub fn save_chat_messages(
    state: State<'_, Arc<AppState>>,
    frame_id: String,
    messages: Vec<ChatMessage>,
) -> Result<bool, AppError> {
    if !state.loaded_frames.lock().unwrap().contains(&frame_id) {
        tracing::debug!(frame_id = %frame_id, "Skipping chat save before initial load");
        return Ok(false);
    }

    {
        let mut in_flight = state.chat_saves_in_flight.lock().unwrap();
        if !in_flight.insert(frame_id.clone()) {
            tracing::debug!(frame_id = %frame_id, "Skipping chat save — one already in flight");
            return Ok(false);
        }
    }

    let result = chat_repo::save_messages(&state.db, &frame_id, &messages);
    state.chat_saves_in_flight.lock().unwrap().remove(&frame_id);

    result.map(|()| true)
}
