use std::sync::Arc;

use tauri::State;

use crate::db::models::FrameDetails;
use crate::db::repos::frames as frame_repo;
use crate::engine::extract;
use crate::error::AppError;
use crate::AppState;

/// Load a frame and its chat history for the playground. Also primes the
/// preview surface with the stored design and marks the frame loaded so
/// chat saves are accepted from here on.
#[tauri::command]
pub fn get_frame_details(
    state: State<'_, Arc<AppState>>,
    frame_id: String,
    project_id: String,
) -> Result<FrameDetails, AppError> {
    let details = frame_repo::get_details(&state.db, &frame_id, &project_id)?;

    if let Some(code) = &details.frame.design_code {
        // Rows written by older builds may still carry the fence wrapper.
        let extracted = extract::extract_html(code);
        let body = if extracted.is_empty() {
            code.as_str()
        } else {
            extracted
        };
        state.preview.lock().unwrap().set_body(body);
    }

    state.loaded_frames.lock().unwrap().insert(frame_id);
    Ok(details)
}

/// Explicit user save: persist the preview surface's current body as the
/// frame's design code. The editor flushes its readback into the surface
/// before this runs, so in-place edits are included.
#[tauri::command]
pub fn save_design_code(
    state: State<'_, Arc<AppState>>,
    frame_id: String,
    project_id: String,
) -> Result<(), AppError> {
    let body = state.preview.lock().unwrap().body().to_string();
    if body.trim().is_empty() {
        return Err(AppError::Validation("Nothing to save yet".into()));
    }
    frame_repo::update_design_code(&state.db, &frame_id, &project_id, &body)
}
