use std::sync::Arc;

use serde_json::json;
use tauri::{Emitter, State};

use crate::db::repos::{frames as frame_repo, settings};
use crate::db::settings_keys;
use crate::engine::generation::{
    self, EventSink, GenerationParams, GenerationStatusEvent,
};
use crate::engine::throttle;
use crate::error::AppError;
use crate::preview::surface::RenderPayload;
use crate::AppState;

/// Routes generation events onto the Tauri event bus for the webview.
struct TauriSink(tauri::AppHandle);

impl EventSink for TauriSink {
    fn emit_status(&self, event: GenerationStatusEvent) {
        let _ = self.0.emit("generation-status", event);
    }

    fn emit_preview(&self, payload: RenderPayload) {
        let _ = self.0.emit("preview-update", payload);
    }
}

/// Start one generation turn. Any still-open stream for a previous turn is
/// abandoned first — its late deltas are discarded on arrival.
#[tauri::command]
pub async fn start_generation(
    state: State<'_, Arc<AppState>>,
    app: tauri::AppHandle,
    frame_id: String,
    project_id: String,
    user_input: String,
) -> Result<serde_json::Value, AppError> {
    if user_input.trim().is_empty() {
        return Err(AppError::Validation("message is empty".into()));
    }
    // Fail fast on unknown identifiers instead of erroring mid-stream.
    frame_repo::get_by_id(&state.db, &frame_id, &project_id)?;

    let generation_id = uuid::Uuid::new_v4().to_string();

    // Selection must not dangle across a bulk replacement; clear it before
    // the surface resets for the new stream.
    let directives = state.editor.lock().await.clear_all();
    if !directives.is_empty() {
        let _ = app.emit("editor-directives", directives);
    }
    {
        let mut surface = state.preview.lock().unwrap();
        surface.reset();
    }

    let growth_threshold = settings::get(&state.db, settings_keys::PREVIEW_GROWTH_THRESHOLD)?
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(throttle::GROWTH_THRESHOLD);

    let cancel = generation::install_handle(&state.active_generation, &generation_id, &frame_id);

    let params = GenerationParams {
        pool: state.db.clone(),
        provider: state.provider.clone(),
        surface: state.preview.clone(),
        sink: Arc::new(TauriSink(app)),
        active: state.active_generation.clone(),
        cancel,
        generation_id: generation_id.clone(),
        frame_id,
        project_id,
        user_input: user_input.trim().to_string(),
        growth_threshold,
    };

    tokio::spawn(generation::run_generation(params));

    Ok(json!({ "generation_id": generation_id }))
}

/// Abandon the in-flight generation, if any.
#[tauri::command]
pub fn cancel_generation(state: State<'_, Arc<AppState>>) -> Result<(), AppError> {
    let handle = state.active_generation.lock().unwrap().take();
    if let Some(handle) = handle {
        tracing::info!(generation_id = %handle.generation_id, "Cancelling generation");
        handle.cancel.cancel();
    }
    Ok(())
}
