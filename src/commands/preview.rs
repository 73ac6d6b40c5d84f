use std::sync::Arc;

use tauri::State;

use crate::error::AppError;
use crate::preview::{export, scaffold};
use crate::AppState;

/// Full scaffolded document for the preview surface (library set, base
/// styles, guarded re-init script) with the current body embedded.
#[tauri::command]
pub fn get_preview_document(
    state: State<'_, Arc<AppState>>,
    edit_mode: bool,
) -> Result<String, AppError> {
    let surface = state.preview.lock().unwrap();
    Ok(scaffold::surface_document(surface.body(), edit_mode))
}

/// Sandbox attribute the webview must apply to the surface frame.
#[tauri::command]
pub fn get_sandbox_flags() -> String {
    scaffold::SANDBOX_FLAGS.to_string()
}

/// Open the current design as a standalone document in the default browser.
#[tauri::command]
pub fn export_open_in_browser(state: State<'_, Arc<AppState>>) -> Result<String, AppError> {
    let body = state.preview.lock().unwrap().body().to_string();
    let path = export::open_in_browser(&body)?;
    Ok(path.display().to_string())
}

/// Save the standalone document to a user-chosen destination (the dialog
/// runs in the frontend; a directory gets the fixed `index.html` name).
#[tauri::command]
pub fn export_save(state: State<'_, Arc<AppState>>, dest: String) -> Result<String, AppError> {
    let body = state.preview.lock().unwrap().body().to_string();
    let path = export::save_to(&body, std::path::Path::new(&dest))?;
    Ok(path.display().to_string())
}
