use std::sync::Arc;

use tauri::State;

use crate::db::repos::settings as settings_repo;
use crate::error::AppError;
use crate::AppState;

#[tauri::command]
pub fn get_setting(
    state: State<'_, Arc<AppState>>,
    key: String,
) -> Result<Option<String>, AppError> {
    settings_repo::get(&state.db, &key)
}

#[tauri::command]
pub fn set_setting(
    state: State<'_, Arc<AppState>>,
    key: String,
    value: String,
) -> Result<(), AppError> {
    settings_repo::set(&state.db, &key, &value)
}
