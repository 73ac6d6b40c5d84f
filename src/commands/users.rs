use std::sync::Arc;

use tauri::State;

use crate::db::models::User;
use crate::db::repos::users as user_repo;
use crate::error::AppError;
use crate::AppState;

/// Ensure a local user row exists for this identity (first-launch provisioning).
#[tauri::command]
pub fn provision_user(
    state: State<'_, Arc<AppState>>,
    name: Option<String>,
    email: String,
) -> Result<User, AppError> {
    if email.trim().is_empty() {
        return Err(AppError::Validation("email is required".into()));
    }
    user_repo::upsert(&state.db, name.as_deref(), email.trim())
}
