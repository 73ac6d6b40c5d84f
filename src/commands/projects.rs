use std::sync::Arc;

use tauri::State;

use crate::db::models::{CreateProjectInput, Project};
use crate::db::repos::projects as project_repo;
use crate::error::AppError;
use crate::AppState;

/// Bootstrap a project: project row, first frame, and an empty chat thread.
#[tauri::command]
pub fn create_project(
    state: State<'_, Arc<AppState>>,
    input: CreateProjectInput,
    created_by: String,
) -> Result<Project, AppError> {
    if input.project_id.trim().is_empty() || input.frame_id.trim().is_empty() {
        return Err(AppError::Validation("project and frame ids are required".into()));
    }
    let messages_json = serde_json::to_string(&input.messages)?;
    project_repo::bootstrap(
        &state.db,
        &input.project_id,
        &input.frame_id,
        &created_by,
        &messages_json,
    )
}

#[tauri::command]
pub fn list_projects(
    state: State<'_, Arc<AppState>>,
    created_by: String,
) -> Result<Vec<Project>, AppError> {
    project_repo::list_by_creator(&state.db, &created_by)
}

#[tauri::command]
pub fn delete_project(state: State<'_, Arc<AppState>>, project_id: String) -> Result<(), AppError> {
    project_repo::delete(&state.db, &project_id)
}
