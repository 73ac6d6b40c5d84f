use rusqlite::{params, Row};

use crate::db::models::Project;
use crate::db::DbPool;
use crate::error::AppError;

fn row_to_project(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        project_id: row.get("project_id")?,
        created_by: row.get("created_by")?,
        created_at: row.get("created_at")?,
    })
}

/// Get a single project by ID.
pub fn get_by_id(pool: &DbPool, project_id: &str) -> Result<Project, AppError> {
    let conn = pool.get()?;
    conn.query_row(
        "SELECT * FROM projects WHERE project_id = ?1",
        params![project_id],
        row_to_project,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => AppError::NotFound(format!("Project {project_id}")),
        other => AppError::Database(other),
    })
}

/// List all projects created by a user, newest first.
pub fn list_by_creator(pool: &DbPool, created_by: &str) -> Result<Vec<Project>, AppError> {
    let conn = pool.get()?;
    let mut stmt =
        conn.prepare("SELECT * FROM projects WHERE created_by = ?1 ORDER BY created_at DESC")?;
    let rows = stmt.query_map(params![created_by], row_to_project)?;
    Ok(rows.filter_map(|r| r.ok()).collect())
}

/// Create a project, its first frame, and an empty chat thread in one
/// transaction. The frontend navigates straight to the new frame, so a
/// half-created project would strand the user — all three rows or none.
pub fn bootstrap(
    pool: &DbPool,
    project_id: &str,
    frame_id: &str,
    created_by: &str,
    messages_json: &str,
) -> Result<Project, AppError> {
    let mut conn = pool.get()?;
    let now = chrono::Utc::now().to_rfc3339();

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO projects (project_id, created_by, created_at) VALUES (?1, ?2, ?3)",
        params![project_id, created_by, now],
    )?;
    tx.execute(
        "INSERT INTO frames (frame_id, project_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
        params![frame_id, project_id, now],
    )?;
    tx.execute(
        "INSERT INTO chats (id, frame_id, messages, created_by, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![
            uuid::Uuid::new_v4().to_string(),
            frame_id,
            messages_json,
            created_by,
            now
        ],
    )?;
    tx.commit()?;

    get_by_id(pool, project_id)
}

/// Delete a project (frames and chats cascade).
pub fn delete(pool: &DbPool, project_id: &str) -> Result<(), AppError> {
    let conn = pool.get()?;
    conn.execute(
        "DELETE FROM projects WHERE project_id = ?1",
        params![project_id],
    )?;
    Ok(())
}
