use rusqlite::{params, Row};

use crate::db::models::{Frame, FrameDetails};
use crate::db::repos::chats;
use crate::db::DbPool;
use crate::error::AppError;

fn row_to_frame(row: &Row) -> rusqlite::Result<Frame> {
    Ok(Frame {
        frame_id: row.get("frame_id")?,
        project_id: row.get("project_id")?,
        design_code: row.get("design_code")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Get a frame by frame + project identifiers.
pub fn get_by_id(pool: &DbPool, frame_id: &str, project_id: &str) -> Result<Frame, AppError> {
    let conn = pool.get()?;
    conn.query_row(
        "SELECT * FROM frames WHERE frame_id = ?1 AND project_id = ?2",
        params![frame_id, project_id],
        row_to_frame,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => AppError::NotFound(format!("Frame {frame_id}")),
        other => AppError::Database(other),
    })
}

/// Frame plus its chat history — what the playground loads on navigation.
/// A frame with no chat row yet reports an empty message list, not an error.
pub fn get_details(
    pool: &DbPool,
    frame_id: &str,
    project_id: &str,
) -> Result<FrameDetails, AppError> {
    let frame = get_by_id(pool, frame_id, project_id)?;
    let chat_messages = chats::get_messages(pool, frame_id)?;
    Ok(FrameDetails {
        frame,
        chat_messages,
    })
}

/// Overwrite the frame's design code. Callers must only ever pass a complete
/// HTML fragment — partial stream snapshots stay in the preview surface.
pub fn update_design_code(
    pool: &DbPool,
    frame_id: &str,
    project_id: &str,
    design_code: &str,
) -> Result<(), AppError> {
    let conn = pool.get()?;
    let now = chrono::Utc::now().to_rfc3339();
    let rows = conn.execute(
        "UPDATE frames SET design_code = ?3, updated_at = ?4
         WHERE frame_id = ?1 AND project_id = ?2",
        params![frame_id, project_id, design_code, now],
    )?;
    if rows == 0 {
        return Err(AppError::NotFound(format!("Frame {frame_id}")));
    }
    Ok(())
}

/// List all frames in a project, oldest first.
pub fn list_by_project(pool: &DbPool, project_id: &str) -> Result<Vec<Frame>, AppError> {
    let conn = pool.get()?;
    let mut stmt =
        conn.prepare("SELECT * FROM frames WHERE project_id = ?1 ORDER BY created_at ASC")?;
    let rows = stmt.query_map(params![project_id], row_to_frame)?;
    Ok(rows.filter_map(|r| r.ok()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_test_db;
    use crate::db::repos::projects;

    fn seeded_pool() -> DbPool {
        let pool = init_test_db().unwrap();
        projects::bootstrap(&pool, "proj-1", "frame-1", "ada@example.com", "[]").unwrap();
        pool
    }

    #[test]
    fn test_update_and_read_back_design_code() {
        let pool = seeded_pool();

        update_design_code(&pool, "frame-1", "proj-1", "<div>hello</div>").unwrap();

        let frame = get_by_id(&pool, "frame-1", "proj-1").unwrap();
        assert_eq!(frame.design_code.as_deref(), Some("<div>hello</div>"));
    }

    #[test]
    fn test_update_unknown_frame_is_not_found() {
        let pool = seeded_pool();
        match update_design_code(&pool, "ghost", "proj-1", "<div/>") {
            Err(AppError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_mismatched_project_is_not_found() {
        let pool = seeded_pool();
        // Right frame, wrong project — must not silently no-op.
        match update_design_code(&pool, "frame-1", "other-proj", "<div/>") {
            Err(AppError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_details_include_empty_chat() {
        let pool = seeded_pool();
        let details = get_details(&pool, "frame-1", "proj-1").unwrap();
        assert!(details.chat_messages.is_empty());
        assert_eq!(details.frame.frame_id, "frame-1");
    }
}
