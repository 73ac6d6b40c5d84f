use rusqlite::Connection;

use crate::error::AppError;

/// Run the consolidated schema migration. The whole schema is idempotent
/// (`IF NOT EXISTS` everywhere) so it can run on every startup.
pub fn run(conn: &Connection) -> Result<(), AppError> {
    tracing::debug!("Running database migrations");

    conn.execute_batch(SCHEMA)?;

    tracing::info!("Database migrations complete");
    Ok(())
}

const SCHEMA: &str = r#"

-- ============================================================================
-- Users
-- ============================================================================

CREATE TABLE IF NOT EXISTS users (
    id          TEXT PRIMARY KEY,
    name        TEXT,
    email       TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Projects (must precede frames due to FK)
-- ============================================================================

CREATE TABLE IF NOT EXISTS projects (
    project_id  TEXT PRIMARY KEY,
    created_by  TEXT NOT NULL,
    created_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_projects_created_by ON projects(created_by);

-- ============================================================================
-- Frames — one persisted HTML design variant per row
-- ============================================================================

CREATE TABLE IF NOT EXISTS frames (
    frame_id    TEXT PRIMARY KEY,
    project_id  TEXT NOT NULL REFERENCES projects(project_id) ON DELETE CASCADE,
    design_code TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_frames_project ON frames(project_id);

-- ============================================================================
-- Chats — full message history per frame, stored as a JSON array
-- ============================================================================

CREATE TABLE IF NOT EXISTS chats (
    id          TEXT PRIMARY KEY,
    frame_id    TEXT NOT NULL UNIQUE REFERENCES frames(frame_id) ON DELETE CASCADE,
    messages    TEXT NOT NULL DEFAULT '[]',
    created_by  TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

-- ============================================================================
-- App Settings
-- ============================================================================

CREATE TABLE IF NOT EXISTS app_settings (
    key         TEXT PRIMARY KEY,
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

"#;
