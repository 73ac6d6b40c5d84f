use rusqlite::{params, Row};

use crate::db::models::{ChatMessage, ChatThread};
use crate::db::DbPool;
use crate::error::AppError;

fn row_to_thread(row: &Row) -> rusqlite::Result<ChatThread> {
    Ok(ChatThread {
        id: row.get("id")?,
        frame_id: row.get("frame_id")?,
        messages: row.get("messages")?,
        created_by: row.get("created_by")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Get the chat thread for a frame (if any).
pub fn get_by_frame(pool: &DbPool, frame_id: &str) -> Result<Option<ChatThread>, AppError> {
    let conn = pool.get()?;
    let result = conn.query_row(
        "SELECT * FROM chats WHERE frame_id = ?1",
        params![frame_id],
        row_to_thread,
    );
    match result {
        Ok(thread) => Ok(Some(thread)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(AppError::Database(e)),
    }
}

/// Deserialized message list for a frame. No chat row yet means an empty
/// list. Rows written by older builds may hold bare strings instead of
/// role/content objects — those are normalized on the way out.
pub fn get_messages(pool: &DbPool, frame_id: &str) -> Result<Vec<ChatMessage>, AppError> {
    let Some(thread) = get_by_frame(pool, frame_id)? else {
        return Ok(Vec::new());
    };
    Ok(normalize_messages(&thread.messages))
}

/// Overwrite the full message list for a frame (last-writer-wins, no merge).
pub fn save_messages(
    pool: &DbPool,
    frame_id: &str,
    messages: &[ChatMessage],
) -> Result<(), AppError> {
    let conn = pool.get()?;
    let now = chrono::Utc::now().to_rfc3339();
    let json = serde_json::to_string(messages)?;
    let rows = conn.execute(
        "UPDATE chats SET messages = ?2, updated_at = ?3 WHERE frame_id = ?1",
        params![frame_id, json, now],
    )?;
    if rows == 0 {
        return Err(AppError::NotFound(format!("Chat for frame {frame_id}")));
    }
    Ok(())
}

/// Parse a stored message array, tolerating legacy shapes.
fn normalize_messages(raw: &str) -> Vec<ChatMessage> {
    let Ok(values) = serde_json::from_str::<Vec<serde_json::Value>>(raw) else {
        return Vec::new();
    };

    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            if let Ok(msg) = serde_json::from_value::<ChatMessage>(value.clone()) {
                return Some(msg);
            }
            // Legacy rows stored alternating user/assistant strings.
            value.as_str().map(|s| ChatMessage {
                role: if index % 2 == 0 { "user" } else { "assistant" }.into(),
                content: s.to_string(),
            })
        })
        .collect()
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
    fn test_save_and_load_round_trip() {
        let pool = seeded_pool();
        let messages = vec![
            ChatMessage::user("make a pricing page"),
            ChatMessage::assistant("Your website is ready — check the preview."),
        ];

        save_messages(&pool, "frame-1", &messages).unwrap();

        let loaded = get_messages(&pool, "frame-1").unwrap();
        assert_eq!(loaded, messages);
    }

    #[test]
    fn test_save_overwrites_whole_list() {
        let pool = seeded_pool();
        save_messages(&pool, "frame-1", &[ChatMessage::user("one")]).unwrap();
        save_messages(&pool, "frame-1", &[ChatMessage::user("two")]).unwrap();

        let loaded = get_messages(&pool, "frame-1").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].content, "two");
    }

    #[test]
    fn test_missing_chat_row_is_empty_list() {
        let pool = init_test_db().unwrap();
        assert!(get_messages(&pool, "no-such-frame").unwrap().is_empty());
    }

    #[test]
    fn test_normalize_legacy_string_messages() {
        let messages = normalize_messages(r#"["hi there", "hello back"]"#);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[1].role, "assistant");
    }

    #[test]
    fn test_normalize_garbage_is_empty() {
        assert!(normalize_messages("not json").is_empty());
    }
}
