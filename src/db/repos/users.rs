use rusqlite::{params, Row};

use crate::db::models::User;
use crate::db::DbPool;
use crate::error::AppError;

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        created_at: row.get("created_at")?,
    })
}

/// Look up a user by email.
pub fn get_by_email(pool: &DbPool, email: &str) -> Result<Option<User>, AppError> {
    let conn = pool.get()?;
    let result = conn.query_row(
        "SELECT * FROM users WHERE email = ?1",
        params![email],
        row_to_user,
    );
    match result {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(AppError::Database(e)),
    }
}

/// Create the user row if it does not exist yet; returns the stored row either way.
pub fn upsert(pool: &DbPool, name: Option<&str>, email: &str) -> Result<User, AppError> {
    if let Some(existing) = get_by_email(pool, email)? {
        return Ok(existing);
    }

    let conn = pool.get()?;
    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO users (id, name, email, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![id, name, email, now],
    )?;
    drop(conn);

    get_by_email(pool, email)?.ok_or_else(|| AppError::NotFound(format!("User {email}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_test_db;

    #[test]
    fn test_upsert_is_idempotent() {
        let pool = init_test_db().unwrap();

        let first = upsert(&pool, Some("Ada"), "ada@example.com").unwrap();
        let second = upsert(&pool, Some("Ada L."), "ada@example.com").unwrap();

        assert_eq!(first.id, second.id);
        // Existing row wins — name is not overwritten on re-provision.
        assert_eq!(second.name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_get_missing_user() {
        let pool = init_test_db().unwrap();
        assert!(get_by_email(&pool, "nobody@example.com").unwrap().is_none());
    }
}
