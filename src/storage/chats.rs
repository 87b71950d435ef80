//! Chat history table.

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::params;

use super::Database;
use crate::core::data::{ChatMessage, Role};
use crate::core::traits::ChatStore;
use crate::utils::error::{AppError, AppResult};

const SQLITE_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S%.f";

pub struct SqliteChatStore {
    db: Database,
}

impl SqliteChatStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

/// Timestamps are written as RFC 3339; rows filled by the column default use SQLite's format.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, SQLITE_TIMESTAMP)
        .ok()
        .map(|naive| naive.and_utc())
}

impl ChatStore for SqliteChatStore {
    fn init(&self) -> AppResult<()> {
        let conn = self.db.connect()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS chats (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                username  TEXT NOT NULL,
                role      TEXT CHECK(role IN ('user', 'assistant')) NOT NULL,
                text      TEXT NOT NULL,
                ts        DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_chats_username ON chats (username, id)",
            [],
        )?;
        Ok(())
    }

    fn fetch_chat(&self, username: &str, limit: usize) -> AppResult<Vec<ChatMessage>> {
        let conn = self.db.connect()?;
        let mut stmt = conn.prepare(
            "SELECT role, text, ts FROM (
                SELECT id, role, text, ts FROM chats
                WHERE username = ?1
                ORDER BY id DESC
                LIMIT ?2
             ) ORDER BY id ASC",
        )?;

        let rows = stmt.query_map(params![username, limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })?;

        let mut messages = Vec::new();
        for row in rows {
            let (role, text, ts) = row?;
            let role = role.parse::<Role>().map_err(AppError::Storage)?;
            messages.push(ChatMessage {
                role,
                text,
                created_at: ts.as_deref().and_then(parse_timestamp),
            });
        }
        Ok(messages)
    }

    fn save_chat(&self, username: &str, role: Role, text: &str) -> AppResult<()> {
        let conn = self.db.connect()?;
        conn.execute(
            "INSERT INTO chats (username, role, text, ts) VALUES (?1, ?2, ?3, ?4)",
            params![username, role.as_str(), text, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn clear_chat(&self, username: &str) -> AppResult<usize> {
        let conn = self.db.connect()?;
        let removed = conn.execute("DELETE FROM chats WHERE username = ?1", params![username])?;
        tracing::info!(username, removed, "cleared chat history");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, SqliteChatStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteChatStore::new(Database::new(dir.path().join("chats.db")));
        store.init().unwrap();
        (dir, store)
    }

    #[test]
    fn test_messages_come_back_in_order() {
        let (_dir, store) = store();
        store.save_chat("ada", Role::User, "AAPL price").unwrap();
        store.save_chat("ada", Role::Assistant, "The current price of AAPL is $1.00.").unwrap();

        let messages = store.fetch_chat("ada", 200).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].text, "AAPL price");
        assert_eq!(messages[1].role, Role::Assistant);
        assert!(messages[0].created_at.is_some());
    }

    #[test]
    fn test_history_is_per_user() {
        let (_dir, store) = store();
        store.save_chat("ada", Role::User, "hi").unwrap();
        store.save_chat("bob", Role::User, "hello").unwrap();
        let messages = store.fetch_chat("bob", 200).unwrap();
        assert_eq!(messages, vec![ChatMessage { created_at: messages[0].created_at, ..ChatMessage::new(Role::User, "hello") }]);
    }

    #[test]
    fn test_limit_keeps_most_recent_messages() {
        let (_dir, store) = store();
        for i in 0..5 {
            store.save_chat("ada", Role::User, &format!("q{}", i)).unwrap();
        }
        let texts: Vec<String> = store
            .fetch_chat("ada", 2)
            .unwrap()
            .into_iter()
            .map(|m| m.text)
            .collect();
        assert_eq!(texts, vec!["q3", "q4"]);
    }

    #[test]
    fn test_clear_chat() {
        let (_dir, store) = store();
        store.save_chat("ada", Role::User, "hi").unwrap();
        store.save_chat("ada", Role::Assistant, "hello").unwrap();
        store.save_chat("bob", Role::User, "hey").unwrap();
        assert_eq!(store.clear_chat("ada").unwrap(), 2);
        assert!(store.fetch_chat("ada", 10).unwrap().is_empty());
        assert_eq!(store.fetch_chat("bob", 10).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_sqlite_default_timestamp() {
        assert!(parse_timestamp("2024-05-01 12:30:00").is_some());
        assert!(parse_timestamp("2024-05-01T12:30:00+00:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
