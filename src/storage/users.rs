//! Account table and password hashing.

use rusqlite::{OptionalExtension, params};
use sha2::{Digest, Sha256};

use super::Database;
use crate::core::traits::UserStore;
use crate::utils::error::AppResult;

/// Lowercase hex SHA-256 of the password bytes
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

pub struct SqliteUserStore {
    db: Database,
}

impl SqliteUserStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl UserStore for SqliteUserStore {
    fn init(&self) -> AppResult<()> {
        let conn = self.db.connect()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                username      TEXT PRIMARY KEY,
                email         TEXT,
                full_name     TEXT,
                password_hash TEXT
            )",
            [],
        )?;
        Ok(())
    }

    fn register_user(
        &self,
        username: &str,
        email: &str,
        full_name: &str,
        password: &str,
    ) -> AppResult<bool> {
        let conn = self.db.connect()?;
        let result = conn.execute(
            "INSERT INTO users (username, email, full_name, password_hash) VALUES (?1, ?2, ?3, ?4)",
            params![username, email, full_name, hash_password(password)],
        );

        match result {
            Ok(_) => Ok(true),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                tracing::debug!(username, "username already taken");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn verify_login(&self, username: &str, password: &str) -> AppResult<bool> {
        let conn = self.db.connect()?;
        let stored: Option<Option<String>> = conn
            .query_row(
                "SELECT password_hash FROM users WHERE username = ?1",
                params![username],
                |row| row.get(0),
            )
            .optional()?;

        Ok(matches!(stored, Some(Some(hash)) if hash == hash_password(password)))
    }

    fn get_full_name(&self, username: &str) -> AppResult<String> {
        let conn = self.db.connect()?;
        let name: Option<Option<String>> = conn
            .query_row(
                "SELECT full_name FROM users WHERE username = ?1",
                params![username],
                |row| row.get(0),
            )
            .optional()?;
        Ok(name.flatten().unwrap_or_default())
    }
}
