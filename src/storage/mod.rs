//! SQLite persistence for accounts and conversations.
//!
//! Every operation opens its own connection; the database file is created on
//! first use together with its parent directory.

pub mod chats;
pub mod users;

pub use chats::SqliteChatStore;
pub use users::SqliteUserStore;

use crate::utils::error::AppResult;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Handle to the database file shared by the stores
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a connection with the pragmas every connection needs
    pub fn connect(&self) -> AppResult<Connection> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&self.path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
            ",
        )?;
        Ok(conn)
    }

    /// Stores for this database with their tables created
    pub fn open_stores(&self) -> AppResult<(SqliteUserStore, SqliteChatStore)> {
        use crate::core::traits::{ChatStore, UserStore};

        let users = SqliteUserStore::new(self.clone());
        let chats = SqliteChatStore::new(self.clone());
        users.init()?;
        chats.init()?;
        tracing::debug!(path = %self.path.display(), "database ready");
        Ok((users, chats))
    }
}
