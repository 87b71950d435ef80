//! Core trait definitions for account and conversation storage
//!
//! These traits define the persistence operations the chat session relies
//! on, so the SQLite stores can be swapped for in-memory ones in tests.

use crate::core::data::{ChatMessage, Role};
use crate::utils::error::AppResult;

/// Account storage
pub trait UserStore {
    /// Ensure the backing table exists
    fn init(&self) -> AppResult<()>;

    /// Create an account; `Ok(false)` when the username is taken
    fn register_user(
        &self,
        username: &str,
        email: &str,
        full_name: &str,
        password: &str,
    ) -> AppResult<bool>;

    /// Check credentials
    fn verify_login(&self, username: &str, password: &str) -> AppResult<bool>;

    /// Full name of the user, or an empty string when unknown
    fn get_full_name(&self, username: &str) -> AppResult<String>;
}

/// Per-user conversation storage
pub trait ChatStore {
    /// Ensure the backing table exists
    fn init(&self) -> AppResult<()>;

    /// Messages for `username` in chronological order, at most `limit`
    fn fetch_chat(&self, username: &str, limit: usize) -> AppResult<Vec<ChatMessage>>;

    /// Persist a single message
    fn save_chat(&self, username: &str, role: Role, text: &str) -> AppResult<()>;

    /// Delete every message belonging to `username`, returning how many went
    fn clear_chat(&self, username: &str) -> AppResult<usize>;
}
