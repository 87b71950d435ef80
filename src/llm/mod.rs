pub mod openai;

pub use openai::OpenAiClient;

use crate::utils::error::AppResult;
use async_trait::async_trait;

/// A chat-completion backend
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Single-turn completion with a system instruction
    async fn complete(&self, system: &str, user: &str) -> AppResult<String>;
}
