//! Plain text generation used by the semantic search tool.

mod openai;

pub use openai::OpenAIChatModel;

use crate::error::Result;
use async_trait::async_trait;

/// A language model that turns a single prompt into text.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
