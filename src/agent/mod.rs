//! Agent layer: decides which tools answer a question.
//!
//! The HTTP layer only sees the [`Responder`] trait, so the tool-calling loop in
//! [`ToolCallingAgent`] can be swapped for another strategy or a scripted
//! double in tests.

mod runner;

pub use runner::{ToolCallRecord, ToolCallingAgent};

use crate::error::Result;
use crate::tools::Toolbox;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Speaker of a prior conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One prior turn of conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// Produces a final answer for a query using the given tools.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, query: &str, history: &[ChatTurn], tools: &Toolbox) -> Result<String>;
}
