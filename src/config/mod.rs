//! Configuration module for the placement backend.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AgentPrompts, Prompts, RagPrompts};
pub use settings::{
    DatabaseSettings, EmbeddingSettings, GeneralSettings, LlmSettings, PromptSettings,
    ServerSettings, Settings, VectorStoreSettings, DATABASE_URL_ENV,
};
