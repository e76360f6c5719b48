//! Error types for the placement backend.

use thiserror::Error;

/// Library-level error type for placement backend operations.
#[derive(Error, Debug)]
pub enum PlacementError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("query rejected: {0}")]
    QueryRejected(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Language model error: {0}")]
    Llm(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for placement backend operations.
pub type Result<T> = std::result::Result<T, PlacementError>;
