//! Configuration settings for the placement backend.

use crate::error::{PlacementError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable that overrides `database.url`.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub llm: LlmSettings,
    pub embedding: EmbeddingSettings,
    pub vector_store: VectorStoreSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Relational database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Path to the SQLite placements database. `DATABASE_URL` takes precedence.
    pub url: String,
    /// Upper bound on pooled connections.
    pub max_connections: usize,
    /// Open connections with `PRAGMA query_only`.
    pub read_only: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "~/.placement-ai/placements.db".to_string(),
            max_connections: 10,
            read_only: true,
        }
    }
}

/// Chat model settings (any OpenAI-compatible endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Base URL of the OpenAI-compatible API.
    pub api_base: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Model used by both the agent and the semantic search tool.
    pub model: String,
    /// Maximum number of model calls per agent run.
    pub max_iterations: usize,
    pub temperature: f32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            model: "gemini-2.5-flash".to_string(),
            max_iterations: 15,
            temperature: 0.0,
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Requested output dimensions. None keeps the model default.
    pub dimensions: Option<u32>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "gemini-embedding-001".to_string(),
            dimensions: None,
        }
    }
}

/// Vector store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    /// Vector store provider (sqlite, memory).
    pub provider: String,
    /// Path to the SQLite embeddings database (for sqlite provider).
    pub sqlite_path: String,
    /// Collection holding job and company documents.
    pub collection: String,
    /// Number of passages handed to the summarizing model.
    pub top_k: usize,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            provider: "sqlite".to_string(),
            sqlite_path: "~/.placement-ai/vectors.db".to_string(),
            collection: "job_embeddings".to_string(),
            top_k: 5,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// `DATABASE_URL` overrides the configured database location.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str::<Settings>(&content)?
        } else {
            Settings::default()
        };

        if let Ok(url) = std::env::var(DATABASE_URL_ENV) {
            if !url.is_empty() {
                settings.database.url = url;
            }
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings that can never work at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.database.max_connections == 0 {
            return Err(PlacementError::Config(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.vector_store.top_k == 0 {
            return Err(PlacementError::Config(
                "vector_store.top_k must be at least 1".to_string(),
            ));
        }
        url::Url::parse(&self.llm.api_base).map_err(|e| {
            PlacementError::Config(format!("Invalid llm.api_base '{}': {}", self.llm.api_base, e))
        })?;
        Ok(())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| PlacementError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("placement-ai")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded placements database path.
    pub fn database_path(&self) -> PathBuf {
        let url = &self.database.url;
        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url);
        Self::expand_path(path)
    }

    /// Get the expanded SQLite embeddings path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.vector_store.sqlite_path)
    }

    /// Read the LLM API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String> {
        match std::env::var(&self.llm.api_key_env) {
            Ok(key) if !key.is_empty() => Ok(key),
            Ok(_) => Err(PlacementError::Config(format!(
                "{} is empty",
                self.llm.api_key_env
            ))),
            Err(_) => Err(PlacementError::Config(format!(
                "{} not set",
                self.llm.api_key_env
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.vector_store.collection, "job_embeddings");
        assert_eq!(settings.vector_store.top_k, 5);
        assert_eq!(settings.llm.max_iterations, 15);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [database]
            max_connections = 3

            [vector_store]
            collection = "jd_chunks"
            "#,
        )
        .unwrap();
        assert_eq!(settings.database.max_connections, 3);
        assert!(settings.database.read_only);
        assert_eq!(settings.vector_store.collection, "jd_chunks");
        assert_eq!(settings.vector_store.top_k, 5);
        assert_eq!(settings.server.port, 8000);
    }

    #[test]
    fn test_zero_pool_capacity_rejected() {
        let mut settings = Settings::default();
        settings.database.max_connections = 0;
        assert!(matches!(settings.validate(), Err(PlacementError::Config(_))));
    }

    #[test]
    fn test_database_path_strips_scheme() {
        let mut settings = Settings::default();
        settings.database.url = "sqlite:///tmp/placements.db".to_string();
        assert_eq!(settings.database_path(), PathBuf::from("/tmp/placements.db"));

        settings.database.url = "/var/lib/placements.db".to_string();
        assert_eq!(settings.database_path(), PathBuf::from("/var/lib/placements.db"));
    }
}
