//! OpenAI-compatible client configuration.
//!
//! The chat and embedding calls go through `async-openai`, pointed at whichever
//! OpenAI-compatible endpoint `llm.api_base` names (Gemini by default).

use crate::config::LlmSettings;
use crate::error::{PlacementError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for model API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create a client for the configured endpoint with the default timeout.
pub fn create_client(llm: &LlmSettings, api_key: &str) -> Result<Client<OpenAIConfig>> {
    create_client_with_timeout(llm, api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create a client for the configured endpoint with a custom timeout.
pub fn create_client_with_timeout(
    llm: &LlmSettings,
    api_key: &str,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| PlacementError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let config = OpenAIConfig::new()
        .with_api_base(llm.api_base.trim_end_matches('/'))
        .with_api_key(api_key);

    Ok(Client::with_config(config).with_http_client(http_client))
}
