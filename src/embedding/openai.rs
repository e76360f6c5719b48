//! Embeddings over an OpenAI-compatible endpoint.

use super::Embedder;
use crate::error::{PlacementError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Embedder backed by the `/embeddings` endpoint.
pub struct OpenAIEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
    dimensions: Option<u32>,
}

impl OpenAIEmbedder {
    /// Create a new embedder for the given model.
    pub fn new(client: Client<OpenAIConfig>, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
            dimensions: None,
        }
    }

    /// Request a specific output dimensionality.
    pub fn with_dimensions(mut self, dimensions: Option<u32>) -> Self {
        self.dimensions = dimensions;
        self
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| PlacementError::Embedding("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        // Providers cap the batch size, process in chunks
        const BATCH_SIZE: usize = 100;
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(BATCH_SIZE) {
            let mut args = CreateEmbeddingRequestArgs::default();
            args.model(&self.model)
                .input(EmbeddingInput::StringArray(chunk.to_vec()));
            if let Some(dimensions) = self.dimensions {
                args.dimensions(dimensions);
            }
            let request = args.build().map_err(|e| {
                PlacementError::Embedding(format!("Failed to build request: {}", e))
            })?;

            let response = self
                .client
                .embeddings()
                .create(request)
                .await
                .map_err(|e| PlacementError::Embedding(format!("Embedding API error: {}", e)))?;

            let mut embeddings: Vec<_> = response.data.into_iter().collect();
            embeddings.sort_by_key(|e| e.index);

            all_embeddings.extend(embeddings.into_iter().map(|e| e.embedding));
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmSettings;
    use crate::openai::create_client;

    #[test]
    fn test_embedder_creation() {
        let client = create_client(&LlmSettings::default(), "test-key").unwrap();
        let embedder = OpenAIEmbedder::new(client, "gemini-embedding-001").with_dimensions(Some(768));
        assert_eq!(embedder.model, "gemini-embedding-001");
        assert_eq!(embedder.dimensions, Some(768));
    }

    #[tokio::test]
    async fn test_empty_batch_skips_request() {
        let client = create_client(&LlmSettings::default(), "test-key").unwrap();
        let embedder = OpenAIEmbedder::new(client, "gemini-embedding-001");
        assert!(embedder.embed_batch(&[]).await.unwrap().is_empty());
    }
}
