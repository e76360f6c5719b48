//! Semantic search over job descriptions and company information.

use super::Tool;
use crate::config::Prompts;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::llm::ChatModel;
use crate::vector_store::VectorStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

const DESCRIPTION: &str = "This tool performs semantic search on job descriptions, company information, and requirements. \
Use this tool for questions about: job skills and technologies required, company culture and work environment, \
specific job responsibilities, qualification requirements, company background and history, \
work policies (WFH, bonds, training), selection processes, and any text-based information. \
Examples: 'What skills does Google look for?', 'Tell me about Microsoft's work culture', \
'Which companies require Python skills?', 'What is the selection process for TCS?'.";

/// Retrieves the nearest passages and has a model answer from them.
///
/// Every top-K hit is used regardless of score; passages are neither
/// deduplicated nor cached.
pub struct SemanticSearchTool {
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    model: Arc<dyn ChatModel>,
    prompts: Prompts,
    top_k: usize,
}

impl SemanticSearchTool {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
        model: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            embedder,
            vector_store,
            model,
            prompts: Prompts::default(),
            top_k: 5,
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Embed `question` and join the top-K passages with blank lines.
    #[instrument(skip(self))]
    pub async fn retrieve(&self, question: &str) -> Result<String> {
        let query_embedding = self.embedder.embed(question).await?;
        let results = self.vector_store.search(&query_embedding, self.top_k).await?;

        debug!(
            "Retrieved {} passages from {}",
            results.len(),
            self.vector_store.collection()
        );

        Ok(results
            .into_iter()
            .map(|r| r.document.content)
            .collect::<Vec<_>>()
            .join("\n\n"))
    }

    /// Prompt sent to the model for a question and its retrieved context.
    pub fn build_prompt(&self, question: &str, context: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), context.to_string());
        vars.insert("question".to_string(), question.to_string());
        self.prompts.render_with_custom(&self.prompts.rag.template, &vars)
    }
}

#[async_trait]
impl Tool for SemanticSearchTool {
    fn name(&self) -> &str {
        "RAG_Search_Tool"
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    async fn call(&self, input: &str) -> Result<String> {
        info!("Semantic search: {}", input);
        let context = self.retrieve(input).await?;
        let prompt = self.build_prompt(input, &context);
        self.model.complete(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlacementError;
    use crate::vector_store::{Document, MemoryVectorStore};
    use std::sync::Mutex;

    struct AxisEmbedder;

    #[async_trait]
    impl Embedder for AxisEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(if text.contains("python") {
                vec![1.0, 0.0]
            } else {
                vec![0.0, 1.0]
            })
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::new();
            for t in texts {
                out.push(self.embed(t).await?);
            }
            Ok(out)
        }
    }

    #[derive(Default)]
    struct RecordingModel {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatModel for RecordingModel {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("answer".to_string())
        }
    }

    struct FailingModel;

    #[async_trait]
    impl ChatModel for FailingModel {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Err(PlacementError::Llm("quota exceeded".to_string()))
        }
    }

    async fn store() -> Arc<MemoryVectorStore> {
        let store = Arc::new(MemoryVectorStore::new("job_embeddings"));
        store
            .upsert_batch(&[
                Document::new("Needs strong python", vec![1.0, 0.0]),
                Document::new("Sales role", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_prompt_contains_context_and_question() {
        let model = Arc::new(RecordingModel::default());
        let tool = SemanticSearchTool::new(Arc::new(AxisEmbedder), store().await, model.clone())
            .with_top_k(1);

        let answer = tool.call("who wants python").await.unwrap();
        assert_eq!(answer, "answer");

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Context:\nNeeds strong python\n"));
        assert!(prompts[0].contains("Question:\nwho wants python"));
        assert!(!prompts[0].contains("Sales role"));
    }

    #[tokio::test]
    async fn test_passages_joined_with_blank_line() {
        let tool = SemanticSearchTool::new(
            Arc::new(AxisEmbedder),
            store().await,
            Arc::new(RecordingModel::default()),
        );
        let context = tool.retrieve("python").await.unwrap();
        assert_eq!(context, "Needs strong python\n\nSales role");
    }

    #[tokio::test]
    async fn test_model_errors_propagate() {
        let tool = SemanticSearchTool::new(Arc::new(AxisEmbedder), store().await, Arc::new(FailingModel));
        assert!(matches!(tool.call("python").await, Err(PlacementError::Llm(_))));
    }
}
