//! Wiring of pool, tools, and agent into one request-handling service.

use crate::agent::{Responder, ToolCallingAgent};
use crate::config::{Prompts, Settings};
use crate::db::{ConnectionPool, PoolConfig};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{PlacementError, Result};
use crate::llm::{ChatModel, OpenAIChatModel};
use crate::openai::create_client;
use crate::tools::{SemanticSearchTool, SqlQueryTool, Toolbox, PLACEMENTS_SCHEMA};
use crate::vector_store::{MemoryVectorStore, SqliteVectorStore, VectorStore};
use std::sync::Arc;
use tracing::{info, instrument};

/// Everything a chat request needs, owned explicitly rather than held in globals.
pub struct PlacementService {
    pool: Arc<ConnectionPool>,
    tools: Toolbox,
    responder: Arc<dyn Responder>,
}

impl PlacementService {
    /// Assemble a service from already-built parts.
    pub fn new(pool: Arc<ConnectionPool>, tools: Toolbox, responder: Arc<dyn Responder>) -> Self {
        Self {
            pool,
            tools,
            responder,
        }
    }

    /// Build the production wiring described by `settings`.
    ///
    /// The pool is created but not initialized; call [`start`](Self::start).
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let api_key = settings.api_key()?;
        let client = create_client(&settings.llm, &api_key)?;

        let pool = Arc::new(ConnectionPool::new(PoolConfig::from(settings)));

        let embedder: Arc<dyn Embedder> = Arc::new(
            OpenAIEmbedder::new(client.clone(), &settings.embedding.model)
                .with_dimensions(settings.embedding.dimensions),
        );
        let vector_store = open_vector_store(settings)?;
        let model: Arc<dyn ChatModel> = Arc::new(
            OpenAIChatModel::new(client.clone(), &settings.llm.model)
                .with_temperature(settings.llm.temperature),
        );

        let tools = Toolbox::new()
            .with(Arc::new(SqlQueryTool::new(pool.clone())))
            .with(Arc::new(
                SemanticSearchTool::new(embedder, vector_store, model)
                    .with_prompts(prompts.clone())
                    .with_top_k(settings.vector_store.top_k),
            ));

        let responder: Arc<dyn Responder> = Arc::new(
            ToolCallingAgent::new(
                client,
                &settings.llm.model,
                &prompts.agent_system(PLACEMENTS_SCHEMA),
            )
            .with_max_iterations(settings.llm.max_iterations)
            .with_temperature(settings.llm.temperature),
        );

        info!(
            "Placement service configured (model {}, tools: {})",
            settings.llm.model,
            tools.names().join(", ")
        );

        Ok(Self::new(pool, tools, responder))
    }

    /// Initialize the connection pool.
    pub fn start(&self) -> Result<()> {
        self.pool.initialize()
    }

    /// Close the connection pool.
    pub fn shutdown(&self) {
        self.pool.shutdown();
    }

    /// Answer a query statelessly: no prior turns are carried between requests.
    #[instrument(skip(self))]
    pub async fn chat(&self, query: &str) -> Result<String> {
        self.responder.respond(query, &[], &self.tools).await
    }

    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }

    pub fn tools(&self) -> &Toolbox {
        &self.tools
    }
}

/// Open the configured vector store provider.
pub fn open_vector_store(settings: &Settings) -> Result<Arc<dyn VectorStore>> {
    let collection = &settings.vector_store.collection;
    match settings.vector_store.provider.as_str() {
        "sqlite" => Ok(Arc::new(SqliteVectorStore::new(
            &settings.sqlite_path(),
            collection,
        )?)),
        "memory" => Ok(Arc::new(MemoryVectorStore::new(collection))),
        other => Err(PlacementError::Config(format!(
            "Unknown vector store provider: {}",
            other
        ))),
    }
}
