//! In-memory vector store implementation.
//!
//! Useful for testing and small datasets.

use super::{rank, Document, SearchResult, VectorStore};
use crate::error::{PlacementError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// In-memory vector store.
pub struct MemoryVectorStore {
    collection: String,
    documents: RwLock<HashMap<Uuid, Document>>,
}

impl MemoryVectorStore {
    /// Create an empty store for `collection`.
    pub fn new(collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
            documents: RwLock::new(HashMap::new()),
        }
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> PlacementError {
    PlacementError::VectorStore(format!("Failed to acquire lock: {}", e))
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    fn collection(&self) -> &str {
        &self.collection
    }

    async fn upsert(&self, doc: &Document) -> Result<()> {
        let mut docs = self.documents.write().map_err(poisoned)?;
        docs.insert(doc.id, doc.clone());
        Ok(())
    }

    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        let mut store = self.documents.write().map_err(poisoned)?;
        for doc in docs {
            store.insert(doc.id, doc.clone());
        }
        Ok(docs.len())
    }

    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        let docs = self.documents.read().map_err(poisoned)?;
        Ok(rank(query_embedding, docs.values().cloned(), limit))
    }

    async fn document_count(&self) -> Result<usize> {
        let docs = self.documents.read().map_err(poisoned)?;
        Ok(docs.len())
    }
}
