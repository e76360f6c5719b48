//! SQLite-based vector store implementation.
//!
//! Embeddings are stored as little-endian f32 blobs and scored with cosine
//! similarity in Rust after a full scan of the collection.

use super::{rank, Document, SearchResult, VectorStore};
use crate::error::{PlacementError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    collection TEXT NOT NULL,
    content TEXT NOT NULL,
    metadata TEXT NOT NULL,
    embedding BLOB NOT NULL,
    indexed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection);
"#;

const UPSERT: &str = r#"
INSERT OR REPLACE INTO documents (id, collection, content, metadata, embedding, indexed_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

const SCAN: &str = r#"
SELECT id, content, metadata, embedding, indexed_at
FROM documents
WHERE collection = ?1
"#;

/// SQLite-based vector store bound to one collection.
pub struct SqliteVectorStore {
    conn: Arc<Mutex<Connection>>,
    collection: String,
}

impl SqliteVectorStore {
    /// Open (or create) the store at `path`.
    #[instrument(skip_all, fields(collection = %collection))]
    pub fn new(path: &Path, collection: &str) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Opened SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            collection: collection.to_string(),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory(collection: &str) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            collection: collection.to_string(),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        lock(&self.conn)
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn row_to_document(row: &Row<'_>) -> rusqlite::Result<Document> {
        let id_str: String = row.get(0)?;
        let metadata_str: String = row.get(2)?;
        let embedding_bytes: Vec<u8> = row.get(3)?;
        let indexed_at_str: String = row.get(4)?;

        Ok(Document {
            id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
            content: row.get(1)?,
            metadata: serde_json::from_str(&metadata_str).unwrap_or(serde_json::Value::Null),
            embedding: Self::bytes_to_embedding(&embedding_bytes),
            indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }

    fn insert(&self, conn: &Connection, doc: &Document) -> Result<()> {
        conn.execute(
            UPSERT,
            params![
                doc.id.to_string(),
                self.collection,
                doc.content,
                serde_json::to_string(&doc.metadata)?,
                Self::embedding_to_bytes(&doc.embedding),
                doc.indexed_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    fn collection(&self) -> &str {
        &self.collection
    }

    #[instrument(skip(self, doc))]
    async fn upsert(&self, doc: &Document) -> Result<()> {
        let conn = self.lock()?;
        self.insert(&conn, doc)?;
        debug!("Upserted document {}", doc.id);
        Ok(())
    }

    #[instrument(skip(self, docs), fields(count = docs.len()))]
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        for doc in docs {
            self.insert(&tx, doc)?;
        }

        tx.commit()?;
        info!("Batch upserted {} documents into {}", docs.len(), self.collection);
        Ok(docs.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        let conn = self.conn.clone();
        let collection = self.collection.clone();
        let query = query_embedding.to_vec();

        let results = tokio::task::spawn_blocking(move || scan(&conn, &collection, &query, limit))
            .await
            .map_err(|e| PlacementError::VectorStore(format!("Search task failed: {}", e)))??;

        debug!("Found {} matching documents", results.len());
        Ok(results)
    }

    async fn document_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            params![self.collection],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|e| PlacementError::VectorStore(format!("Failed to acquire lock: {}", e)))
}

/// Score every document in `collection` against `query`.
fn scan(
    conn: &Mutex<Connection>,
    collection: &str,
    query: &[f32],
    limit: usize,
) -> Result<Vec<SearchResult>> {
    let conn = lock(conn)?;
    let mut stmt = conn.prepare(SCAN)?;

    let docs = stmt
        .query_map(params![collection], SqliteVectorStore::row_to_document)?
        .filter_map(|row| match row {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!("Skipping undecodable document in {}: {}", collection, e);
                None
            }
        });

    Ok(rank(query, docs, limit))
}
