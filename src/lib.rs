//! Placement AI - natural-language answers over a college placement database.
//!
//! A tool-calling agent receives each question and decides whether to query the
//! `placements` table with SQL, search job and company documents semantically,
//! or both.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `db` - Bounded connection pool for the placements database
//! - `embedding` - Embedding generation
//! - `vector_store` - Document collection with cosine similarity search
//! - `llm` - Single-prompt text generation
//! - `tools` - The SQL and semantic search tools, plus the `Toolbox` registry
//! - `agent` - The `Responder` seam and the tool-calling agent loop
//! - `service` - Wiring of the above into one request handler
//! - `server` - HTTP endpoints
//!
//! # Example
//!
//! ```rust,no_run
//! use placement_ai::config::Settings;
//! use placement_ai::service::PlacementService;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let service = PlacementService::from_settings(&settings)?;
//!     service.start()?;
//!
//!     let answer = service.chat("Which companies recruited in phase 1?").await?;
//!     println!("{}", answer);
//!
//!     service.shutdown();
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod db;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod openai;
pub mod server;
pub mod service;
pub mod tools;
pub mod vector_store;

pub use error::{PlacementError, Result};
