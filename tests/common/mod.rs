//! Shared fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use placement_ai::agent::{ChatTurn, Responder};
use placement_ai::embedding::Embedder;
use placement_ai::llm::ChatModel;
use placement_ai::tools::Toolbox;
use placement_ai::{PlacementError, Result};
use rusqlite::{params, Connection};
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

pub const PHASE_1_COMPANIES: &[&str] = &["Google India Pvt Ltd", "Microsoft Corporation", "Goldman Sachs"];
pub const PHASE_2_COMPANIES: &[&str] = &["Tata Consultancy Services", "Infosys Limited", "Acme Design Studio"];

/// A placements database in a temp dir with three phase-1 and three phase-2 rows.
pub struct PlacementsFixture {
    pub dir: TempDir,
    pub path: PathBuf,
}

pub fn placements_db() -> PlacementsFixture {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("placements.db");
    let conn = Connection::open(&path).unwrap();

    conn.execute_batch(
        r#"
        CREATE TABLE placements (
            company_name TEXT NOT NULL,
            job_role TEXT NOT NULL,
            job_location TEXT NOT NULL,
            gross_salary_btech INTEGER,
            ctc_btech INTEGER,
            currency TEXT NOT NULL,
            job_requirements TEXT NOT NULL,
            company_info TEXT NOT NULL,
            additional_details TEXT NOT NULL,
            phase INTEGER NOT NULL
        );
        "#,
    )
    .unwrap();

    let rows: &[(&str, &str, &str, Option<i64>, Option<i64>, i64)] = &[
        ("Google India Pvt Ltd", "Software Engineer", r#"["Bangalore","Hyderabad"]"#, Some(3_200_000), Some(4_000_000), 1),
        ("Microsoft Corporation", "SDE", r#"["Hyderabad"]"#, Some(2_900_000), Some(3_600_000), 1),
        ("Goldman Sachs", "Analyst", r#"["Mumbai"]"#, Some(2_000_000), Some(2_500_000), 1),
        ("Tata Consultancy Services", "Systems Engineer", r#"["Mumbai","Pune"]"#, Some(700_000), Some(900_000), 2),
        ("Infosys Limited", "Specialist Programmer", r#"["Mysore"]"#, Some(800_000), Some(950_000), 2),
        ("Acme Design Studio", "Product Designer", r#"["Pune"]"#, None, None, 2),
    ];

    for (company, role, locations, gross, ctc, phase) in rows {
        conn.execute(
            "INSERT INTO placements VALUES (?1, ?2, ?3, ?4, ?5, 'INR', '[]', '[]', '[]', ?6)",
            params![company, role, locations, gross, ctc, phase],
        )
        .unwrap();
    }

    PlacementsFixture { dir, path }
}

/// Deterministic bag-of-words embedder: each lowercase word is hashed into
/// one of 256 buckets.
pub struct HashEmbedder;

impl HashEmbedder {
    pub fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; 256];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hash: u32 = 0x811c_9dc5;
            for b in word.to_lowercase().bytes() {
                hash ^= b as u32;
                hash = hash.wrapping_mul(0x0100_0193);
            }
            v[(hash % 256) as usize] += 1.0;
        }
        v
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(Self::vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }
}

/// Chat model that records every prompt and answers with a fixed string.
#[derive(Default)]
pub struct RecordingModel {
    pub prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl ChatModel for RecordingModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok("summarized answer".to_string())
    }
}

/// Responder that replays a fixed sequence of tool calls and answers with
/// their observations joined by newlines.
pub struct ScriptedResponder {
    pub steps: Vec<(String, String)>,
}

impl ScriptedResponder {
    pub fn new(steps: &[(&str, &str)]) -> Self {
        Self {
            steps: steps
                .iter()
                .map(|(tool, input)| (tool.to_string(), input.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl Responder for ScriptedResponder {
    async fn respond(&self, _query: &str, history: &[ChatTurn], tools: &Toolbox) -> Result<String> {
        assert!(history.is_empty(), "requests must not carry history");

        let mut observations = Vec::new();
        for (tool, input) in &self.steps {
            let arguments = serde_json::json!({ "query": input }).to_string();
            observations.push(tools.execute(tool, &arguments).await?);
        }
        Ok(observations.join("\n"))
    }
}

/// Responder whose orchestration always fails.
pub struct FailingResponder;

#[async_trait]
impl Responder for FailingResponder {
    async fn respond(&self, _query: &str, _history: &[ChatTurn], _tools: &Toolbox) -> Result<String> {
        Err(PlacementError::Llm("model endpoint unreachable".to_string()))
    }
}
