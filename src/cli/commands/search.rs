//! Search command: answers from the document collection only.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::service::PlacementService;
use anyhow::{anyhow, Result};

const SEMANTIC_TOOL: &str = "RAG_Search_Tool";

/// Run the search command.
pub async fn run_search(question: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Search, &settings) {
        Output::error(&e.to_string());
        return Err(e.into());
    }

    let service = PlacementService::from_settings(&settings)?;
    let tool = service
        .tools()
        .get(SEMANTIC_TOOL)
        .ok_or_else(|| anyhow!("{} is not registered", SEMANTIC_TOOL))?;

    let spinner = Output::spinner("Searching documents...");
    let result = tool.call(question).await;
    spinner.finish_and_clear();

    match result {
        Ok(answer) => {
            println!("\n{}\n", answer);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            Err(e.into())
        }
    }
}
