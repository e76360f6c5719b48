//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::service::PlacementService;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(query: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&e.to_string());
        return Err(e.into());
    }

    let service = PlacementService::from_settings(&settings)?;
    service.start()?;

    let spinner = Output::spinner("Thinking...");
    let result = service.chat(query).await;
    spinner.finish_and_clear();
    service.shutdown();

    match result {
        Ok(answer) => {
            println!("\n{}\n", answer);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to answer: {}", e));
            Err(e.into())
        }
    }
}
