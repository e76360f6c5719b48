//! Sql command: runs a statement through the structured query tool.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::db::{ConnectionPool, PoolConfig};
use crate::tools::{SqlQueryTool, Tool};
use anyhow::Result;
use std::sync::Arc;

/// Run the sql command. Prints exactly what the agent would see.
pub async fn run_sql(statement: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Sql, &settings) {
        Output::error(&e.to_string());
        return Err(e.into());
    }

    let pool = Arc::new(ConnectionPool::new(PoolConfig::from(&settings)));
    pool.initialize()?;

    let output = SqlQueryTool::new(pool.clone()).call(statement).await?;
    println!("{}", output);

    pool.shutdown();
    Ok(())
}
