//! Pre-flight checks before starting work.
//!
//! Catches missing credentials or a missing database before a request would
//! otherwise fail midway.

use crate::config::Settings;
use crate::error::{PlacementError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Serving and asking need the model and the database.
    Serve,
    Ask,
    /// Raw SQL needs only the database.
    Sql,
    /// Semantic search needs only the model.
    Search,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Serve | Operation::Ask => {
            check_api_key(settings)?;
            check_database(settings)?;
        }
        Operation::Sql => check_database(settings)?,
        Operation::Search => check_api_key(settings)?,
    }
    Ok(())
}

fn check_api_key(settings: &Settings) -> Result<()> {
    settings.api_key().map(|_| ()).map_err(|e| {
        PlacementError::Config(format!(
            "{}. Set it with: export {}='...'",
            e, settings.llm.api_key_env
        ))
    })
}

fn check_database(settings: &Settings) -> Result<()> {
    let path = settings.database_path();
    if path.exists() {
        Ok(())
    } else {
        Err(PlacementError::Config(format!(
            "Placements database not found at {:?}. Set DATABASE_URL or database.url.",
            path
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_requires_database() {
        let mut settings = Settings::default();
        settings.database.url = "/nonexistent/placements.db".to_string();
        let err = check(Operation::Sql, &settings).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_search_requires_api_key() {
        let mut settings = Settings::default();
        settings.llm.api_key_env = "PLACEMENT_AI_TEST_UNSET_KEY".to_string();
        let err = check(Operation::Search, &settings).unwrap_err();
        assert!(err.to_string().contains("PLACEMENT_AI_TEST_UNSET_KEY"));
    }
}
