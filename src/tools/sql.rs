//! Structured query tool over the placements table.

use super::{QueryGuard, Tool};
use crate::db::ConnectionPool;
use crate::error::{PlacementError, Result};
use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Schema advertised to the agent so it can author queries.
pub const PLACEMENTS_SCHEMA: &str = r#"Table: placements
Columns:
- company_name (TEXT)
- job_role (TEXT)
- job_location (TEXT, JSON array of strings)
- gross_salary_btech (INTEGER, NULL if no B.Tech offer)
- ctc_btech (INTEGER, NULL if no B.Tech offer)
- currency (TEXT)
- job_requirements (TEXT, JSON array of strings)
- company_info (TEXT, JSON array of strings)
- additional_details (TEXT, JSON array of strings)
- phase (INTEGER, 1 or 2)"#;

const DESCRIPTION: &str = "This tool executes SQL queries on the placements database. \
It's useful for questions that require filtering, counting, or aggregating data, \
like 'how many companies offer jobs in Mumbai?' or 'what is the average CTC?'. \
Input must be a single read-only SQLite SELECT statement against the placements table.";

/// Rows fetched by a query, already rendered to text.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl QueryRows {
    /// Human-readable summary handed back to the agent.
    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return "Query executed successfully. No rows returned.".to_string();
        }

        let lines = self
            .rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(column, value)| format!("{}={}", column, value))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Query executed successfully. Results ({} rows):\n{}",
            self.rows.len(),
            lines
        )
    }
}

/// Runs agent-authored SQL against the pool. Always answers with text.
pub struct SqlQueryTool {
    pool: Arc<ConnectionPool>,
    guard: QueryGuard,
}

impl SqlQueryTool {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self {
            pool,
            guard: QueryGuard::default(),
        }
    }

    pub fn with_guard(mut self, guard: QueryGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Validate and execute `query`, surfacing every failure as `Err`.
    #[instrument(skip(self))]
    pub async fn execute(&self, query: &str) -> Result<QueryRows> {
        let statement = self.guard.check(query)?;
        let conn = self.pool.acquire().await?;

        tokio::task::spawn_blocking(move || fetch_rows(&conn, &statement))
            .await
            .map_err(|e| PlacementError::Tool(format!("Query task failed: {}", e)))?
    }
}

#[async_trait]
impl Tool for SqlQueryTool {
    fn name(&self) -> &str {
        "SQL_Query_Executor"
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    async fn call(&self, input: &str) -> Result<String> {
        match self.execute(input).await {
            Ok(rows) => {
                debug!("Query returned {} rows", rows.rows.len());
                Ok(rows.render())
            }
            Err(e) => {
                warn!("SQL tool error: {}", e);
                Ok(format!("Error executing SQL query: {}", e))
            }
        }
    }
}

fn fetch_rows(conn: &Connection, statement: &str) -> Result<QueryRows> {
    let mut stmt = conn.prepare(statement)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

    let mut rows = Vec::new();
    let mut cursor = stmt.query([])?;
    while let Some(row) = cursor.next()? {
        let mut values = Vec::with_capacity(columns.len());
        for i in 0..columns.len() {
            values.push(render_value(row.get_ref(i)?));
        }
        rows.push(values);
    }

    Ok(QueryRows { columns, rows })
}

fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_rows() {
        let rows = QueryRows {
            columns: vec!["company_name".to_string(), "ctc_btech".to_string()],
            rows: vec![
                vec!["Google India Pvt Ltd".to_string(), "3500000".to_string()],
                vec!["Acme Design".to_string(), "NULL".to_string()],
            ],
        };
        assert_eq!(
            rows.render(),
            "Query executed successfully. Results (2 rows):\n\
             company_name=Google India Pvt Ltd, ctc_btech=3500000\n\
             company_name=Acme Design, ctc_btech=NULL"
        );
    }

    #[test]
    fn test_render_empty() {
        let rows = QueryRows {
            columns: vec!["company_name".to_string()],
            rows: vec![],
        };
        assert_eq!(rows.render(), "Query executed successfully. No rows returned.");
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(ValueRef::Null), "NULL");
        assert_eq!(render_value(ValueRef::Integer(42)), "42");
        assert_eq!(render_value(ValueRef::Real(1.5)), "1.5");
        assert_eq!(render_value(ValueRef::Text(b"Pune")), "Pune");
        assert_eq!(render_value(ValueRef::Blob(&[1, 2, 3])), "<3 bytes>");
    }

    #[tokio::test]
    async fn test_uninitialized_pool_reported_as_text() {
        let pool = Arc::new(ConnectionPool::new(crate::db::PoolConfig::new("unused.db")));
        let tool = SqlQueryTool::new(pool);
        let out = tool.call("SELECT 1").await.unwrap();
        assert!(out.starts_with("Error executing SQL query:"));
        assert!(out.contains("not initialized"));
    }
}
