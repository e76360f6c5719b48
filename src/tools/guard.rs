//! Read-only allow-list for agent-authored SQL.

use crate::error::{PlacementError, Result};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Single-quoted string literals, with `''` escapes.
static STRING_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'(?:[^']|'')*'").expect("Invalid regex: string literal"));

static LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--[^\n]*").expect("Invalid regex: line comment"));

static BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("Invalid regex: block comment"));

// `REPLACE` alone is also the string function, so only the statement form is banned.
static FORBIDDEN_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(INSERT|UPDATE|DELETE|DROP|CREATE|ALTER|ATTACH|DETACH|PRAGMA|VACUUM|REINDEX|REPLACE\s+INTO)\b",
    )
    .expect("Invalid regex: forbidden keyword")
});

static LEADING_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\(*\s*([A-Za-z]+)").expect("Invalid regex: leading keyword"));

/// Accepts exactly one `SELECT` / `WITH` statement and nothing that writes.
#[derive(Debug, Clone)]
pub struct QueryGuard {
    max_query_length: usize,
}

impl Default for QueryGuard {
    fn default() -> Self {
        Self {
            max_query_length: 10_000,
        }
    }
}

impl QueryGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_query_length(mut self, length: usize) -> Self {
        self.max_query_length = length;
        self
    }

    /// Validate `query`, returning the statement with trailing semicolons removed.
    pub fn check(&self, query: &str) -> Result<String> {
        let statement = query.trim().trim_end_matches(|c: char| c == ';' || c.is_whitespace());

        if statement.is_empty() {
            return Err(reject("empty statement"));
        }
        if statement.len() > self.max_query_length {
            return Err(reject(&format!(
                "statement is {} characters, limit is {}",
                statement.len(),
                self.max_query_length
            )));
        }

        // Literals and comments may legitimately contain anything.
        let code = STRING_LITERAL.replace_all(statement, "''");
        let code = BLOCK_COMMENT.replace_all(&code, " ");
        let code = LINE_COMMENT.replace_all(&code, " ");

        if code.contains(';') {
            return Err(reject("only a single statement is allowed"));
        }

        let leading = LEADING_KEYWORD
            .captures(&code)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_ascii_uppercase())
            .unwrap_or_default();
        if leading != "SELECT" && leading != "WITH" {
            return Err(reject("only SELECT or WITH statements are allowed"));
        }

        if let Some(m) = FORBIDDEN_KEYWORD.find(&code) {
            return Err(reject(&format!(
                "'{}' is not allowed in a read-only query",
                m.as_str().to_ascii_uppercase()
            )));
        }

        debug!("Query passed guard");
        Ok(statement.to_string())
    }
}

fn reject(reason: &str) -> PlacementError {
    PlacementError::QueryRejected(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_selects() {
        let guard = QueryGuard::new();
        assert_eq!(
            guard.check("SELECT company_name FROM placements WHERE phase = 1;").unwrap(),
            "SELECT company_name FROM placements WHERE phase = 1"
        );
        assert!(guard
            .check("with p as (select * from placements) select count(*) from p")
            .is_ok());
        assert!(guard.check("(SELECT 1) UNION (SELECT 2)").is_ok());
    }

    #[test]
    fn test_keywords_inside_literals_are_fine() {
        let guard = QueryGuard::new();
        assert!(guard
            .check("SELECT * FROM placements WHERE job_role LIKE '%Update; Delete%'")
            .is_ok());
        assert!(guard
            .check("SELECT * FROM placements WHERE company_name LIKE '%O''Reilly%'")
            .is_ok());
    }

    #[test]
    fn test_rejects_writes() {
        let guard = QueryGuard::new();
        for sql in [
            "DELETE FROM placements",
            "UPDATE placements SET phase = 2",
            "DROP TABLE placements",
            "PRAGMA table_info(placements)",
            "ATTACH DATABASE 'x.db' AS x",
            "WITH x AS (SELECT 1) DELETE FROM placements",
            "WITH x AS (SELECT 1) REPLACE INTO placements SELECT * FROM x",
        ] {
            assert!(
                matches!(guard.check(sql), Err(PlacementError::QueryRejected(_))),
                "accepted: {}",
                sql
            );
        }
    }

    #[test]
    fn test_replace_function_is_allowed() {
        assert!(QueryGuard::new()
            .check("SELECT replace(company_name, 'Pvt Ltd', '') FROM placements")
            .is_ok());
    }

    #[test]
    fn test_rejects_stacked_statements() {
        let guard = QueryGuard::new();
        let err = guard
            .check("SELECT 1; SELECT 2")
            .unwrap_err()
            .to_string();
        assert!(err.contains("single statement"));
    }

    #[test]
    fn test_rejects_empty_and_oversized() {
        let guard = QueryGuard::new().max_query_length(20);
        assert!(guard.check("  ;; ").is_err());
        assert!(guard
            .check("SELECT company_name FROM placements")
            .is_err());
    }
}
