//! Structured query tool against a seeded placements database.

mod common;

use placement_ai::db::{ConnectionPool, PoolConfig};
use placement_ai::tools::{SqlQueryTool, Tool};
use std::sync::Arc;

fn tool_for(fixture: &common::PlacementsFixture) -> SqlQueryTool {
    let pool = Arc::new(ConnectionPool::new(PoolConfig::new(&fixture.path)));
    pool.initialize().unwrap();
    SqlQueryTool::new(pool)
}

#[tokio::test]
async fn phase_filter_returns_only_matching_companies() {
    let fixture = common::placements_db();
    let tool = tool_for(&fixture);

    let out = tool
        .call("SELECT company_name FROM placements WHERE phase = 1")
        .await
        .unwrap();

    assert!(out.starts_with("Query executed successfully. Results (3 rows):"));
    for company in common::PHASE_1_COMPANIES {
        assert!(out.contains(&format!("company_name={}", company)), "{out}");
    }
    for company in common::PHASE_2_COMPANIES {
        assert!(!out.contains(company), "{out}");
    }
}

#[tokio::test]
async fn invalid_sql_is_reported_as_text() {
    let fixture = common::placements_db();
    let tool = tool_for(&fixture);

    let out = tool.call("SELECT nonexistent_column FROM placements").await.unwrap();
    assert!(out.starts_with("Error executing SQL query:"), "{out}");

    let out = tool.call("SELEC company_name FROM placements").await.unwrap();
    assert!(out.starts_with("Error executing SQL query:"), "{out}");
}

#[tokio::test]
async fn writes_are_rejected_and_leave_data_untouched() {
    let fixture = common::placements_db();
    let tool = tool_for(&fixture);

    let out = tool.call("DELETE FROM placements").await.unwrap();
    assert!(out.starts_with("Error executing SQL query:"), "{out}");

    let out = tool
        .call("SELECT 1; DROP TABLE placements")
        .await
        .unwrap();
    assert!(out.starts_with("Error executing SQL query:"), "{out}");

    let rows = tool.execute("SELECT count(*) AS n FROM placements").await.unwrap();
    assert_eq!(rows.rows, vec![vec!["6".to_string()]]);
}

#[tokio::test]
async fn json_array_columns_are_queryable() {
    let fixture = common::placements_db();
    let tool = tool_for(&fixture);

    let out = tool
        .call(
            "SELECT DISTINCT p.company_name FROM placements p, json_each(p.job_location) loc \
             WHERE loc.value = 'Mumbai' ORDER BY p.company_name",
        )
        .await
        .unwrap();

    assert_eq!(
        out,
        "Query executed successfully. Results (2 rows):\n\
         company_name=Goldman Sachs\n\
         company_name=Tata Consultancy Services"
    );
}

#[tokio::test]
async fn nulls_and_empty_results_render() {
    let fixture = common::placements_db();
    let tool = tool_for(&fixture);

    let out = tool
        .call("SELECT company_name, ctc_btech FROM placements WHERE ctc_btech IS NULL")
        .await
        .unwrap();
    assert!(out.contains("company_name=Acme Design Studio, ctc_btech=NULL"), "{out}");

    let out = tool
        .call("SELECT company_name FROM placements WHERE phase = 3")
        .await
        .unwrap();
    assert_eq!(out, "Query executed successfully. No rows returned.");
}
