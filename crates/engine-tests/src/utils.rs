#![allow(dead_code)]

use connectors::sql::executor::{SqlxExecutor, StatementExecutor};
use model::{core::value::Value, records::row::RowData};
use planner::config::QueryDocument;

/// Compile the document and fetch every row, panicking on any error
pub async fn fetch_rows(executor: &SqlxExecutor, doc: &QueryDocument) -> Vec<RowData> {
    let stmt = doc.compile().expect("compile plan");
    executor.fetch_all(&stmt).await.expect("fetch rows")
}

/// Compile the count statement and run it, panicking on any error
pub async fn fetch_count(executor: &SqlxExecutor, doc: &QueryDocument) -> i64 {
    let stmt = doc.compile_count().expect("compile count");
    executor.fetch_count(&stmt).await.expect("fetch count")
}

/// Values of one column across all rows, as integers
pub fn column_as_i64(rows: &[RowData], column: &str) -> Vec<i64> {
    rows.iter()
        .map(|row| {
            row.get_value(column)
                .as_i64()
                .unwrap_or_else(|| panic!("column '{column}' is not an integer"))
        })
        .collect()
}

pub fn column_as_string(rows: &[RowData], column: &str) -> Vec<String> {
    rows.iter()
        .map(|row| match row.get_value(column) {
            Value::String(v) => v,
            other => panic!("column '{column}' is not text: {other:?}"),
        })
        .collect()
}
