use crate::error::CliError;
use model::{core::value::Value, records::row::RowData};
use planner::compiler::CompiledStatement;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

#[derive(Serialize)]
struct StatementReport<'a> {
    sql: &'a str,
    params: Vec<JsonValue>,
    columns: Vec<&'a str>,
}

pub fn print_statement(stmt: &CompiledStatement) -> Result<(), CliError> {
    let report = StatementReport {
        sql: &stmt.sql,
        params: stmt.params.iter().map(Value::to_json).collect(),
        columns: stmt.shape.column_names(),
    };
    let json = serde_json::to_string_pretty(&report).map_err(CliError::JsonSerialize)?;
    println!("{json}");
    Ok(())
}

/// One JSON object per row, keyed by column name in projection order.
fn rows_json(rows: &[RowData]) -> Result<String, CliError> {
    let objects = rows
        .iter()
        .map(|row| {
            row.field_values
                .iter()
                .map(|field| {
                    let value = field.value.as_ref().map_or(JsonValue::Null, Value::to_json);
                    (field.name.clone(), value)
                })
                .collect::<Map<_, _>>()
        })
        .collect::<Vec<_>>();
    serde_json::to_string_pretty(&objects).map_err(CliError::JsonSerialize)
}

pub async fn write_rows(rows: &[RowData], path: Option<String>) -> Result<(), CliError> {
    let json = rows_json(rows)?;
    match path {
        Some(path) => tokio::fs::write(path, json).await?,
        None => println!("{json}"),
    }
    Ok(())
}
