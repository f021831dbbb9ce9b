use model::core::data_type::DataType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Unknown column '{column}' on table '{table}'")]
    UnknownColumn { table: String, column: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: DataType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnSchema>,
    /// Ordered primary-key columns. Empty when the table has none.
    #[serde(default)]
    pub primary_keys: Vec<String>,
}

impl TableSchema {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            primary_keys: Vec::new(),
        }
    }

    pub fn column(mut self, name: &str, data_type: DataType) -> Self {
        self.columns.push(ColumnSchema {
            name: name.to_string(),
            data_type,
        });
        self
    }

    pub fn primary_key(mut self, columns: &[&str]) -> Self {
        self.primary_keys = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn find_column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn require_column(&self, name: &str) -> Result<&ColumnSchema, SchemaError> {
        self.find_column(name)
            .ok_or_else(|| SchemaError::UnknownColumn {
                table: self.name.clone(),
                column: name.to_string(),
            })
    }
}

/// Table metadata lookup, including primary-key discovery.
pub trait SchemaProvider: Send + Sync {
    fn table(&self, name: &str) -> Result<&TableSchema, SchemaError>;
}

/// Schema declared up front, typically in the query document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<TableSchema>", into = "Vec<TableSchema>")]
pub struct StaticSchema {
    tables: BTreeMap<String, TableSchema>,
}

impl StaticSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: TableSchema) -> Self {
        self.tables.insert(table.name.clone(), table);
        self
    }
}

impl From<Vec<TableSchema>> for StaticSchema {
    fn from(tables: Vec<TableSchema>) -> Self {
        tables.into_iter().fold(Self::new(), Self::with_table)
    }
}

impl From<StaticSchema> for Vec<TableSchema> {
    fn from(schema: StaticSchema) -> Self {
        schema.tables.into_values().collect()
    }
}

impl SchemaProvider for StaticSchema {
    fn table(&self, name: &str) -> Result<&TableSchema, SchemaError> {
        self.tables
            .get(name)
            .ok_or_else(|| SchemaError::UnknownTable(name.to_string()))
    }
}
