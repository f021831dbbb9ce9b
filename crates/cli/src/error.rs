use connectors::error::{ConnectorError, DbError};
use planner::compiler::error::CompileError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read the query document: {0}")]
    ConfigFileRead(#[from] std::io::Error),

    #[error("Failed to deserialize the query document: {0}")]
    ConfigDeserialize(#[from] serde_json::Error),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(serde_json::Error),

    #[error("Invalid dialect: {0}")]
    InvalidDialect(String),

    #[error("Failed to compile the plan: {0}")]
    Compile(#[from] CompileError),

    #[error("Connection error: {0}")]
    Connector(#[from] ConnectorError),

    #[error("Database error: {0}")]
    Db(#[from] DbError),
}
