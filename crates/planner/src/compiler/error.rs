use crate::{filter::encoder::EncodeError, schema::SchemaError};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CompileError {
    #[error("Natural or reverse ordering is not supported on joined table '{0}'")]
    NaturalOrder(String),

    #[error("Join step {step} ('{table}') declares no sort keys")]
    MissingSortKeys { step: usize, table: String },

    #[error("Sort key '{column}' appears more than once for table '{table}'")]
    DuplicateSortKey { table: String, column: String },

    #[error("Join column '{column}' does not exist on table '{table}'")]
    UnknownJoinColumn { table: String, column: String },

    #[error("Join step {step} ('{table}') carries its own filter; filter the root plan instead")]
    PerStepFilter { step: usize, table: String },

    #[error("Filter cannot be fully evaluated by the database: {0}")]
    UnpushableFilter(String),

    #[error("Plan for '{0}' projects no columns")]
    EmptyProjection(String),

    #[error("Plan for '{0}' has join steps; use the joining compiler")]
    UnexpectedJoins(String),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Filter encoding error: {0}")]
    Encoding(#[from] EncodeError),
}
