use thiserror::Error;

/// All errors coming from the database/query layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// Any SQL driver error.
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    /// A column held a value of a type the row decoder does not handle.
    #[error("Unsupported type '{type_name}' in column '{column}'")]
    UnsupportedType { column: String, type_name: String },

    /// A statement expected to return a row returned none.
    #[error("Statement returned no rows: {0}")]
    NoRows(String),

    #[error("Count statement returned a non-integer value: {0}")]
    InvalidCount(String),
}

/// Errors happening during connection setup.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// SQLx failed to build the connection or pool.
    #[error("SQLx connector creation failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Unsupported connection string: {0}")]
    UnsupportedUrl(String),
}
