//! Defines the `Dialect` trait for database-specific SQL syntax.

use crate::query::ast::expr::{Expr, FunctionCall};
use model::core::data_type::DataType;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub trait Dialect: Send + Sync {
    /// Wraps an identifier (like a table or column name) in the correct
    /// quotation marks for the dialect. Embedded quote characters are doubled.
    ///
    /// - PostgreSQL and SQLite use double quotes: `"my_column"`
    /// - MySQL uses backticks: `` `my_column` ``
    fn quote_identifier(&self, ident: &str) -> String;

    /// Returns the placeholder for a parameterized query.
    ///
    /// - PostgreSQL uses `$1`, `$2`, etc.
    /// - MySQL and SQLite use `?`
    fn get_placeholder(&self, index: usize) -> String;

    /// Returns the name of the dialect (e.g., "PostgreSQL", "MySQL").
    fn name(&self) -> String;

    /// Wraps a geometry column so it is selected in a transferable encoding.
    fn encode_geometry(&self, column: Expr) -> Expr {
        Expr::FunctionCall(FunctionCall {
            name: "ST_AsBinary".into(),
            args: vec![column],
            wildcard: false,
        })
    }

    /// Type name used in `CAST(... AS <type>)`.
    fn cast_type(&self, data_type: &DataType) -> String {
        data_type.to_string()
    }

    /// Literal used as `LIMIT` when only an `OFFSET` is requested, for
    /// databases that cannot express `OFFSET` on its own.
    fn unbounded_limit(&self) -> Option<&'static str> {
        None
    }
}

fn quote_with(ident: &str, quote: char) -> String {
    let doubled: String = [quote, quote].iter().collect();
    format!("{quote}{}{quote}", ident.replace(quote, &doubled))
}

#[derive(Debug, Clone)]
pub struct Postgres;

impl Dialect for Postgres {
    fn quote_identifier(&self, ident: &str) -> String {
        quote_with(ident, '"')
    }

    fn get_placeholder(&self, index: usize) -> String {
        // PostgreSQL uses $1, $2, etc.
        format!("${}", index + 1)
    }

    fn name(&self) -> String {
        "PostgreSQL".into()
    }

    fn cast_type(&self, data_type: &DataType) -> String {
        match data_type {
            DataType::Timestamp => "TIMESTAMPTZ".into(),
            DataType::Json => "JSONB".into(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MySql;

impl Dialect for MySql {
    fn quote_identifier(&self, ident: &str) -> String {
        quote_with(ident, '`')
    }

    fn get_placeholder(&self, _index: usize) -> String {
        "?".into()
    }

    fn name(&self) -> String {
        "MySQL".into()
    }

    fn cast_type(&self, data_type: &DataType) -> String {
        match data_type {
            DataType::Timestamp => "DATETIME".into(),
            DataType::Uuid => "CHAR(36)".into(),
            other => other.to_string(),
        }
    }

    fn unbounded_limit(&self) -> Option<&'static str> {
        Some("18446744073709551615")
    }
}

#[derive(Debug, Clone)]
pub struct Sqlite;

impl Dialect for Sqlite {
    fn quote_identifier(&self, ident: &str) -> String {
        quote_with(ident, '"')
    }

    fn get_placeholder(&self, _index: usize) -> String {
        "?".into()
    }

    fn name(&self) -> String {
        "SQLite".into()
    }

    // Dates, uuids and documents are stored as text.
    fn cast_type(&self, data_type: &DataType) -> String {
        match data_type {
            DataType::Date | DataType::Timestamp | DataType::Uuid | DataType::Json => {
                "TEXT".into()
            }
            other => other.to_string(),
        }
    }

    // SpatiaLite spells it without the ST_ prefix.
    fn encode_geometry(&self, column: Expr) -> Expr {
        Expr::FunctionCall(FunctionCall {
            name: "AsBinary".into(),
            args: vec![column],
            wildcard: false,
        })
    }

    fn unbounded_limit(&self) -> Option<&'static str> {
        Some("-1")
    }
}

/// Serializable selector for one of the built-in dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    #[default]
    Postgres,
    MySql,
    Sqlite,
}

impl DialectKind {
    pub fn dialect(&self) -> Box<dyn Dialect> {
        match self {
            DialectKind::Postgres => Box::new(Postgres),
            DialectKind::MySql => Box::new(MySql),
            DialectKind::Sqlite => Box::new(Sqlite),
        }
    }
}

impl FromStr for DialectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(DialectKind::Postgres),
            "mysql" => Ok(DialectKind::MySql),
            "sqlite" => Ok(DialectKind::Sqlite),
            other => Err(format!("unknown dialect: {other}")),
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialectKind::Postgres => write!(f, "postgres"),
            DialectKind::MySql => write!(f, "mysql"),
            DialectKind::Sqlite => write!(f, "sqlite"),
        }
    }
}
