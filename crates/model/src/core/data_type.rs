use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DataType {
    Short,
    Int,
    Long,
    LongLong,
    IntUnsigned,
    Float,
    Double,
    Decimal,
    Boolean,
    Null,
    Date,
    Time,
    Timestamp,
    Char,
    VarChar,
    String,
    Json,
    Uuid,
    Bytea,
    Blob,
    Geometry,
    Array(Option<String>),
    Custom(String),
}

impl DataType {
    /// Maps a driver-reported type name (e.g. `BIGINT`, `TEXT`, `geometry`)
    /// onto the generic type. Unknown names are kept as `Custom`.
    pub fn from_type_name(type_name: &str) -> Self {
        let normalized = type_name.trim().to_ascii_lowercase();
        let base = normalized
            .split(|c: char| c == '(' || c.is_whitespace())
            .next()
            .unwrap_or_default();

        match base {
            "smallint" | "int2" | "tinyint" => DataType::Short,
            "int" | "int4" | "integer" | "mediumint" => DataType::Int,
            "long" => DataType::Long,
            "bigint" | "int8" => DataType::LongLong,
            "real" | "float" | "float4" => DataType::Float,
            "double" | "float8" => DataType::Double,
            "decimal" | "numeric" => DataType::Decimal,
            "bool" | "boolean" => DataType::Boolean,
            "null" => DataType::Null,
            "date" => DataType::Date,
            "time" => DataType::Time,
            "timestamp" | "timestamptz" | "datetime" => DataType::Timestamp,
            "char" | "bpchar" => DataType::Char,
            "varchar" => DataType::VarChar,
            "text" | "string" => DataType::String,
            "json" | "jsonb" => DataType::Json,
            "uuid" => DataType::Uuid,
            "bytea" => DataType::Bytea,
            "blob" | "longblob" | "mediumblob" | "tinyblob" | "binary" | "varbinary" => {
                DataType::Blob
            }
            "geometry" | "geography" | "point" | "linestring" | "polygon" | "multipoint"
            | "multilinestring" | "multipolygon" | "geometrycollection" => DataType::Geometry,
            other if other.ends_with("[]") => {
                DataType::Array(Some(other.trim_end_matches("[]").to_string()))
            }
            _ => DataType::Custom(type_name.to_string()),
        }
    }

    pub fn is_geometry(&self) -> bool {
        matches!(self, DataType::Geometry)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Array(Some(inner)) => write!(f, "{inner}[]"),
            DataType::Array(None) => write!(f, "ARRAY"),
            DataType::Custom(name) => write!(f, "{name}"),
            other => write!(f, "{}", format!("{other:?}").to_uppercase()),
        }
    }
}
