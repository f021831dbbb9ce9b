use model::core::value::Value;
use sqlx::{Any, any::AnyArguments, query::Query};

pub type AnyQuery<'q> = Query<'q, Any, AnyArguments<'q>>;

/// Binds statement parameters positionally.
///
/// The `Any` driver only carries integers, floats, text, booleans and blobs,
/// so richer values travel as their canonical text form. Compiled filters
/// cast those placeholders back to the column type.
pub fn bind_value<'q>(query: AnyQuery<'q>, value: &Value) -> AnyQuery<'q> {
    match value {
        Value::Int(v) => query.bind(*v),
        Value::Uint(v) => match i64::try_from(*v) {
            Ok(v) => query.bind(v),
            Err(_) => query.bind(v.to_string()),
        },
        Value::Float(v) => query.bind(*v),
        Value::Boolean(v) => query.bind(*v),
        Value::String(v) => query.bind(v.clone()),
        Value::Bytes(v) => query.bind(v.clone()),
        Value::Json(v) => query.bind(v.to_string()),
        Value::Uuid(v) => query.bind(v.to_string()),
        Value::Date(v) => query.bind(v.to_string()),
        Value::Timestamp(v) => query.bind(v.to_rfc3339()),
        Value::Null => query.bind(Option::<String>::None),
    }
}

pub fn bind_all<'q>(query: AnyQuery<'q>, params: &[Value]) -> AnyQuery<'q> {
    params.iter().fold(query, |query, value| bind_value(query, value))
}
