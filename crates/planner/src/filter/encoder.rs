use crate::{
    filter::{Comparison, Filter},
    query::{
        ast::expr::{BinaryOperator, Expr, FunctionCall},
        dialect::Dialect,
        qualified,
        renderer::to_sql,
    },
    value,
};
use model::core::{data_type::DataType, value::Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EncodeError {
    #[error("IN list for property '{0}' is empty")]
    EmptyInList(String),

    #[error("Invalid function name in filter: '{0}'")]
    InvalidFunctionName(String),
}

/// Resolves a filter property to the column expression it is compared on.
pub trait FieldEncoder {
    fn encode(&self, property: &str) -> Expr;
}

/// Prefixes every property with a table reference (`"t"."col"`).
#[derive(Debug, Clone)]
pub struct TableFields<'a> {
    reference: &'a str,
}

impl<'a> TableFields<'a> {
    pub fn new(reference: &'a str) -> Self {
        Self { reference }
    }
}

impl FieldEncoder for TableFields<'_> {
    fn encode(&self, property: &str) -> Expr {
        qualified(self.reference, property)
    }
}

/// Converts a [`Filter`] into a SQL boolean expression.
///
/// `Ok(None)` means the filter matches everything and no predicate is needed.
pub trait FilterEncoder: Send + Sync {
    fn encode(&self, filter: &Filter, fields: &dyn FieldEncoder) -> Result<Option<Expr>, EncodeError>;
}

#[derive(Debug, Clone, Default)]
pub struct SqlFilterEncoder;

const ALWAYS_FALSE: &str = "1 = 0";

fn always_false() -> Expr {
    Expr::Literal(ALWAYS_FALSE.into())
}

fn is_function_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Binds a filter value. Values the drivers carry as text are cast back to
/// their column type so typed comparisons hold.
fn param(value: &Value) -> Expr {
    let data_type = match value {
        Value::Date(_) => DataType::Date,
        Value::Timestamp(_) => DataType::Timestamp,
        Value::Uuid(_) => DataType::Uuid,
        Value::Json(_) => DataType::Json,
        other => return value!(other.clone()),
    };
    Expr::Cast {
        expr: Box::new(value!(value.clone())),
        data_type,
    }
}

fn comparison_operator(op: Comparison) -> BinaryOperator {
    match op {
        Comparison::Eq => BinaryOperator::Eq,
        Comparison::NotEq => BinaryOperator::NotEq,
        Comparison::Lt => BinaryOperator::Lt,
        Comparison::LtEq => BinaryOperator::LtEq,
        Comparison::Gt => BinaryOperator::Gt,
        Comparison::GtEq => BinaryOperator::GtEq,
    }
}

impl SqlFilterEncoder {
    fn fold(
        &self,
        children: &[Filter],
        op: BinaryOperator,
        fields: &dyn FieldEncoder,
    ) -> Result<Option<Expr>, EncodeError> {
        let mut parts = Vec::with_capacity(children.len());
        for child in children {
            match self.encode(child, fields)? {
                Some(expr) => parts.push(expr),
                // An always-true child decides an OR and is neutral in an AND.
                None if op == BinaryOperator::Or => return Ok(None),
                None => {}
            }
        }

        if parts.is_empty() {
            return Ok(match op {
                BinaryOperator::Or => Some(always_false()),
                _ => None,
            });
        }

        Ok(parts
            .into_iter()
            .reduce(|acc, next| Expr::binary(acc, op, next)))
    }
}

impl FilterEncoder for SqlFilterEncoder {
    fn encode(&self, filter: &Filter, fields: &dyn FieldEncoder) -> Result<Option<Expr>, EncodeError> {
        let expr = match filter {
            Filter::Include => return Ok(None),
            Filter::Exclude => always_false(),
            Filter::Compare {
                property,
                op,
                value,
            } => Expr::binary(
                fields.encode(property),
                comparison_operator(*op),
                param(value),
            ),
            Filter::Between {
                property,
                low,
                high,
            } => Expr::Between {
                expr: Box::new(fields.encode(property)),
                low: Box::new(param(low)),
                high: Box::new(param(high)),
            },
            Filter::Like { property, pattern } => Expr::binary(
                fields.encode(property),
                BinaryOperator::Like,
                value!(Value::String(pattern.clone())),
            ),
            Filter::In { property, values } => {
                if values.is_empty() {
                    return Err(EncodeError::EmptyInList(property.clone()));
                }
                Expr::InList {
                    expr: Box::new(fields.encode(property)),
                    list: values.iter().map(param).collect(),
                }
            }
            Filter::IsNull { property } => Expr::IsNull(Box::new(fields.encode(property))),
            Filter::Function {
                name,
                property,
                args,
            } => {
                if !is_function_name(name) {
                    return Err(EncodeError::InvalidFunctionName(name.clone()));
                }
                let mut call_args = vec![fields.encode(property)];
                call_args.extend(args.iter().map(param));
                Expr::FunctionCall(FunctionCall {
                    name: name.clone(),
                    args: call_args,
                    wildcard: false,
                })
            }
            Filter::And(children) => return self.fold(children, BinaryOperator::And, fields),
            Filter::Or(children) => return self.fold(children, BinaryOperator::Or, fields),
            Filter::Not(inner) => match self.encode(inner, fields)? {
                Some(expr) => Expr::Not(Box::new(expr)),
                None => always_false(),
            },
        };
        Ok(Some(expr))
    }
}

/// Encodes a filter straight to SQL text plus its bind parameters.
/// An always-true filter yields an empty string.
pub fn encode_to_sql(
    encoder: &dyn FilterEncoder,
    filter: &Filter,
    fields: &dyn FieldEncoder,
    dialect: &dyn Dialect,
) -> Result<(String, Vec<Value>), EncodeError> {
    Ok(match encoder.encode(filter, fields)? {
        Some(expr) => to_sql(&expr, dialect),
        None => (String::new(), Vec::new()),
    })
}
