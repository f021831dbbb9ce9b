//! Backend-neutral predicate tree over feature properties.
//!
//! A [`Filter`] names properties (columns) of one table. The [`encoder`]
//! turns it into a SQL expression against a chosen table reference, and the
//! [`splitter`] separates the part a backend can evaluate from the part it
//! cannot.

use model::core::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod encoder;
pub mod splitter;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    /// Matches everything.
    Include,
    /// Matches nothing.
    Exclude,
    Compare {
        property: String,
        op: Comparison,
        value: Value,
    },
    Between {
        property: String,
        low: Value,
        high: Value,
    },
    Like {
        property: String,
        pattern: String,
    },
    In {
        property: String,
        values: Vec<Value>,
    },
    IsNull {
        property: String,
    },
    /// A boolean backend function applied to a property, e.g.
    /// `ST_Intersects(geom, ?)`.
    Function {
        name: String,
        property: String,
        #[serde(default)]
        args: Vec<Value>,
    },
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl Comparison {
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::NotEq => "<>",
            Comparison::Lt => "<",
            Comparison::LtEq => "<=",
            Comparison::Gt => ">",
            Comparison::GtEq => ">=",
        }
    }
}

impl Filter {
    pub fn compare(property: &str, op: Comparison, value: Value) -> Self {
        Filter::Compare {
            property: property.to_string(),
            op,
            value,
        }
    }

    pub fn eq(property: &str, value: Value) -> Self {
        Self::compare(property, Comparison::Eq, value)
    }

    /// Conjunction that drops `Include` children and collapses trivial cases.
    pub fn and(children: Vec<Filter>) -> Self {
        let mut kept: Vec<Filter> = children
            .into_iter()
            .filter(|f| !f.is_include())
            .collect();
        match kept.len() {
            0 => Filter::Include,
            1 => kept.remove(0),
            _ => Filter::And(kept),
        }
    }

    pub fn or(children: Vec<Filter>) -> Self {
        Filter::Or(children)
    }

    pub fn negate(filter: Filter) -> Self {
        Filter::Not(Box::new(filter))
    }

    pub fn is_include(&self) -> bool {
        matches!(self, Filter::Include)
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, children: &[Filter], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, " {sep} ")?;
        }
        write!(f, "{child}")?;
    }
    write!(f, ")")
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Include => write!(f, "INCLUDE"),
            Filter::Exclude => write!(f, "EXCLUDE"),
            Filter::Compare {
                property,
                op,
                value,
            } => write!(f, "{property} {} {value}", op.symbol()),
            Filter::Between {
                property,
                low,
                high,
            } => write!(f, "{property} BETWEEN {low} AND {high}"),
            Filter::Like { property, pattern } => {
                write!(f, "{property} LIKE {}", Value::String(pattern.clone()))
            }
            Filter::In { property, values } => {
                let list: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{property} IN ({})", list.join(", "))
            }
            Filter::IsNull { property } => write!(f, "{property} IS NULL"),
            Filter::Function {
                name,
                property,
                args,
            } => {
                write!(f, "{name}({property}")?;
                for arg in args {
                    write!(f, ", {arg}")?;
                }
                write!(f, ")")
            }
            Filter::And(children) => write_joined(f, children, "AND"),
            Filter::Or(children) => write_joined(f, children, "OR"),
            Filter::Not(inner) => write!(f, "NOT ({inner})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_collapses_include() {
        assert_eq!(Filter::and(vec![Filter::Include]), Filter::Include);
        let eq = Filter::eq("name", Value::String("x".into()));
        assert_eq!(Filter::and(vec![Filter::Include, eq.clone()]), eq);
    }

    #[test]
    fn deserializes_from_json() {
        let filter: Filter = serde_json::from_str(
            r#"{"and": [
                {"compare": {"property": "elevation", "op": "gt", "value": {"Int": 100}}},
                {"like": {"property": "name", "pattern": "Bris%"}}
            ]}"#,
        )
        .unwrap();

        assert_eq!(
            filter.to_string(),
            "(elevation > 100 AND name LIKE 'Bris%')"
        );
    }
}
