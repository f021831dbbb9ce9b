//! Compiles a [`JoinPlan`] into a single `SELECT` whose rows arrive grouped
//! by parent and ordered for streaming reconstruction.
//!
//! The pipeline is split into small builders that each return AST fragments
//! (`alias` → `joins` → `projection` → `paging` → `filter` → `ordering`),
//! which `assembler` puts together and renders exactly once.

use crate::{
    config::PagingMode,
    filter::{encoder::FilterEncoder, splitter::FilterSplitter},
    plan::JoinPlan,
    query::dialect::Dialect,
    schema::SchemaProvider,
};
use error::CompileError;
use model::core::value::Value;

pub mod alias;
pub mod assembler;
pub mod count;
pub mod error;
pub mod filter;
pub mod joining;
pub mod joins;
pub mod ordering;
pub mod paging;
pub mod projection;
pub mod standard;
pub mod validate;

#[cfg(test)]
pub(crate) mod fixtures;

pub use joining::JoiningCompiler;
pub use standard::StandardCompiler;

pub const FOREIGN_ID: &str = "FOREIGN_ID";
pub const PARENT_TABLE_PKEY: &str = "PARENT_TABLE_PKEY";
pub const FILTER_ALIAS: &str = "temp_alias_used_for_filter";
pub const COUNT_TABLE: &str = "COUNT_TABLE";
pub const DISTINCT_TABLE: &str = "DISTINCT_TABLE";

/// Collaborators shared by every builder of one compilation.
#[derive(Clone, Copy)]
pub struct DialectContext<'a> {
    pub dialect: &'a dyn Dialect,
    pub schema: &'a dyn SchemaProvider,
    pub encoder: &'a dyn FilterEncoder,
    pub splitter: &'a dyn FilterSplitter,
    pub paging: PagingMode,
}

/// A synthetic ordering column projected for one step sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignIdColumn {
    pub step: usize,
    pub key: String,
    pub name: String,
}

/// Column layout of the rows a statement returns, in projection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowShape {
    pub primary_keys: Vec<String>,
    pub attributes: Vec<String>,
    pub foreign_ids: Vec<ForeignIdColumn>,
    pub parent_keys: Vec<String>,
}

impl RowShape {
    pub fn column_names(&self) -> Vec<&str> {
        self.primary_keys
            .iter()
            .chain(&self.attributes)
            .map(String::as_str)
            .chain(self.foreign_ids.iter().map(|f| f.name.as_str()))
            .chain(self.parent_keys.iter().map(String::as_str))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.primary_keys.len()
            + self.attributes.len()
            + self.foreign_ids.len()
            + self.parent_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn foreign_ids_for(&self, step: usize) -> impl Iterator<Item = &ForeignIdColumn> {
        self.foreign_ids.iter().filter(move |f| f.step == step)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
    pub sql: String,
    /// Bound positionally; `params[i]` belongs to the i-th placeholder.
    pub params: Vec<Value>,
    pub shape: RowShape,
    /// Table the rows describe.
    pub entity: String,
}

pub trait QueryCompiler: Send + Sync {
    fn compile(&self, plan: &JoinPlan, ctx: &DialectContext) -> Result<CompiledStatement, CompileError>;

    /// Statement returning a single `count` column with the number of
    /// distinct root features the plan matches.
    fn compile_count(
        &self,
        plan: &JoinPlan,
        ctx: &DialectContext,
    ) -> Result<CompiledStatement, CompileError>;
}

pub fn compiler_for(plan: &JoinPlan) -> &'static dyn QueryCompiler {
    if plan.has_joins() {
        &JoiningCompiler
    } else {
        &StandardCompiler
    }
}

pub fn compile(plan: &JoinPlan, ctx: &DialectContext) -> Result<CompiledStatement, CompileError> {
    compiler_for(plan).compile(plan, ctx)
}

pub fn compile_count(
    plan: &JoinPlan,
    ctx: &DialectContext,
) -> Result<CompiledStatement, CompileError> {
    compiler_for(plan).compile_count(plan, ctx)
}
