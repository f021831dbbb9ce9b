use crate::{
    compiler::{
        DialectContext, FILTER_ALIAS, alias::AliasAllocator, error::CompileError, joins::JoinChain,
    },
    filter::{Filter, encoder::TableFields},
    plan::JoinPlan,
    query::{
        ast::{
            common::JoinKind,
            expr::Expr,
            select::{JoinClause, Select, TableFactor},
        },
        builder::select::{FromState, SelectBuilder},
        key_match, qualified,
    },
    table_ref,
};
use tracing::{debug, warn};

/// Where the encoded predicate ends up in the statement.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterPlacement {
    Where(Expr),
    /// `INNER JOIN (SELECT DISTINCT ...) AS alias ON ...`
    Join(JoinClause),
}

/// Splits the plan's filter and returns the part the database evaluates.
/// Anything left over is rejected rather than silently dropped.
pub fn pushable_filter(plan: &JoinPlan, ctx: &DialectContext) -> Result<Filter, CompileError> {
    let Some(filter) = &plan.filter else {
        return Ok(Filter::Include);
    };

    let split = ctx.splitter.split(filter);
    if !split.is_fully_pushable() {
        warn!(table = %plan.table, residual = %split.residual, "rejecting filter the database cannot evaluate");
        return Err(CompileError::UnpushableFilter(split.residual.to_string()));
    }
    Ok(split.pushable)
}

/// `SELECT DISTINCT target.k... FROM target [WHERE predicate]`, the id set
/// shared by the filter join and group paging.
pub(crate) fn distinct_keys(
    target: &str,
    keys: &[&str],
    predicate: Option<Expr>,
) -> SelectBuilder<FromState> {
    let builder = SelectBuilder::new()
        .select(keys.iter().map(|k| qualified(target, k)).collect())
        .distinct()
        .from(table_ref!(target), None);
    match predicate {
        Some(predicate) => builder.where_clause(predicate),
        None => builder,
    }
}

pub(crate) fn join_on_keys(
    subquery: Select,
    alias: String,
    reference: &str,
    keys: &[&str],
) -> Option<JoinClause> {
    key_match(reference, &alias, keys).map(|on| JoinClause {
        kind: JoinKind::Inner,
        source: TableFactor::Derived(Box::new(subquery)),
        alias: Some(alias),
        on,
    })
}

/// Places an already-split filter.
///
/// With join steps, the predicate is evaluated inside a distinct-keys
/// subquery over the last step's table and joined back on its sort keys, so
/// every row of a matching group survives even when only one of them
/// satisfies the predicate. Without steps, for subset queries, or when the
/// target has no sort keys, it becomes a plain `WHERE`.
pub fn place_filter(
    plan: &JoinPlan,
    filter: &Filter,
    chain: &JoinChain,
    allocator: &mut AliasAllocator,
    ctx: &DialectContext,
) -> Result<Option<FilterPlacement>, CompileError> {
    if filter.is_include() {
        return Ok(None);
    }

    let target = plan.target_table();
    let reference = chain.target_reference(plan);
    let keys: Vec<&str> = plan
        .target_sort_keys()
        .into_iter()
        .map(|(name, _)| name)
        .collect();

    if !plan.has_joins() || plan.subset || keys.is_empty() {
        let predicate = ctx.encoder.encode(filter, &TableFields::new(reference))?;
        debug!(table = target, reference, "filter applied as WHERE");
        return Ok(predicate.map(FilterPlacement::Where));
    }

    let Some(predicate) = ctx.encoder.encode(filter, &TableFields::new(target))? else {
        return Ok(None);
    };

    let subquery = distinct_keys(target, &keys, Some(predicate)).build();
    let alias = allocator.reserve(FILTER_ALIAS);
    debug!(table = target, reference, alias = %alias, "filter applied through distinct-keys join");

    Ok(join_on_keys(subquery, alias, reference, &keys).map(FilterPlacement::Join))
}
