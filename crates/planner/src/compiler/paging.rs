use crate::{
    compiler::{
        DialectContext,
        alias::AliasAllocator,
        error::CompileError,
        filter::{distinct_keys, join_on_keys},
        joins::JoinChain,
    },
    filter::{Filter, encoder::TableFields},
    plan::{JoinPlan, SortBy, SortOrder},
    query::{
        ast::{expr::Expr, select::JoinClause},
        qualified,
    },
    value,
};
use model::core::value::Value;
use tracing::debug;

fn bound(n: u64) -> Expr {
    value!(Value::Int(i64::try_from(n).unwrap_or(i64::MAX)))
}

/// Trailing `LIMIT` / `OFFSET` values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowPaging {
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
}

pub fn row_paging(plan: &JoinPlan) -> RowPaging {
    RowPaging {
        limit: plan.limit.map(bound),
        offset: plan.offset.map(bound),
    }
}

/// Pages over distinct groups of the last step's sort keys instead of rows.
///
/// Returns `None` when the plan asks for no paging.
pub fn group_paging_join(
    plan: &JoinPlan,
    filter: &Filter,
    chain: &JoinChain,
    allocator: &mut AliasAllocator,
    ctx: &DialectContext,
) -> Result<Option<JoinClause>, CompileError> {
    let keys = plan.target_sort_keys();
    let reference = chain.target_reference(plan);
    paging_join(plan, plan.target_table(), reference, &keys, filter, allocator, ctx)
}

/// Keys a single-table plan is paged on: its sort keys, or the primary key
/// in the direction natural/reverse ordering asks for.
pub fn root_group_keys<'a>(plan: &'a JoinPlan, primary_keys: &'a [String]) -> Vec<(&'a str, SortOrder)> {
    let sort_keys = plan.sort_keys();
    if !sort_keys.is_empty() {
        return sort_keys;
    }
    let order = if plan.sort_by.contains(&SortBy::Reverse) {
        SortOrder::Desc
    } else {
        SortOrder::Asc
    };
    primary_keys.iter().map(|pk| (pk.as_str(), order)).collect()
}

/// Pages a denormalized root table by whole features, so rows sharing the
/// group keys never land on different pages.
pub fn root_group_paging_join(
    plan: &JoinPlan,
    keys: &[(&str, SortOrder)],
    filter: &Filter,
    allocator: &mut AliasAllocator,
    ctx: &DialectContext,
) -> Result<Option<JoinClause>, CompileError> {
    paging_join(plan, &plan.table, &plan.table, keys, filter, allocator, ctx)
}

fn paging_join(
    plan: &JoinPlan,
    target: &str,
    reference: &str,
    sort_keys: &[(&str, SortOrder)],
    filter: &Filter,
    allocator: &mut AliasAllocator,
    ctx: &DialectContext,
) -> Result<Option<JoinClause>, CompileError> {
    if (plan.limit.is_none() && plan.offset.is_none()) || sort_keys.is_empty() {
        return Ok(None);
    }
    let keys: Vec<&str> = sort_keys.iter().map(|(name, _)| *name).collect();

    let predicate = ctx.encoder.encode(filter, &TableFields::new(target))?;
    let mut builder = distinct_keys(target, &keys, predicate);
    for (key, dir) in sort_keys {
        builder = builder.order_by(qualified(target, key), Some((*dir).into()));
    }
    if let Some(limit) = plan.limit {
        builder = builder.limit(bound(limit));
    }
    if let Some(offset) = plan.offset {
        builder = builder.offset(bound(offset));
    }

    let alias = allocator.reserve(target);
    debug!(table = target, alias = %alias, limit = ?plan.limit, offset = ?plan.offset, "paging by group");

    Ok(join_on_keys(builder.build(), alias, reference, &keys))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        compiler::{fixtures::Fixture, joins::build_join_chain},
        plan::{JoinStep, SortBy},
        query::{dialect::MySql, renderer::to_sql},
    };

    #[test]
    fn row_paging_binds_values() {
        let plan = JoinPlan::builder("station").limit(10).offset(20).build();
        let paging = row_paging(&plan);
        assert_eq!(paging.limit, Some(value!(Value::Int(10))));
        assert_eq!(paging.offset, Some(value!(Value::Int(20))));
        assert_eq!(row_paging(&JoinPlan::builder("station").build()), RowPaging::default());
    }

    #[test]
    fn groups_are_paged_in_a_subquery() {
        let fx = Fixture::new().groups();
        let plan = JoinPlan::builder("station")
            .join(JoinStep::new("measurement", "id", "station_id").sort_by(SortBy::desc("station_id")))
            .limit(2)
            .build();

        let mut allocator = AliasAllocator::new(&plan.table);
        let chain = build_join_chain(&plan, &mut allocator);
        let join = group_paging_join(&plan, &Filter::Include, &chain, &mut allocator, &fx.ctx())
            .unwrap()
            .unwrap();

        let (sql, params) = to_sql(&join, &MySql);
        assert_eq!(
            sql,
            "INNER JOIN (SELECT DISTINCT `measurement`.`station_id` FROM `measurement` ORDER BY `measurement`.`station_id` DESC LIMIT ?) AS `measurement_1` ON (`measurement`.`station_id` = `measurement_1`.`station_id`)"
        );
        assert_eq!(params, vec![Value::Int(2)]);
    }

    #[test]
    fn no_paging_no_join() {
        let fx = Fixture::new().groups();
        let plan = JoinPlan::builder("station")
            .join(JoinStep::new("measurement", "id", "station_id").sort_by(SortBy::asc("id")))
            .build();
        let mut allocator = AliasAllocator::new(&plan.table);
        let chain = build_join_chain(&plan, &mut allocator);
        assert_eq!(
            group_paging_join(&plan, &Filter::Include, &chain, &mut allocator, &fx.ctx()),
            Ok(None)
        );
    }

    #[test]
    fn root_groups_fall_back_to_primary_key() {
        let pks = vec!["id".to_string()];
        let reverse = JoinPlan::builder("station").sort_by(SortBy::Reverse).build();
        assert_eq!(root_group_keys(&reverse, &pks), vec![("id", SortOrder::Desc)]);

        let sorted = JoinPlan::builder("tag").sort_by(SortBy::asc("station_id")).build();
        assert_eq!(root_group_keys(&sorted, &[]), vec![("station_id", SortOrder::Asc)]);
        assert!(root_group_keys(&JoinPlan::builder("tag").build(), &[]).is_empty());
    }
}
