use crate::{
    compiler::joins::JoinChain,
    plan::{JoinPlan, SortBy, SortOrder},
    query::{
        ast::{
            common::OrderDir,
            expr::Ident,
            select::OrderByExpr,
        },
        qualified,
    },
};
use std::collections::HashSet;

impl From<SortOrder> for OrderDir {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => OrderDir::Asc,
            SortOrder::Desc => OrderDir::Desc,
        }
    }
}

/// `ORDER BY` items that never repeat a qualified column.
#[derive(Debug, Default)]
struct OrderItems {
    items: Vec<OrderByExpr>,
    seen: HashSet<Ident>,
}

impl OrderItems {
    fn push(&mut self, reference: &str, column: &str, order: SortOrder) {
        let ident = Ident {
            qualifier: Some(reference.to_string()),
            name: column.to_string(),
        };
        if self.seen.insert(ident) {
            self.items.push(OrderByExpr {
                expr: qualified(reference, column),
                direction: Some(order.into()),
            });
        }
    }

    fn into_vec(self) -> Vec<OrderByExpr> {
        self.items
    }
}

/// Deepest step first, then the root sort keys, then the root primary key
/// as a tie-breaker.
pub fn build_order_by(plan: &JoinPlan, chain: &JoinChain, primary_keys: &[String]) -> Vec<OrderByExpr> {
    let mut order = OrderItems::default();

    for (i, step) in plan.joins.iter().enumerate().rev() {
        let reference = chain.reference(i, step);
        for (key, dir) in step.sort_keys() {
            order.push(reference, key, dir);
        }
    }

    for (key, dir) in plan.sort_keys() {
        order.push(&plan.table, key, dir);
    }

    for pk in primary_keys {
        order.push(&plan.table, pk, SortOrder::Asc);
    }

    order.into_vec()
}

/// Ordering of a single-table query; natural and reverse resolve to the
/// primary key.
pub fn build_standard_order_by(plan: &JoinPlan, primary_keys: &[String]) -> Vec<OrderByExpr> {
    let mut order = OrderItems::default();

    for sort in &plan.sort_by {
        match sort {
            SortBy::Property { name, order: dir } => order.push(&plan.table, name, *dir),
            SortBy::Natural => primary_keys
                .iter()
                .for_each(|pk| order.push(&plan.table, pk, SortOrder::Asc)),
            SortBy::Reverse => primary_keys
                .iter()
                .for_each(|pk| order.push(&plan.table, pk, SortOrder::Desc)),
        }
    }

    order.into_vec()
}

/// Orders a group-paged single-table query on its group keys, so the rows of
/// one feature stay together.
pub fn build_group_order_by(table: &str, keys: &[(&str, SortOrder)]) -> Vec<OrderByExpr> {
    let mut order = OrderItems::default();
    for (key, dir) in keys {
        order.push(table, key, *dir);
    }
    order.into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        compiler::{alias::AliasAllocator, joins::build_join_chain},
        plan::JoinStep,
        query::{dialect::Postgres, renderer::Renderer},
    };

    fn render(items: &[OrderByExpr]) -> String {
        let mut r = Renderer::new(&Postgres);
        r.push_list(items, ", ");
        r.finish().0
    }

    fn order_for(plan: &JoinPlan) -> String {
        let chain = build_join_chain(plan, &mut AliasAllocator::new(&plan.table));
        render(&build_order_by(plan, &chain, &["id".to_string()]))
    }

    #[test]
    fn deepest_step_first_then_root() {
        let plan = JoinPlan::builder("station")
            .sort_by(SortBy::asc("code"))
            .join(JoinStep::new("measurement", "id", "station_id").sort_by(SortBy::asc("kind")))
            .join(JoinStep::new("reading", "id", "measurement_id").sort_by(SortBy::desc("seq")))
            .build();

        assert_eq!(
            order_for(&plan),
            r#""reading"."seq" DESC, "measurement"."kind" ASC, "station"."code" ASC, "station"."id" ASC"#
        );
    }

    #[test]
    fn never_repeats_a_column() {
        let plan = JoinPlan::builder("station")
            .sort_by(SortBy::desc("id"))
            .join(JoinStep::new("measurement", "id", "station_id").sort_by(SortBy::asc("id")))
            .build();

        assert_eq!(
            order_for(&plan),
            r#""measurement"."id" ASC, "station"."id" DESC"#
        );
    }

    #[test]
    fn aliased_steps_are_ordered_by_alias() {
        let plan = JoinPlan::builder("station")
            .join(JoinStep::new("station", "parent_id", "id").sort_by(SortBy::asc("name")))
            .build();

        assert_eq!(
            order_for(&plan),
            r#""station_1"."name" ASC, "station"."id" ASC"#
        );
    }

    #[test]
    fn natural_order_resolves_to_primary_key() {
        let pk = ["id".to_string()];
        let reverse = JoinPlan::builder("station").sort_by(SortBy::Reverse).build();
        assert_eq!(
            render(&build_standard_order_by(&reverse, &pk)),
            r#""station"."id" DESC"#
        );

        let natural = JoinPlan::builder("station")
            .sort_by(SortBy::asc("name"))
            .sort_by(SortBy::Natural)
            .build();
        assert_eq!(build_standard_order_by(&natural, &pk).len(), 2);
    }
}
