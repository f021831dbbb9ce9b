use crate::{
    compiler::alias::{AliasAllocator, AliasAssignment},
    filter::encoder::{FieldEncoder, TableFields},
    plan::{JoinPlan, JoinStep},
    query::{
        ast::{
            common::JoinKind,
            expr::Expr,
            select::{JoinClause, TableFactor},
        },
        key_match,
    },
    table_ref,
};
use tracing::debug;

/// The `INNER JOIN` chain of a joining query and the names it introduced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinChain {
    pub clauses: Vec<JoinClause>,
    pub aliases: AliasAssignment,
    /// Alias of the root self-join, present when the root has sort keys.
    pub sort_alias: Option<String>,
}

impl JoinChain {
    /// Name step `index` is referenced by in the statement.
    pub fn reference<'s>(&'s self, index: usize, step: &'s JoinStep) -> &'s str {
        self.aliases.get(index).unwrap_or(step.table.as_str())
    }

    /// Reference of the last step, or the root table without steps.
    pub fn target_reference<'s>(&'s self, plan: &'s JoinPlan) -> &'s str {
        match plan.joins.last() {
            Some(step) => self.reference(plan.joins.len() - 1, step),
            None => plan.table.as_str(),
        }
    }
}

/// Builds the join chain. Expects a plan that passed `validate_joining`.
pub fn build_join_chain(plan: &JoinPlan, allocator: &mut AliasAllocator) -> JoinChain {
    let mut chain = JoinChain::default();
    let mut current = plan.table.clone();

    let root_keys: Vec<&str> = plan.sort_keys().into_iter().map(|(name, _)| name).collect();
    if !root_keys.is_empty() {
        let alias = allocator.reserve(&plan.table);
        if let Some(on) = key_match(&plan.table, &alias, &root_keys) {
            chain.clauses.push(JoinClause {
                kind: JoinKind::Inner,
                source: TableFactor::Table(table_ref!(plan.table)),
                alias: Some(alias.clone()),
                on,
            });
            current = alias.clone();
            chain.sort_alias = Some(alias);
        }
    }

    for (i, step) in plan.joins.iter().enumerate() {
        let alias = allocator.allocate(&step.table);
        let reference = alias.clone().unwrap_or_else(|| step.table.clone());

        let child = TableFields::new(&reference);
        let parent = TableFields::new(&current);
        let on = Expr::eq(
            child.encode(&step.joining_key),
            parent.encode(&step.foreign_key),
        );

        debug!(step = i, table = %step.table, reference = %reference, parent = %current, "join step");

        chain.clauses.push(JoinClause {
            kind: JoinKind::Inner,
            source: TableFactor::Table(table_ref!(step.table)),
            alias: alias.clone(),
            on,
        });
        chain.aliases.push(alias);
        current = reference;
    }

    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        plan::SortBy,
        query::{dialect::Postgres, renderer::to_sql},
    };

    fn render(chain: &JoinChain) -> Vec<String> {
        chain
            .clauses
            .iter()
            .map(|c| to_sql(c, &Postgres).0)
            .collect()
    }

    #[test]
    fn chains_steps_from_parent_to_child() {
        let plan = JoinPlan::builder("station")
            .join(JoinStep::new("measurement", "id", "station_id").sort_by(SortBy::asc("id")))
            .join(JoinStep::new("reading", "id", "measurement_id").sort_by(SortBy::asc("seq")))
            .build();

        let chain = build_join_chain(&plan, &mut AliasAllocator::new(&plan.table));
        assert_eq!(
            render(&chain),
            vec![
                r#"INNER JOIN "measurement" ON ("measurement"."station_id" = "station"."id")"#,
                r#"INNER JOIN "reading" ON ("reading"."measurement_id" = "measurement"."id")"#,
            ]
        );
        assert_eq!(chain.sort_alias, None);
        assert_eq!(chain.target_reference(&plan), "reading");
    }

    #[test]
    fn root_sort_keys_add_self_join() {
        let plan = JoinPlan::builder("station")
            .sort_by(SortBy::asc("code"))
            .join(JoinStep::new("measurement", "id", "station_id").sort_by(SortBy::asc("id")))
            .build();

        let chain = build_join_chain(&plan, &mut AliasAllocator::new(&plan.table));
        assert_eq!(
            render(&chain),
            vec![
                r#"INNER JOIN "station" AS "station_1" ON ("station"."code" = "station_1"."code")"#,
                r#"INNER JOIN "measurement" ON ("measurement"."station_id" = "station_1"."id")"#,
            ]
        );
        assert_eq!(chain.sort_alias.as_deref(), Some("station_1"));
    }

    #[test]
    fn repeated_tables_are_aliased() {
        let plan = JoinPlan::builder("station")
            .join(JoinStep::new("station", "parent_id", "id").sort_by(SortBy::asc("id")))
            .join(JoinStep::new("station", "parent_id", "id").sort_by(SortBy::asc("id")))
            .build();

        let chain = build_join_chain(&plan, &mut AliasAllocator::new(&plan.table));
        assert_eq!(
            render(&chain),
            vec![
                r#"INNER JOIN "station" AS "station_1" ON ("station_1"."id" = "station"."parent_id")"#,
                r#"INNER JOIN "station" AS "station_2" ON ("station_2"."id" = "station_1"."parent_id")"#,
            ]
        );
        assert_eq!(chain.aliases.get(0), Some("station_1"));
        assert_eq!(chain.aliases.get(1), Some("station_2"));
    }
}
