use crate::{
    compiler::{DialectContext, error::CompileError},
    plan::{JoinPlan, SortBy, sort_properties},
    schema::TableSchema,
};
use std::collections::HashSet;

fn check_sort_list(table: &TableSchema, sort_by: &[SortBy]) -> Result<(), CompileError> {
    let mut seen = HashSet::new();
    for (name, _) in sort_properties(sort_by) {
        table.require_column(name)?;
        if !seen.insert(name) {
            return Err(CompileError::DuplicateSortKey {
                table: table.name.clone(),
                column: name.to_string(),
            });
        }
    }
    Ok(())
}

fn reject_natural(table: &str, sort_by: &[SortBy]) -> Result<(), CompileError> {
    if sort_by.iter().any(|s| s.property().is_none()) {
        return Err(CompileError::NaturalOrder(table.to_string()));
    }
    Ok(())
}

fn require_join_column(table: &TableSchema, column: &str) -> Result<(), CompileError> {
    match table.find_column(column) {
        Some(_) => Ok(()),
        None => Err(CompileError::UnknownJoinColumn {
            table: table.name.clone(),
            column: column.to_string(),
        }),
    }
}

/// Checks a plan with join steps before any SQL is produced.
pub fn validate_joining(plan: &JoinPlan, ctx: &DialectContext) -> Result<(), CompileError> {
    let root = ctx.schema.table(&plan.table)?;
    reject_natural(&plan.table, &plan.sort_by)?;
    check_sort_list(root, &plan.sort_by)?;

    let mut parent = root;
    for (i, step) in plan.joins.iter().enumerate() {
        if step.filter.is_some() {
            return Err(CompileError::PerStepFilter {
                step: i,
                table: step.table.clone(),
            });
        }

        let child = ctx.schema.table(&step.table)?;
        reject_natural(&step.table, &step.sort_by)?;
        if step.sort_by.is_empty() {
            return Err(CompileError::MissingSortKeys {
                step: i,
                table: step.table.clone(),
            });
        }
        check_sort_list(child, &step.sort_by)?;

        require_join_column(parent, &step.foreign_key)?;
        require_join_column(child, &step.joining_key)?;
        parent = child;
    }

    Ok(())
}

/// Checks a single-table plan. Natural and reverse ordering are allowed here.
pub fn validate_standard(plan: &JoinPlan, ctx: &DialectContext) -> Result<(), CompileError> {
    if plan.has_joins() {
        return Err(CompileError::UnexpectedJoins(plan.table.clone()));
    }
    let root = ctx.schema.table(&plan.table)?;
    check_sort_list(root, &plan.sort_by)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        compiler::fixtures::Fixture,
        filter::Filter,
        plan::{JoinStep, SortBy},
        schema::SchemaError,
    };
    use model::core::value::Value;

    fn step() -> JoinStep {
        JoinStep::new("measurement", "id", "station_id").sort_by(SortBy::asc("id"))
    }

    #[test]
    fn accepts_well_formed_plan() {
        let fx = Fixture::new();
        let plan = JoinPlan::builder("station")
            .sort_by(SortBy::asc("id"))
            .join(step())
            .build();
        assert_eq!(validate_joining(&plan, &fx.ctx()), Ok(()));
    }

    #[test]
    fn rejects_natural_order() {
        let fx = Fixture::new();
        let plan = JoinPlan::builder("station")
            .sort_by(SortBy::Natural)
            .join(step())
            .build();
        assert_eq!(
            validate_joining(&plan, &fx.ctx()),
            Err(CompileError::NaturalOrder("station".into()))
        );
    }

    #[test]
    fn rejects_step_without_sort_keys() {
        let fx = Fixture::new();
        let plan = JoinPlan::builder("station")
            .join(JoinStep::new("measurement", "id", "station_id"))
            .build();
        assert_eq!(
            validate_joining(&plan, &fx.ctx()),
            Err(CompileError::MissingSortKeys {
                step: 0,
                table: "measurement".into()
            })
        );
    }

    #[test]
    fn rejects_duplicate_sort_keys() {
        let fx = Fixture::new();
        let plan = JoinPlan::builder("station")
            .join(step().sort_by(SortBy::desc("id")))
            .build();
        assert!(matches!(
            validate_joining(&plan, &fx.ctx()),
            Err(CompileError::DuplicateSortKey { column, .. }) if column == "id"
        ));
    }

    #[test]
    fn rejects_unknown_join_columns() {
        let fx = Fixture::new();
        let plan = JoinPlan::builder("station")
            .join(JoinStep::new("measurement", "station_code", "station_id").sort_by(SortBy::asc("id")))
            .build();
        assert_eq!(
            validate_joining(&plan, &fx.ctx()),
            Err(CompileError::UnknownJoinColumn {
                table: "station".into(),
                column: "station_code".into()
            })
        );
    }

    #[test]
    fn rejects_per_step_filter_and_unknown_tables() {
        let fx = Fixture::new();
        let mut filtered = step();
        filtered.filter = Some(Filter::eq("value", Value::Int(1)));
        let plan = JoinPlan::builder("station").join(filtered).build();
        assert!(matches!(
            validate_joining(&plan, &fx.ctx()),
            Err(CompileError::PerStepFilter { step: 0, .. })
        ));

        let plan = JoinPlan::builder("nowhere").join(step()).build();
        assert_eq!(
            validate_joining(&plan, &fx.ctx()),
            Err(CompileError::Schema(SchemaError::UnknownTable("nowhere".into())))
        );
    }
}
