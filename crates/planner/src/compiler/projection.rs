use crate::{
    compiler::{
        DialectContext, FOREIGN_ID, ForeignIdColumn, PARENT_TABLE_PKEY, RowShape,
        error::CompileError, joins::JoinChain,
    },
    plan::JoinPlan,
    query::{ast::expr::Expr, qualified},
};
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub columns: Vec<Expr>,
    pub shape: RowShape,
}

/// Root primary key, then attributes, then one ordering column per step sort
/// key, then the optional parent-key columns.
pub fn build_projection(
    plan: &JoinPlan,
    chain: &JoinChain,
    ctx: &DialectContext,
) -> Result<Projection, CompileError> {
    let root = ctx.schema.table(&plan.table)?;
    let mut columns = Vec::new();
    let mut shape = RowShape::default();

    for pk in &root.primary_keys {
        columns.push(qualified(&plan.table, pk));
        shape.primary_keys.push(pk.clone());
    }

    let attributes: Vec<&str> = match &plan.attributes {
        Some(names) => names.iter().map(String::as_str).collect(),
        None => root.columns.iter().map(|c| c.name.as_str()).collect(),
    };

    let mut seen: HashSet<&str> = root.primary_keys.iter().map(String::as_str).collect();
    for name in attributes {
        if !seen.insert(name) {
            debug!(table = %plan.table, column = name, "skipping duplicate projected column");
            continue;
        }
        let column = root.require_column(name)?;
        let expr = qualified(&plan.table, name);
        if column.data_type.is_geometry() {
            columns.push(ctx.dialect.encode_geometry(expr).alias(name));
        } else {
            columns.push(expr);
        }
        shape.attributes.push(name.to_string());
    }

    for (i, step) in plan.joins.iter().enumerate() {
        let reference = chain.reference(i, step);
        for (j, (key, _)) in step.sort_keys().into_iter().enumerate() {
            let name = format!("{FOREIGN_ID}_{i}_{j}");
            columns.push(qualified(reference, key).alias(&name));
            shape.foreign_ids.push(ForeignIdColumn {
                step: i,
                key: key.to_string(),
                name,
            });
        }
    }

    if plan.expose_parent_key {
        for (i, pk) in root.primary_keys.iter().enumerate() {
            let name = format!("{PARENT_TABLE_PKEY}_{i}");
            columns.push(qualified(&plan.table, pk).alias(&name));
            shape.parent_keys.push(name);
        }
    }

    if columns.is_empty() {
        return Err(CompileError::EmptyProjection(plan.table.clone()));
    }

    Ok(Projection { columns, shape })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        compiler::{alias::AliasAllocator, fixtures::Fixture, joins::build_join_chain},
        plan::{JoinStep, SortBy},
        query::{dialect::Postgres, renderer::Renderer},
        schema::SchemaError,
    };

    fn render(columns: &[Expr]) -> String {
        let mut r = Renderer::new(&Postgres);
        r.push_list(columns, ", ");
        r.finish().0
    }

    fn project(plan: &JoinPlan) -> Result<Projection, CompileError> {
        let fx = Fixture::new();
        let chain = build_join_chain(plan, &mut AliasAllocator::new(&plan.table));
        build_projection(plan, &chain, &fx.ctx())
    }

    #[test]
    fn one_ordering_column_per_step_sort_key() {
        let plan = JoinPlan::builder("station")
            .attributes(&["name"])
            .join(JoinStep::new("measurement", "id", "station_id").sort_by(SortBy::asc("kind")))
            .join(
                JoinStep::new("reading", "id", "measurement_id")
                    .sort_by(SortBy::asc("seq"))
                    .sort_by(SortBy::desc("id")),
            )
            .build();

        let projection = project(&plan).unwrap();
        assert_eq!(projection.shape.foreign_ids.len(), 3);
        assert_eq!(
            render(&projection.columns),
            r#""station"."id", "station"."name", "measurement"."kind" AS "FOREIGN_ID_0_0", "reading"."seq" AS "FOREIGN_ID_1_0", "reading"."id" AS "FOREIGN_ID_1_1""#
        );
        assert_eq!(projection.shape.foreign_ids_for(1).count(), 2);
        assert_eq!(projection.shape.len(), projection.columns.len());
    }

    #[test]
    fn primary_key_attributes_are_not_repeated() {
        let plan = JoinPlan::builder("station")
            .attributes(&["id", "code", "code"])
            .expose_parent_key(true)
            .build();

        let projection = project(&plan).unwrap();
        assert_eq!(
            projection.shape.column_names(),
            vec!["id", "code", "PARENT_TABLE_PKEY_0"]
        );
    }

    #[test]
    fn geometry_goes_through_dialect() {
        let plan = JoinPlan::builder("station").attributes(&["location"]).build();
        let projection = project(&plan).unwrap();
        assert_eq!(
            render(&projection.columns),
            r#""station"."id", ST_AsBinary("station"."location") AS "location""#
        );
    }

    #[test]
    fn all_columns_without_attribute_list() {
        let plan = JoinPlan::builder("tag").build();
        let projection = project(&plan).unwrap();
        assert!(projection.shape.primary_keys.is_empty());
        assert_eq!(projection.shape.attributes, vec!["station_id", "label"]);
    }

    #[test]
    fn keyless_table_without_attributes_is_an_error() {
        let plan = JoinPlan::builder("tag").attributes(&[]).build();
        assert_eq!(
            project(&plan).unwrap_err(),
            CompileError::EmptyProjection("tag".into())
        );

        // The primary key alone still makes a valid projection.
        let keyed = JoinPlan::builder("station").attributes(&[]).build();
        assert_eq!(project(&keyed).unwrap().shape.column_names(), vec!["id"]);
    }

    #[test]
    fn unknown_attribute_is_an_error() {
        let plan = JoinPlan::builder("station").attributes(&["altitude"]).build();
        assert_eq!(
            project(&plan).unwrap_err(),
            CompileError::Schema(SchemaError::UnknownColumn {
                table: "station".into(),
                column: "altitude".into()
            })
        );
    }
}
