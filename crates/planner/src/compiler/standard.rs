use crate::{
    compiler::{
        CompiledStatement, DialectContext, QueryCompiler,
        alias::AliasAllocator,
        assembler::{Fragments, assemble, finish},
        count::{count_shape, count_table},
        error::CompileError,
        filter::{FilterPlacement, place_filter, pushable_filter},
        joins::JoinChain,
        ordering::{build_group_order_by, build_standard_order_by},
        paging::{RowPaging, root_group_keys, root_group_paging_join, row_paging},
        projection::build_projection,
        validate::validate_standard,
    },
    config::PagingMode,
    filter::Filter,
    plan::JoinPlan,
};

/// Compiles single-table plans.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCompiler;

impl StandardCompiler {
    fn placement(
        &self,
        plan: &JoinPlan,
        ctx: &DialectContext,
        allocator: &mut AliasAllocator,
    ) -> Result<(Filter, Option<FilterPlacement>), CompileError> {
        validate_standard(plan, ctx)?;
        let filter = pushable_filter(plan, ctx)?;
        let placement = place_filter(plan, &filter, &JoinChain::default(), allocator, ctx)?;
        Ok((filter, placement))
    }
}

impl QueryCompiler for StandardCompiler {
    fn compile(&self, plan: &JoinPlan, ctx: &DialectContext) -> Result<CompiledStatement, CompileError> {
        let mut allocator = AliasAllocator::new(&plan.table);
        let (filter, placement) = self.placement(plan, ctx, &mut allocator)?;
        let projection = build_projection(plan, &JoinChain::default(), ctx)?;
        let primary_keys = projection.shape.primary_keys.clone();

        let mut order_by = build_standard_order_by(plan, &primary_keys);
        let mut paging = row_paging(plan);
        let mut joins = Vec::new();
        if ctx.paging == PagingMode::Groups {
            let keys = root_group_keys(plan, &primary_keys);
            if let Some(join) = root_group_paging_join(plan, &keys, &filter, &mut allocator, ctx)? {
                joins.push(join);
                paging = RowPaging::default();
                if order_by.is_empty() {
                    order_by = build_group_order_by(&plan.table, &keys);
                }
            }
        }

        let select = assemble(
            &plan.table,
            Fragments {
                projection: projection.columns,
                joins,
                filter: placement,
                order_by,
                limit: paging.limit,
                offset: paging.offset,
            },
        );
        Ok(finish(&select, projection.shape, plan, ctx))
    }

    fn compile_count(
        &self,
        plan: &JoinPlan,
        ctx: &DialectContext,
    ) -> Result<CompiledStatement, CompileError> {
        let mut allocator = AliasAllocator::new(&plan.table);
        let predicate = match self.placement(plan, ctx, &mut allocator)?.1 {
            Some(FilterPlacement::Where(expr)) => Some(expr),
            // Single-table plans never place the filter in a join.
            Some(FilterPlacement::Join(_)) | None => None,
        };
        let root = ctx.schema.table(&plan.table)?;
        let count = count_table(&plan.table, &root.primary_keys, predicate);
        Ok(finish(&count, count_shape(), plan, ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        compiler::{compiler_for, fixtures::Fixture},
        filter::Comparison,
        plan::{JoinStep, SortBy},
        query::dialect::DialectKind,
    };
    use model::core::value::Value;

    #[test]
    fn natural_order_resolves_to_primary_key() {
        let fx = Fixture::new();
        let plan = JoinPlan::builder("station")
            .attributes(&["name"])
            .sort_by(SortBy::Reverse)
            .offset(5)
            .build();

        let stmt = StandardCompiler.compile(&plan, &fx.ctx()).unwrap();
        assert_eq!(
            stmt.sql,
            r#"SELECT "station"."id", "station"."name" FROM "station" ORDER BY "station"."id" DESC OFFSET $1"#
        );
        assert_eq!(stmt.params, vec![Value::Int(5)]);
    }

    #[test]
    fn filter_becomes_where() {
        let fx = Fixture::new();
        let plan = JoinPlan::builder("tag")
            .filter(Filter::eq("label", Value::String("coastal".into())))
            .build();

        let stmt = StandardCompiler.compile(&plan, &fx.ctx()).unwrap();
        assert_eq!(
            stmt.sql,
            r#"SELECT "tag"."station_id", "tag"."label" FROM "tag" WHERE ("tag"."label" = $1)"#
        );

        let count = StandardCompiler.compile_count(&plan, &fx.ctx()).unwrap();
        assert_eq!(
            count.sql,
            r#"SELECT COUNT(*) AS "count" FROM "tag" WHERE ("tag"."label" = $1)"#
        );
    }

    #[test]
    fn group_paging_keeps_features_whole() {
        let fx = Fixture::new().groups();
        let plan = JoinPlan::builder("tag")
            .sort_by(SortBy::asc("station_id"))
            .filter(Filter::eq("label", Value::String("coastal".into())))
            .limit(1)
            .build();

        let stmt = StandardCompiler.compile(&plan, &fx.ctx()).unwrap();
        assert_eq!(
            stmt.sql,
            concat!(
                r#"SELECT "tag"."station_id", "tag"."label" FROM "tag" "#,
                r#"INNER JOIN (SELECT DISTINCT "tag"."station_id" FROM "tag" WHERE ("tag"."label" = $1) ORDER BY "tag"."station_id" ASC LIMIT $2) AS "tag_1" ON ("tag"."station_id" = "tag_1"."station_id") "#,
                r#"WHERE ("tag"."label" = $3) ORDER BY "tag"."station_id" ASC"#
            )
        );
        assert_eq!(
            stmt.params,
            vec![
                Value::String("coastal".into()),
                Value::Int(1),
                Value::String("coastal".into())
            ]
        );
    }

    #[test]
    fn group_paging_falls_back_to_primary_key_order() {
        let fx = Fixture::new().groups();
        let plan = JoinPlan::builder("station")
            .attributes(&["name"])
            .offset(2)
            .build();

        let stmt = StandardCompiler.compile(&plan, &fx.ctx()).unwrap();
        assert_eq!(
            stmt.sql,
            concat!(
                r#"SELECT "station"."id", "station"."name" FROM "station" "#,
                r#"INNER JOIN (SELECT DISTINCT "station"."id" FROM "station" ORDER BY "station"."id" ASC OFFSET $1) AS "station_1" ON ("station"."id" = "station_1"."id") "#,
                r#"ORDER BY "station"."id" ASC"#
            )
        );
    }

    #[test]
    fn empty_projection_is_rejected() {
        let fx = Fixture::new();
        let plan = JoinPlan::builder("tag").attributes(&[]).build();
        assert_eq!(
            StandardCompiler.compile(&plan, &fx.ctx()),
            Err(CompileError::EmptyProjection("tag".into()))
        );
    }

    #[test]
    fn typed_values_are_cast_in_the_statement() {
        let fx = Fixture::new();
        let taken = chrono::DateTime::parse_from_rfc3339("2024-03-01T00:00:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        let plan = JoinPlan::builder("measurement")
            .attributes(&["kind"])
            .filter(Filter::compare("taken_at", Comparison::Gt, Value::Timestamp(taken)))
            .build();

        let stmt = StandardCompiler.compile(&plan, &fx.ctx()).unwrap();
        assert_eq!(
            stmt.sql,
            r#"SELECT "measurement"."id", "measurement"."kind" FROM "measurement" WHERE ("measurement"."taken_at" > CAST($1 AS TIMESTAMPTZ))"#
        );
        assert_eq!(stmt.params, vec![Value::Timestamp(taken)]);

        let mysql = Fixture::new().dialect(DialectKind::MySql);
        let stmt = StandardCompiler.compile(&plan, &mysql.ctx()).unwrap();
        assert!(stmt.sql.ends_with("(`measurement`.`taken_at` > CAST(? AS DATETIME))"));
    }

    #[test]
    fn picks_compiler_by_join_steps() {
        let fx = Fixture::new();
        let single = JoinPlan::builder("station").sort_by(SortBy::Natural).build();
        assert!(compiler_for(&single).compile(&single, &fx.ctx()).is_ok());

        let joined = JoinPlan::builder("station")
            .join(JoinStep::new("measurement", "id", "station_id").sort_by(SortBy::asc("id")))
            .build();
        assert!(compiler_for(&joined).compile(&joined, &fx.ctx()).is_ok());
        assert_eq!(
            StandardCompiler.compile(&joined, &fx.ctx()),
            Err(CompileError::UnexpectedJoins("station".into()))
        );
    }
}
