use crate::{
    compiler::{CompiledStatement, DialectContext, RowShape, filter::FilterPlacement},
    plan::JoinPlan,
    query::{
        ast::{
            expr::Expr,
            select::{JoinClause, OrderByExpr, Select},
        },
        builder::select::SelectBuilder,
        renderer::to_sql,
    },
    table_ref,
};
use tracing::debug;

/// The pieces of one `SELECT`, produced by the individual builders.
#[derive(Debug, Clone, Default)]
pub struct Fragments {
    pub projection: Vec<Expr>,
    pub joins: Vec<JoinClause>,
    pub filter: Option<FilterPlacement>,
    pub order_by: Vec<OrderByExpr>,
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
}

/// `SELECT <projection> FROM <root> <joins> [<filter>] [ORDER BY] [LIMIT/OFFSET]`.
/// A filter join is always the last join.
pub fn assemble(root: &str, fragments: Fragments) -> Select {
    let Fragments {
        projection,
        mut joins,
        filter,
        order_by,
        limit,
        offset,
    } = fragments;

    let mut where_clause = None;
    match filter {
        Some(FilterPlacement::Where(expr)) => where_clause = Some(expr),
        Some(FilterPlacement::Join(join)) => joins.push(join),
        None => {}
    }

    let mut builder = SelectBuilder::new()
        .select(projection)
        .from(table_ref!(root), None)
        .joins(joins)
        .order_by_all(order_by);
    if let Some(condition) = where_clause {
        builder = builder.where_clause(condition);
    }
    if let Some(limit) = limit {
        builder = builder.limit(limit);
    }
    if let Some(offset) = offset {
        builder = builder.offset(offset);
    }
    builder.build()
}

/// Renders the statement in one pass and attaches its row shape.
pub fn finish(
    select: &Select,
    shape: RowShape,
    plan: &JoinPlan,
    ctx: &DialectContext,
) -> CompiledStatement {
    let (sql, params) = to_sql(select, ctx.dialect);
    debug!(
        plan = %plan.hash(),
        dialect = %ctx.dialect.name(),
        params = params.len(),
        sql = %sql,
        "compiled statement"
    );
    CompiledStatement {
        sql,
        params,
        shape,
        entity: plan.table.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        query::{ast::common::OrderDir, dialect::Postgres, qualified},
        value,
    };
    use model::core::value::Value;

    #[test]
    fn where_params_precede_limit() {
        let select = assemble(
            "station",
            Fragments {
                projection: vec![qualified("station", "id")],
                filter: Some(FilterPlacement::Where(Expr::eq(
                    qualified("station", "code"),
                    value!(Value::String("X".into())),
                ))),
                order_by: vec![OrderByExpr {
                    expr: qualified("station", "id"),
                    direction: Some(OrderDir::Asc),
                }],
                limit: Some(value!(Value::Int(5))),
                offset: Some(value!(Value::Int(10))),
                ..Default::default()
            },
        );

        let (sql, params) = to_sql(&select, &Postgres);
        assert_eq!(
            sql,
            r#"SELECT "station"."id" FROM "station" WHERE ("station"."code" = $1) ORDER BY "station"."id" ASC LIMIT $2 OFFSET $3"#
        );
        assert_eq!(
            params,
            vec![Value::String("X".into()), Value::Int(5), Value::Int(10)]
        );
    }
}
