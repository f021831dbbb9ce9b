use crate::{
    compiler::{COUNT_TABLE, DISTINCT_TABLE, RowShape},
    query::{
        ast::{
            expr::{Expr, FunctionCall},
            select::Select,
        },
        builder::select::SelectBuilder,
        qualified,
    },
    table_ref,
};

pub const COUNT_COLUMN: &str = "count";

pub fn count_shape() -> RowShape {
    RowShape {
        attributes: vec![COUNT_COLUMN.to_string()],
        ..Default::default()
    }
}

fn count_star() -> Expr {
    Expr::FunctionCall(FunctionCall {
        name: "COUNT".into(),
        args: vec![],
        wildcard: true,
    })
    .alias(COUNT_COLUMN)
}

/// Counts distinct root features of a joined select:
/// `SELECT COUNT(*) FROM (SELECT DISTINCT COUNT_TABLE.pk... FROM (<inner>) COUNT_TABLE) DISTINCT_TABLE`.
/// Without a primary key every joined row is counted.
pub fn count_joined(inner: Select, primary_keys: &[String]) -> Select {
    if primary_keys.is_empty() {
        return SelectBuilder::new()
            .select(vec![count_star()])
            .from_subquery(inner, COUNT_TABLE)
            .build();
    }

    let distinct = SelectBuilder::new()
        .select(
            primary_keys
                .iter()
                .map(|pk| qualified(COUNT_TABLE, pk))
                .collect(),
        )
        .distinct()
        .from_subquery(inner, COUNT_TABLE)
        .build();

    SelectBuilder::new()
        .select(vec![count_star()])
        .from_subquery(distinct, DISTINCT_TABLE)
        .build()
}

/// Counts rows of a single table, de-duplicated on the primary key when
/// there is one.
pub fn count_table(table: &str, primary_keys: &[String], predicate: Option<Expr>) -> Select {
    if primary_keys.is_empty() {
        let builder = SelectBuilder::new()
            .select(vec![count_star()])
            .from(table_ref!(table), None);
        return match predicate {
            Some(p) => builder.where_clause(p).build(),
            None => builder.build(),
        };
    }

    let mut distinct = SelectBuilder::new()
        .select(primary_keys.iter().map(|pk| qualified(table, pk)).collect())
        .distinct()
        .from(table_ref!(table), None);
    if let Some(p) = predicate {
        distinct = distinct.where_clause(p);
    }

    SelectBuilder::new()
        .select(vec![count_star()])
        .from_subquery(distinct.build(), DISTINCT_TABLE)
        .build()
}
