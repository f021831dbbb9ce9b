use crate::query::{
    ast::{
        common::{JoinKind, OrderDir},
        select::{FromClause, JoinClause, OrderByExpr, Select, TableFactor},
    },
    renderer::{Render, Renderer},
};

impl Render for Select {
    fn render(&self, r: &mut Renderer) {
        // 1. SELECT clause
        r.sql.push_str("SELECT ");
        if self.distinct {
            r.sql.push_str("DISTINCT ");
        }
        r.push_list(&self.columns, ", ");

        // 2. FROM
        if let Some(from) = &self.from {
            r.sql.push(' ');
            from.render(r);
        }

        // 3. JOIN
        for join in &self.joins {
            r.sql.push(' ');
            join.render(r);
        }

        // 4. WHERE
        if let Some(where_clause) = &self.where_clause {
            r.sql.push_str(" WHERE ");
            where_clause.render(r);
        }

        // 5. ORDER BY
        if !self.order_by.is_empty() {
            r.sql.push_str(" ORDER BY ");
            r.push_list(&self.order_by, ", ");
        }

        // 6. LIMIT
        match (&self.limit, &self.offset) {
            (Some(limit), _) => {
                r.sql.push_str(" LIMIT ");
                limit.render(r);
            }
            (None, Some(_)) => {
                if let Some(unbounded) = r.dialect.unbounded_limit() {
                    r.sql.push_str(" LIMIT ");
                    r.sql.push_str(unbounded);
                }
            }
            (None, None) => {}
        }

        // 7. OFFSET
        if let Some(offset) = &self.offset {
            r.sql.push_str(" OFFSET ");
            offset.render(r);
        }
    }
}

impl Render for TableFactor {
    fn render(&self, r: &mut Renderer) {
        match self {
            TableFactor::Table(table) => {
                if let Some(schema) = &table.schema {
                    r.push_ident(schema);
                    r.sql.push('.');
                }
                r.push_ident(&table.name);
            }
            TableFactor::Derived(select) => {
                r.sql.push('(');
                select.render(r);
                r.sql.push(')');
            }
        }
    }
}

fn render_alias(alias: &Option<String>, r: &mut Renderer) {
    if let Some(alias) = alias {
        r.sql.push_str(" AS ");
        r.push_ident(alias);
    }
}

impl Render for FromClause {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("FROM ");
        self.source.render(r);
        render_alias(&self.alias, r);
    }
}

impl Render for JoinClause {
    fn render(&self, r: &mut Renderer) {
        let join_str = match self.kind {
            JoinKind::Inner => "INNER JOIN",
        };
        r.sql.push_str(join_str);
        r.sql.push(' ');
        self.source.render(r);
        render_alias(&self.alias, r);
        r.sql.push_str(" ON ");
        self.on.render(r);
    }
}

impl Render for OrderByExpr {
    fn render(&self, r: &mut Renderer) {
        self.expr.render(r);
        if let Some(dir) = &self.direction {
            let dir_str = match dir {
                OrderDir::Asc => "ASC",
                OrderDir::Desc => "DESC",
            };
            r.sql.push(' ');
            r.sql.push_str(dir_str);
        }
    }
}
