use crate::query::ast::expr::{BinaryOperator, Expr, Ident};

pub mod ast;
pub mod builder;
pub mod dialect;
pub mod macros;
pub mod renderer;

#[cfg(test)]
pub fn ident(name: &str) -> Expr {
    Expr::Identifier(Ident {
        qualifier: None,
        name: name.to_string(),
    })
}

pub fn qualified(qualifier: &str, name: &str) -> Expr {
    Expr::Identifier(Ident {
        qualifier: Some(qualifier.to_string()),
        name: name.to_string(),
    })
}

/// Folds predicates into a left-nested `AND` chain.
pub fn conjunction(exprs: impl IntoIterator<Item = Expr>) -> Option<Expr> {
    exprs
        .into_iter()
        .reduce(|acc, next| Expr::binary(acc, BinaryOperator::And, next))
}

/// `left.k = right.k` for every key, AND-ed together.
pub fn key_match(left: &str, right: &str, keys: &[&str]) -> Option<Expr> {
    conjunction(
        keys.iter()
            .map(|key| Expr::eq(qualified(left, key), qualified(right, key))),
    )
}
