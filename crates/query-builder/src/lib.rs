use crate::ast::expr::{Expr, Ident};
use model::core::value::Scalar;

pub mod ast;
pub mod builder;
pub mod dialect;
pub mod error;
pub mod macros;
pub mod renderer;
pub mod sql;

pub use builder::{Comparison, QueryBuilder};
pub use sql::SqlQueryBuilder;

/// Column reference; a dotted name such as `users.id` becomes a qualified
/// identifier.
pub fn ident(name: &str) -> Expr {
    Expr::Identifier(Ident::parse(name))
}

pub fn value(val: Scalar) -> Expr {
    Expr::Value(val)
}
