//! Defines the AST for SQL expressions.

use model::core::value::Scalar;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A column or table identifier, e.g., `users` or `users.id`.
    Identifier(Ident),

    /// A bound value, rendered as a placeholder.
    Value(Scalar),

    /// `*` in a select list.
    Wildcard,

    /// A parenthesized list of expressions, e.g. `($1, $2)`.
    Tuple(Vec<Expr>),

    /// A binary operation, e.g., `column = 'value'` or `a AND b`.
    BinaryOp(Box<BinaryOp>),

    /// `expr IN (list)`. An empty list matches nothing.
    InList { expr: Box<Expr>, list: Vec<Expr> },

    /// `expr BETWEEN low AND high`, bounds inclusive.
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
    },

    /// `expr IS NULL`, or `expr IS NOT NULL` when `negated`.
    IsNull { expr: Box<Expr>, negated: bool },
}

impl Expr {
    pub fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
        Expr::BinaryOp(Box::new(BinaryOp { left, op, right }))
    }

    pub fn and(self, other: Expr) -> Expr {
        Expr::binary(self, BinaryOperator::And, other)
    }

    pub fn or(self, other: Expr) -> Expr {
        Expr::binary(self, BinaryOperator::Or, other)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub qualifier: Option<String>, // e.g., the 'users' in 'users.id'
    pub name: String,              // e.g., the 'id' in 'users.id'
}

impl Ident {
    /// Splits on the last `.`, so `users.id` yields qualifier `users`.
    pub fn parse(name: &str) -> Self {
        match name.rsplit_once('.') {
            Some((qualifier, column)) if !qualifier.is_empty() && !column.is_empty() => Ident {
                qualifier: Some(qualifier.to_string()),
                name: column.to_string(),
            },
            _ => Ident {
                qualifier: None,
                name: name.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp {
    pub left: Expr,
    pub op: BinaryOperator,
    pub right: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Comparison
    Eq,    // =
    NotEq, // <>
    Lt,    // <
    LtEq,  // <=
    Gt,    // >
    GtEq,  // >=

    // Pattern matching
    Like,
    NotLike,

    // Logical
    And,
    Or,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ident_parse() {
        assert_eq!(
            Ident::parse("users.id"),
            Ident {
                qualifier: Some("users".into()),
                name: "id".into()
            }
        );
        assert_eq!(Ident::parse("id").qualifier, None);
        assert_eq!(Ident::parse("trailing.").name, "trailing.");
    }
}
