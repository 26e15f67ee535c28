//! The query-builder capability a condition compiler emits into.

use crate::ast::expr::BinaryOperator;
use model::{
    condition::operator::{Operator, SortDir},
    core::value::{Operand, Scalar},
};

/// Comparison verbs accepted by [`QueryBuilder::where_cmp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Like,
    NotLike,
}

impl Comparison {
    /// The comparison a leaf operator maps to. `IN`, `BETWEEN` and the null
    /// checks have dedicated builder calls and map to `None`.
    pub fn from_operator(operator: Operator) -> Option<Self> {
        match operator {
            Operator::Eq => Some(Comparison::Eq),
            Operator::Neq => Some(Comparison::NotEq),
            Operator::Lt => Some(Comparison::Lt),
            Operator::Gt => Some(Comparison::Gt),
            Operator::Lte => Some(Comparison::LtEq),
            Operator::Gte => Some(Comparison::GtEq),
            Operator::Like => Some(Comparison::Like),
            Operator::NotLike => Some(Comparison::NotLike),
            Operator::Between
            | Operator::In
            | Operator::IsNull
            | Operator::IsNotNull
            | Operator::Unrecognized => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::NotEq => "<>",
            Comparison::Lt => "<",
            Comparison::Gt => ">",
            Comparison::LtEq => "<=",
            Comparison::GtEq => ">=",
            Comparison::Like => "like",
            Comparison::NotLike => "not like",
        }
    }
}

impl From<Comparison> for BinaryOperator {
    fn from(cmp: Comparison) -> Self {
        match cmp {
            Comparison::Eq => BinaryOperator::Eq,
            Comparison::NotEq => BinaryOperator::NotEq,
            Comparison::Lt => BinaryOperator::Lt,
            Comparison::Gt => BinaryOperator::Gt,
            Comparison::LtEq => BinaryOperator::LtEq,
            Comparison::GtEq => BinaryOperator::GtEq,
            Comparison::Like => BinaryOperator::Like,
            Comparison::NotLike => BinaryOperator::NotLike,
        }
    }
}

/// A stateful, single-writer query builder.
///
/// `where_*` calls join the current scope with AND, `or_where_*` calls with
/// OR. `and_scope`/`or_scope` open a nested, parenthesized AND or OR group
/// and hand the builder back to the closure; clauses added inside the
/// closure land in that group. A nested group joins its enclosing group with
/// the enclosing group's own kind.
pub trait QueryBuilder {
    fn and_scope<F>(&mut self, scope: F)
    where
        F: FnOnce(&mut Self);

    fn or_scope<F>(&mut self, scope: F)
    where
        F: FnOnce(&mut Self);

    fn where_cmp(&mut self, field: &str, cmp: Comparison, value: &Operand);
    fn or_where_cmp(&mut self, field: &str, cmp: Comparison, value: &Operand);

    fn where_in(&mut self, field: &str, values: &[Scalar]);
    fn or_where_in(&mut self, field: &str, values: &[Scalar]);

    /// Inclusive range check.
    fn where_between(&mut self, field: &str, low: &Scalar, high: &Scalar);
    fn or_where_between(&mut self, field: &str, low: &Scalar, high: &Scalar);

    fn where_null(&mut self, field: &str);
    fn or_where_null(&mut self, field: &str);

    fn where_not_null(&mut self, field: &str);
    fn or_where_not_null(&mut self, field: &str);

    fn order_by(&mut self, field: &str, direction: SortDir);
    fn offset(&mut self, offset: u64);
    fn limit(&mut self, limit: u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_from_operator() {
        assert_eq!(Comparison::from_operator(Operator::Neq), Some(Comparison::NotEq));
        assert_eq!(Comparison::from_operator(Operator::NotLike).map(Comparison::as_str), Some("not like"));
        assert_eq!(Comparison::from_operator(Operator::In), None);
        assert_eq!(Comparison::from_operator(Operator::Unrecognized), None);
    }
}
