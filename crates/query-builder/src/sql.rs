//! A [`QueryBuilder`] that assembles a `SELECT` AST and renders it to
//! parameterized SQL.

use crate::{
    ast::{
        common::TableRef,
        expr::{BinaryOperator, Expr},
        select::{FromClause, OrderByExpr, Select},
    },
    builder::{Comparison, QueryBuilder},
    dialect::Dialect,
    ident,
    renderer::{Render, Renderer},
    value,
};
use model::{
    condition::operator::{Logic, SortDir},
    core::value::{Operand, Scalar},
};
use tracing::debug;

#[derive(Debug, Clone)]
struct Clause {
    connector: Logic,
    expr: Expr,
}

/// An open scope. `logic` is the scope's own kind and joins nested scopes
/// opened inside it; plain clauses carry their own connector.
#[derive(Debug, Clone)]
struct Frame {
    logic: Logic,
    clauses: Vec<Clause>,
}

impl Frame {
    fn new(logic: Logic) -> Self {
        Self {
            logic,
            clauses: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqlQueryBuilder {
    table: TableRef,
    columns: Vec<Expr>,
    /// Open scopes, innermost last. The first frame is the WHERE clause itself.
    scopes: Vec<Frame>,
    order_by: Vec<OrderByExpr>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl SqlQueryBuilder {
    /// Starts a `SELECT * FROM <table>`; `schema.table` is accepted.
    pub fn new(table: &str) -> Self {
        Self {
            table: TableRef::parse(table),
            columns: Vec::new(),
            scopes: vec![Frame::new(Logic::And)],
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Sets the select list. `*` entries select everything.
    pub fn columns<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.columns = columns
            .iter()
            .map(|c| match c.as_ref().trim() {
                "*" => Expr::Wildcard,
                name => ident(name),
            })
            .collect();
        self
    }

    /// Finalizes and returns the constructed `Select` AST.
    pub fn build(&self) -> Select {
        let where_clause = self
            .scopes
            .first()
            .and_then(|frame| combine(frame.clauses.clone()));

        Select {
            columns: self.columns.clone(),
            from: Some(FromClause {
                table: self.table.clone(),
                alias: None,
            }),
            where_clause,
            order_by: self.order_by.clone(),
            limit: self.limit.map(count_param),
            offset: self.offset.map(count_param),
        }
    }

    pub fn to_sql(&self, dialect: &dyn Dialect) -> (String, Vec<Scalar>) {
        let mut renderer = Renderer::new(dialect);
        self.build().render(&mut renderer);
        renderer.finish()
    }

    fn push(&mut self, connector: Logic, expr: Expr) {
        let clause = Clause { connector, expr };
        match self.scopes.last_mut() {
            Some(frame) => frame.clauses.push(clause),
            None => self.scopes.push(Frame {
                logic: Logic::And,
                clauses: vec![clause],
            }),
        }
    }

    fn open_scope(&mut self, logic: Logic) {
        self.scopes.push(Frame::new(logic));
    }

    /// Pops the innermost frame and adds its combined clauses to the
    /// enclosing scope, joined with that scope's kind.
    fn close_scope(&mut self) {
        let Some(frame) = self.scopes.pop() else {
            return;
        };

        let connector = self.scopes.last().map_or(Logic::And, |outer| outer.logic);
        match combine(frame.clauses) {
            Some(expr) => self.push(connector, expr),
            None => debug!("Skipping empty {} scope", frame.logic),
        }
    }

    fn cmp_expr(field: &str, cmp: Comparison, operand: &Operand) -> Expr {
        let right = match operand {
            Operand::Scalar(v) => value(v.clone()),
            Operand::List(values) => Expr::Tuple(values.iter().cloned().map(value).collect()),
        };
        Expr::binary(ident(field), BinaryOperator::from(cmp), right)
    }

    fn in_expr(field: &str, values: &[Scalar]) -> Expr {
        Expr::InList {
            expr: Box::new(ident(field)),
            list: values.iter().cloned().map(value).collect(),
        }
    }

    fn between_expr(field: &str, low: &Scalar, high: &Scalar) -> Expr {
        Expr::Between {
            expr: Box::new(ident(field)),
            low: Box::new(value(low.clone())),
            high: Box::new(value(high.clone())),
        }
    }

    fn null_expr(field: &str, negated: bool) -> Expr {
        Expr::IsNull {
            expr: Box::new(ident(field)),
            negated,
        }
    }
}

/// Folds a scope's clauses with SQL precedence: runs of AND-joined clauses
/// bind first, and the runs are then OR-ed together. The connector of the
/// first clause is ignored.
fn combine(clauses: Vec<Clause>) -> Option<Expr> {
    let mut runs: Vec<Expr> = Vec::new();
    let mut current: Option<Expr> = None;

    for Clause { connector, expr } in clauses {
        current = match (current.take(), connector) {
            (None, _) => Some(expr),
            (Some(run), Logic::And) => Some(run.and(expr)),
            (Some(run), Logic::Or) => {
                runs.push(run);
                Some(expr)
            }
        };
    }
    runs.extend(current);

    runs.into_iter().reduce(Expr::or)
}

fn count_param(n: u64) -> Expr {
    value(Scalar::Int(i64::try_from(n).unwrap_or(i64::MAX)))
}

impl QueryBuilder for SqlQueryBuilder {
    fn and_scope<F>(&mut self, scope: F)
    where
        F: FnOnce(&mut Self),
    {
        self.open_scope(Logic::And);
        scope(self);
        self.close_scope();
    }

    fn or_scope<F>(&mut self, scope: F)
    where
        F: FnOnce(&mut Self),
    {
        self.open_scope(Logic::Or);
        scope(self);
        self.close_scope();
    }

    fn where_cmp(&mut self, field: &str, cmp: Comparison, value: &Operand) {
        self.push(Logic::And, Self::cmp_expr(field, cmp, value));
    }

    fn or_where_cmp(&mut self, field: &str, cmp: Comparison, value: &Operand) {
        self.push(Logic::Or, Self::cmp_expr(field, cmp, value));
    }

    fn where_in(&mut self, field: &str, values: &[Scalar]) {
        self.push(Logic::And, Self::in_expr(field, values));
    }

    fn or_where_in(&mut self, field: &str, values: &[Scalar]) {
        self.push(Logic::Or, Self::in_expr(field, values));
    }

    fn where_between(&mut self, field: &str, low: &Scalar, high: &Scalar) {
        self.push(Logic::And, Self::between_expr(field, low, high));
    }

    fn or_where_between(&mut self, field: &str, low: &Scalar, high: &Scalar) {
        self.push(Logic::Or, Self::between_expr(field, low, high));
    }

    fn where_null(&mut self, field: &str) {
        self.push(Logic::And, Self::null_expr(field, false));
    }

    fn or_where_null(&mut self, field: &str) {
        self.push(Logic::Or, Self::null_expr(field, false));
    }

    fn where_not_null(&mut self, field: &str) {
        self.push(Logic::And, Self::null_expr(field, true));
    }

    fn or_where_not_null(&mut self, field: &str) {
        self.push(Logic::Or, Self::null_expr(field, true));
    }

    fn order_by(&mut self, field: &str, direction: SortDir) {
        self.order_by.push(OrderByExpr {
            expr: ident(field),
            direction: Some(direction.into()),
        });
    }

    fn offset(&mut self, offset: u64) {
        self.offset = Some(offset);
    }

    fn limit(&mut self, limit: u64) {
        self.limit = Some(limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySql, Postgres};
    use tracing_test::traced_test;

    #[test]
    fn test_flat_chain_uses_sql_precedence() {
        let mut qb = SqlQueryBuilder::new("t");
        qb.where_cmp("a", Comparison::Eq, &1.into());
        qb.where_cmp("b", Comparison::Eq, &2.into());
        qb.or_where_cmp("c", Comparison::Eq, &3.into());

        let (sql, params) = qb.to_sql(&Postgres);
        assert_eq!(
            sql,
            r#"SELECT * FROM "t" WHERE ((("a" = $1) AND ("b" = $2)) OR ("c" = $3))"#
        );
        assert_eq!(params, vec![Scalar::Int(1), Scalar::Int(2), Scalar::Int(3)]);
    }

    #[test]
    fn test_or_binds_looser_than_later_and() {
        let mut qb = SqlQueryBuilder::new("t");
        qb.where_null("a");
        qb.or_where_not_null("b");
        qb.where_between("c", &Scalar::Int(1), &Scalar::Int(5));

        let (sql, _) = qb.to_sql(&MySql);
        assert_eq!(
            sql,
            "SELECT * FROM `t` WHERE ((`a` IS NULL) OR ((`b` IS NOT NULL) AND (`c` BETWEEN ? AND ?)))"
        );
    }

    #[test]
    fn test_nested_scopes() {
        let mut qb = SqlQueryBuilder::new("t");
        qb.or_scope(|outer| {
            outer.and_scope(|inner| {
                inner.where_cmp("a", Comparison::Eq, &1.into());
                inner.where_cmp("b", Comparison::Eq, &2.into());
            });
            outer.or_where_cmp("c", Comparison::Eq, &3.into());
        });

        let (sql, _) = qb.to_sql(&Postgres);
        assert_eq!(
            sql,
            r#"SELECT * FROM "t" WHERE ((("a" = $1) AND ("b" = $2)) OR ("c" = $3))"#
        );
    }

    #[test]
    #[traced_test]
    fn test_empty_scope_is_omitted() {
        let mut qb = SqlQueryBuilder::new("t");
        qb.and_scope(|_| {});
        qb.where_in("id", &[]);

        let (sql, params) = qb.to_sql(&Postgres);
        assert_eq!(sql, r#"SELECT * FROM "t" WHERE (1 = 0)"#);
        assert!(params.is_empty());
        assert!(logs_contain("Skipping empty AND scope"));
    }

    #[test]
    fn test_scope_joins_enclosing_scope_with_its_kind() {
        let mut qb = SqlQueryBuilder::new("t");
        qb.and_scope(|outer| {
            outer.where_cmp("a", Comparison::Eq, &1.into());
            outer.or_scope(|inner| {
                inner.or_where_null("b");
                inner.or_where_cmp("b", Comparison::Gt, &2.into());
            });
        });

        let (sql, _) = qb.to_sql(&Postgres);
        assert_eq!(
            sql,
            r#"SELECT * FROM "t" WHERE (("a" = $1) AND (("b" IS NULL) OR ("b" > $2)))"#
        );
    }

    #[test]
    fn test_pagination_renders_limit_before_offset() {
        let mut qb = SqlQueryBuilder::new("public.articles").columns(&["id", "a.title"]);
        qb.order_by("createdAt", SortDir::Desc);
        qb.order_by("id", SortDir::Asc);
        qb.offset(20);
        qb.limit(10);

        let (sql, params) = qb.to_sql(&Postgres);
        assert_eq!(
            sql,
            r#"SELECT "id", "a"."title" FROM "public"."articles" ORDER BY "createdAt" DESC, "id" ASC LIMIT $1 OFFSET $2"#
        );
        assert_eq!(params, vec![Scalar::Int(10), Scalar::Int(20)]);
    }

    #[test]
    fn test_list_operand_in_comparison_renders_tuple() {
        let mut qb = SqlQueryBuilder::new("t").columns(&["*"]);
        qb.where_cmp("pair", Comparison::Eq, &Operand::from(vec![1, 2]));

        let (sql, params) = qb.to_sql(&Postgres);
        assert_eq!(sql, r#"SELECT * FROM "t" WHERE ("pair" = ($1, $2))"#);
        assert_eq!(params.len(), 2);
    }
}
