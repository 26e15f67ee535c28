use crate::{
    ast::{
        common::{OrderDir, TableRef},
        select::{FromClause, OrderByExpr, Select},
    },
    renderer::{Render, Renderer},
};

impl Render for Select {
    fn render(&self, r: &mut Renderer) {
        // 1. SELECT clause
        r.sql.push_str("SELECT ");
        if self.columns.is_empty() {
            r.sql.push('*');
        } else {
            r.comma_separated(&self.columns);
        }

        // 2. FROM
        if let Some(from) = &self.from {
            r.sql.push(' ');
            from.render(r);
        }

        // 3. WHERE
        if let Some(where_clause) = &self.where_clause {
            r.sql.push_str(" WHERE ");
            where_clause.render(r);
        }

        // 4. ORDER BY
        if !self.order_by.is_empty() {
            r.sql.push_str(" ORDER BY ");
            r.comma_separated(&self.order_by);
        }

        // 5. LIMIT
        if let Some(limit) = &self.limit {
            r.sql.push_str(" LIMIT ");
            limit.render(r);
        }

        // 6. OFFSET
        if let Some(offset) = &self.offset {
            r.sql.push_str(" OFFSET ");
            offset.render(r);
        }
    }
}

impl Render for TableRef {
    fn render(&self, r: &mut Renderer) {
        if let Some(schema) = &self.schema {
            r.sql.push_str(&r.dialect.quote_identifier(schema));
            r.sql.push('.');
        }
        r.sql.push_str(&r.dialect.quote_identifier(&self.name));
    }
}

impl Render for FromClause {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("FROM ");
        self.table.render(r);
        if let Some(alias) = &self.alias {
            r.sql.push_str(" AS ");
            r.sql.push_str(&r.dialect.quote_identifier(alias));
        }
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

#[cfg(test)]
mod tests {
    use crate::{
        ast::{
            common::OrderDir,
            expr::{BinaryOperator, Expr},
            select::{FromClause, OrderByExpr, Select},
        },
        dialect::{MySql, Postgres},
        ident,
        renderer::{Render, Renderer},
        table_ref, value,
    };
    use model::core::value::Scalar;

    #[test]
    fn test_simple_select_postgres() {
        let ast = Select {
            columns: vec![ident("id"), ident("name")],
            from: Some(FromClause {
                table: table_ref!("users"),
                alias: None,
            }),
            where_clause: Some(Expr::binary(ident("id"), BinaryOperator::Eq, value!(123))),
            ..Default::default()
        };

        let dialect = Postgres;
        let mut renderer = Renderer::new(&dialect);
        ast.render(&mut renderer);
        let (sql, params) = renderer.finish();

        assert_eq!(sql, r#"SELECT "id", "name" FROM "users" WHERE ("id" = $1)"#);
        assert_eq!(params, vec![Scalar::Int(123)]);
    }

    #[test]
    fn test_wildcard_select_with_schema_mysql() {
        let ast = Select {
            from: Some(FromClause {
                table: table_ref!("shop", "orders"),
                alias: Some("o".to_string()),
            }),
            order_by: vec![OrderByExpr {
                expr: ident("o.created_at"),
                direction: Some(OrderDir::Desc),
            }],
            limit: Some(value!(10)),
            offset: Some(value!(20)),
            ..Default::default()
        };

        let dialect = MySql;
        let mut renderer = Renderer::new(&dialect);
        ast.render(&mut renderer);
        let (sql, params) = renderer.finish();

        assert_eq!(
            sql,
            "SELECT * FROM `shop`.`orders` AS `o` ORDER BY `o`.`created_at` DESC LIMIT ? OFFSET ?"
        );
        assert_eq!(params, vec![Scalar::Int(10), Scalar::Int(20)]);
    }
}
