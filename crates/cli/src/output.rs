use crate::error::CliError;
use model::core::value::Scalar;
use query_builder::dialect::DialectKind;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    pub dialect: DialectKind,
    pub sql: String,
    pub params: Vec<Scalar>,
}

pub fn format_text(query: &CompiledQuery) -> String {
    let mut out = query.sql.clone();
    for (i, param) in query.params.iter().enumerate() {
        out.push_str(&format!("\n-- ${}: {param}", i + 1));
    }
    out
}

pub fn print_query(query: &CompiledQuery, as_json: bool) -> Result<(), CliError> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(query)?);
    } else {
        println!("{}", format_text(query));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> CompiledQuery {
        CompiledQuery {
            dialect: DialectKind::MySql,
            sql: "SELECT * FROM `t` WHERE (`a` = ?)".into(),
            params: vec![Scalar::from("x'y")],
        }
    }

    #[test]
    fn test_format_text_lists_params() {
        assert_eq!(
            format_text(&query()),
            "SELECT * FROM `t` WHERE (`a` = ?)\n-- $1: 'x''y'"
        );
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(query()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "dialect": "mysql",
                "sql": "SELECT * FROM `t` WHERE (`a` = ?)",
                "params": ["x'y"]
            })
        );
    }
}
