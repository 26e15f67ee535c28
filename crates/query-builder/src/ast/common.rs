//! Defines common, reusable AST nodes for building SQL queries.

use model::condition::operator::SortDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub schema: Option<String>,
    pub name: String,
}

impl TableRef {
    /// Parses `table` or `schema.table`.
    pub fn parse(name: &str) -> Self {
        match name.split_once('.') {
            Some((schema, table)) => TableRef {
                schema: Some(schema.to_string()),
                name: table.to_string(),
            },
            None => TableRef {
                schema: None,
                name: name.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDir {
    Asc,
    Desc,
}

impl From<SortDir> for OrderDir {
    fn from(dir: SortDir) -> Self {
        match dir {
            SortDir::Asc => OrderDir::Asc,
            SortDir::Desc => OrderDir::Desc,
        }
    }
}
