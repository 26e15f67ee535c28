use crate::compiler::QueryCompiler;
use model::{condition::spec::ConditionSpec, core::value::Scalar};
use query_builder::{SqlQueryBuilder, dialect::Dialect};
use tracing::debug;

pub struct QueryGenerator<'a> {
    dialect: &'a dyn Dialect,
    compiler: QueryCompiler,
}

impl<'a> QueryGenerator<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            dialect,
            compiler: QueryCompiler::new(),
        }
    }

    /// Generates a SQL SELECT statement and its parameters.
    ///
    /// An empty `columns` list, or a `*` entry, selects every column.
    pub fn select<S: AsRef<str>>(
        &self,
        table: &str,
        columns: &[S],
        spec: Option<&ConditionSpec>,
    ) -> (String, Vec<Scalar>) {
        let mut builder = SqlQueryBuilder::new(table).columns(columns);
        self.compiler.compile_optional(&mut builder, spec);

        let (sql, params) = builder.to_sql(self.dialect);
        debug!(
            dialect = %self.dialect.name(),
            params = params.len(),
            "Generated select: {sql}"
        );
        (sql, params)
    }
}
