use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryBuildError {
    #[error("Unsupported SQL dialect: {0} (expected `postgres` or `mysql`)")]
    UnsupportedDialect(String),
}
