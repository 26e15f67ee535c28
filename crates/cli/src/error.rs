use model::error::ModelError;
use query_builder::error::QueryBuildError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read the spec file: {0}")]
    SpecFileRead(#[from] std::io::Error),

    #[error("Failed to decode the condition spec: {0}")]
    SpecDecode(#[from] ModelError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Invalid dialect setting: {0}")]
    Dialect(#[from] QueryBuildError),

    /// A required setting was given neither as a flag nor in the environment.
    #[error("Missing required setting `{name}` (pass --{name} or set {env_var})")]
    MissingSetting {
        name: &'static str,
        env_var: &'static str,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}
