use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    /// A group was constructed without any child nodes.
    #[error("Condition group must contain at least one child")]
    EmptyGroup,

    /// A leaf object is missing one of its required keys.
    #[error("Leaf condition is missing required key `{0}`")]
    MissingKey(&'static str),

    #[error("Failed to decode condition spec: {0}")]
    Json(#[from] serde_json::Error),
}
