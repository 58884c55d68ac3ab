#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Tool execution error in '{name}': {reason}")]
    ExecutionError {
        name: String,
        reason: String,
    },

    #[error("Tool parameters do not match: {0}")]
    ParamsNotMatched(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ToolError {
    pub fn execution(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::ExecutionError {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}
