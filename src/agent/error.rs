use crate::llm::error::LLMError;

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    LLMExecutionError(#[from] LLMError),

    #[error("Failed to describe tools: {0}")]
    ToolSchema(#[from] serde_json::Error),

    #[error("Maximum iterations exceeded: {0}")]
    MaxIterationsExceeded(usize),
}
