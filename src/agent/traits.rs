use crate::message::Message;
use super::types::AgentExecuteResult;

/// Trait describing runtime operations an agent can perform.
#[async_trait::async_trait]
pub trait AgentRunner: Send + Sync {
    /// Run one user turn. `history` holds earlier turns of the same
    /// conversation and is replayed to the model before `prompt`.
    async fn call_llm(&self, history: &[Message], prompt: &str) -> AgentExecuteResult;
}
