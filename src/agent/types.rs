use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Serialize, Deserialize};

use super::error::AgentError;
use crate::llm::tokens::TokenUsage;
use crate::llm::traits::LLM;
use crate::tools::traits::Tool;

/// An LLM plus the tools it may call.
pub struct Agent {
    /// A short, human-friendly name for the agent instance.
    pub name: String,

    pub llm: Arc<dyn LLM>,

    /// Registered tools, keyed by the name the model uses to call them.
    pub tools: BTreeMap<String, Arc<dyn Tool>>,

    /// Instructions describing the agent's role, sent as the first system message.
    pub system_prompt: Option<String>,

    /// Upper bound on model calls per turn.
    pub max_iterations: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AgentResult {
    pub tokens: TokenUsage,
    /// Final reply of the model, i.e. the first generation without tool calls.
    pub generation: String,
    /// Names of the tools executed during the turn, in call order.
    pub tools_called: Vec<String>,
}

pub type AgentExecuteResult = Result<AgentResult, AgentError>;
