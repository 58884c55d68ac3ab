use std::collections::BTreeMap;
use std::sync::Arc;
use serde_json::json;
use tracing::{debug, warn};

use crate::llm::traits::LLM;
use crate::message::Message;
use crate::tools::{
    traits::Tool,
    schema::ToolSchema,
};


pub mod types;
pub mod error;
pub mod traits;

use traits::AgentRunner;
use types::{Agent, AgentResult, AgentExecuteResult};
use error::AgentError;

pub const DEFAULT_MAX_ITERATIONS: usize = 10;


impl Agent {
    /// Create a new Agent with the provided name and LLM. Tools start empty.
    pub fn new(name: impl Into<String>, llm: Arc<dyn LLM>, max_iterations: Option<usize>) -> Self {
        Self {
            name: name.into(),
            llm,
            tools: BTreeMap::new(),
            system_prompt: None,
            max_iterations: max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS),
        }
    }

    /// Register a tool under the given name (the tool's own name when `None`).
    /// Replaces any existing tool with the same name.
    pub fn register_tool(&mut self, name: Option<&str>, tool: Arc<dyn Tool>) -> &mut Self {
        let name = name.unwrap_or_else(|| tool.name()).to_string();
        self.tools.insert(name, tool);
        self
    }

    pub fn register_tools(&mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> &mut Self {
        for tool in tools {
            self.register_tool(None, tool);
        }
        self
    }

    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.system_prompt = Some(prompt.into());
    }

    /// System prompt plus, when tools are registered, the tool-call protocol.
    pub fn generate_system_prompt(&self) -> Vec<Message> {
        let mut msgs = Vec::new();
        if let Some(prompt) = self.system_prompt.as_ref() {
            msgs.push(Message::system(prompt.clone()));
        }
        if !self.tools.is_empty() {
            msgs.push(Message::developer(format!(
                "You can call the tools described below. To call a tool, reply with only this JSON object: {}\n\n\
                 Tool results are sent back to you. Once you have what you need, reply WITHOUT any tool_calls; \
                 that reply is your final answer.",
                json!({
                    "tool_calls": [
                        {
                            "name": "tool_name",
                            "args": {
                                "param1": "value1",
                                "param2": "value2"
                            }
                        }
                    ]
                })
            )));
        }
        msgs
    }

    /// Sent back when the model names a tool that is not registered.
    fn unknown_tool_reply(&self, name: &str) -> String {
        let known: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        format!("{name} is not a valid tool, try one of [{}].", known.join(", "))
    }

    /// One system message per tool with its JSON schema.
    pub fn generate_tools_prompt(&self) -> Result<Vec<Message>, AgentError> {
        self.tools
            .iter()
            .map(|(name, tool)| {
                let schema = ToolSchema {
                    name: name.clone(),
                    description: tool.description().to_string(),
                    args: tool.args(),
                };
                Ok(Message::system(serde_json::to_string(&schema)?))
            })
            .collect()
    }
}



#[async_trait::async_trait]
impl AgentRunner for Agent {
    async fn call_llm(&self, history: &[Message], prompt: &str) -> AgentExecuteResult {
        let mut msgs: Vec<Message> = self.generate_system_prompt();
        msgs.extend(self.generate_tools_prompt()?);
        msgs.extend_from_slice(history);
        msgs.push(Message::user(prompt));

        let mut result = AgentResult::default();
        // Call the LLM, run any requested tools, feed results back, repeat.
        for iteration in 1..=self.max_iterations {
            let res = self.llm.generate(&msgs).await?;
            result.tokens += res.tokens;

            if res.tool_calls.is_empty() {
                debug!(
                    agent = %self.name,
                    iteration,
                    tokens = result.tokens.total_tokens,
                    "final answer"
                );
                result.generation = res.generation;
                return Ok(result);
            }

            msgs.push(Message::assistant(res.generation));
            for call_info in res.tool_calls {
                let name = call_info.name;
                let Some(tool_impl) = self.tools.get(&name) else {
                    warn!(agent = %self.name, tool = %name, "model called an unknown tool");
                    msgs.push(Message::tool_result(&name, self.unknown_tool_reply(&name)));
                    continue;
                };
                debug!(agent = %self.name, tool = %name, args = %call_info.args, "running tool");
                let content = match tool_impl.run(call_info.args).await {
                    Ok(output) => format!("Tool {name} returned: {output}"),
                    Err(err) => {
                        warn!(agent = %self.name, tool = %name, error = %err, "tool failed");
                        format!("Tool {name} failed: {err}")
                    }
                };
                msgs.push(Message::tool_result(&name, content));
                result.tools_called.push(name);
            }
        }
        Err(AgentError::MaxIterationsExceeded(self.max_iterations))
    }
}
