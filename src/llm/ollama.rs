use std::sync::Arc;
use futures::{FutureExt, future::BoxFuture};
use tracing::debug;

use crate::message::Message;
use crate::message::MessageRole as MsgRole;

use crate::llm::{
    traits::LLM,
    tokens::TokenUsage,
    parse_tool_calls,
    GenerateResult,
    LLMResult,
};

/// Default model name used when no model is specified.
/// Adjust this to match a model installed in your local Ollama (`ollama list`).
pub const DEFAULT_MODEL: &str = "llama3.2";

pub use ollama_rs::{
    error::OllamaError,
    Ollama as OllamaClient,
    models::ModelOptions,
    generation::chat::{request::ChatMessageRequest, ChatMessage, MessageRole},
};


#[derive(Debug, Clone)]
pub struct Ollama {
    pub(crate) client: Arc<OllamaClient>,
    pub(crate) model: String,
    pub(crate) options: Option<ModelOptions>,
    pub(crate) think: bool,
}

impl Ollama {
    /// Create an `Ollama` wrapper using the provided client and the default model.
    pub fn new(client: Arc<OllamaClient>) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
            options: None,
            think: false,
        }
    }

    /// Connect to an Ollama server at `host` (e.g. `http://localhost`) and `port`.
    pub fn connect(host: impl Into<String>, port: u16) -> Self {
        Self::new(Arc::new(OllamaClient::new(host.into(), port)))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_options(mut self, options: ModelOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Ask reasoning models to return their thinking separately from the answer.
    pub fn with_think(mut self, think: bool) -> Self {
        self.think = think;
        self
    }

    fn generate_request(&self, messages: &[Message]) -> ChatMessageRequest {
        let mapped_messages = messages.iter().map(ChatMessage::from).collect();
        let mut request = ChatMessageRequest::new(self.model.clone(), mapped_messages);
        if let Some(options) = self.options.clone() {
            request = request.options(options);
        }
        if self.think {
            request = request.think(true);
        }
        request
    }
}

impl Default for Ollama {
    fn default() -> Self {
        Ollama::new(Arc::new(OllamaClient::default()))
    }
}


impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        let role = match message.role {
            MsgRole::System | MsgRole::Developer => MessageRole::System,
            MsgRole::User => MessageRole::User,
            MsgRole::Assistant => MessageRole::Assistant,
            MsgRole::Tool => MessageRole::Tool,
        };
        ChatMessage::new(role, message.content.clone())
    }
}


impl LLM for Ollama {
    fn generate<'a>(&'a self, messages: &'a [Message]) -> BoxFuture<'a, LLMResult<GenerateResult>> {
        async move {
            let request = self.generate_request(messages);
            debug!(model = %self.model, messages = messages.len(), "sending ollama chat request");

            let response = self.client.send_chat_messages(request).await?;
            let generation = response.message.content;

            let tokens = response
                .final_data
                .map(|final_data| {
                    TokenUsage::new(
                        final_data.prompt_eval_count as u32,
                        final_data.eval_count as u32,
                    )
                })
                .unwrap_or_default();

            let tool_calls = parse_tool_calls(&generation);
            Ok(GenerateResult { tokens, generation, tool_calls })
        }
        .boxed()
    }
}
