// Reference: https://github.com/64bit/async-openai/blob/main/examples/chat/src/main.rs
pub use async_openai::{Client, config::OpenAIConfig};
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use futures::{FutureExt, future::BoxFuture};
use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::message::{Message, MessageRole};
use crate::llm::{
    traits::LLM,
    tokens::TokenUsage,
    error::LLMError,
    parse_tool_calls,
    GenerateResult,
    LLMResult,
};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionOptions {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// A unique identifier representing your end-user, which will help OpenAI to monitor and detect abuse.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: None,
            temperature: None,
            user: None,
        }
    }
}

/// Chat-completions back end for OpenAI and OpenAI-compatible servers.
pub struct OpenAI {
    pub client: Client<OpenAIConfig>,
    pub options: CompletionOptions,
}

impl OpenAI {
    /// Client configured from `OPENAI_API_KEY` / `OPENAI_BASE_URL`.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            options: CompletionOptions::default(),
        }
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self::with_config(OpenAIConfig::new().with_api_key(api_key))
    }

    pub fn with_config(config: OpenAIConfig) -> Self {
        Self {
            client: Client::with_config(config),
            options: CompletionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.options.model = model.into();
        self
    }

    fn map_message(message: &Message) -> LLMResult<ChatCompletionRequestMessage> {
        let content = message.content.clone();
        let mapped: ChatCompletionRequestMessage = match message.role {
            MessageRole::System | MessageRole::Developer => {
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(content)
                    .build()?
                    .into()
            }
            // Tool output is plain text in the pseudo tool-calling protocol,
            // so it goes back as a user turn rather than a native tool message.
            MessageRole::User | MessageRole::Tool => {
                ChatCompletionRequestUserMessageArgs::default()
                    .content(content)
                    .build()?
                    .into()
            }
            MessageRole::Assistant => {
                ChatCompletionRequestAssistantMessageArgs::default()
                    .content(content)
                    .build()?
                    .into()
            }
        };
        Ok(mapped)
    }
}

impl Default for OpenAI {
    fn default() -> Self {
        Self::new()
    }
}

impl LLM for OpenAI {
    fn generate<'a>(&'a self, messages: &'a [Message]) -> BoxFuture<'a, LLMResult<GenerateResult>> {
        async move {
            let mapped = messages
                .iter()
                .map(Self::map_message)
                .collect::<LLMResult<Vec<_>>>()?;

            let mut builder = CreateChatCompletionRequestArgs::default();
            builder.model(self.options.model.clone()).messages(mapped);
            if let Some(max_tokens) = self.options.max_tokens {
                builder.max_tokens(max_tokens);
            }
            if let Some(temperature) = self.options.temperature {
                builder.temperature(temperature);
            }
            if let Some(user) = self.options.user.clone() {
                builder.user(user);
            }
            let request = builder.build()?;

            debug!(
                model = %self.options.model,
                messages = messages.len(),
                "sending chat completion request"
            );
            let response = self.client.chat().create(request).await?;

            let generation = response
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .ok_or_else(|| LLMError::InvalidResponse("completion has no content".to_string()))?;

            let tokens = response
                .usage
                .map(|usage| TokenUsage::new(usage.prompt_tokens, usage.completion_tokens))
                .unwrap_or_default();

            let tool_calls = parse_tool_calls(&generation);
            Ok(GenerateResult { tokens, generation, tool_calls })
        }
        .boxed()
    }
}
