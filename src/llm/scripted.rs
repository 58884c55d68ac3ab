//! An `LLM` that replays canned replies, for tests and offline demos.

use std::collections::VecDeque;
use std::sync::Mutex;

use futures::{FutureExt, future::BoxFuture};

use crate::llm::{
    error::LLMError,
    parse_tool_calls,
    traits::LLM,
    tokens::TokenUsage,
    GenerateResult,
    LLMResult,
};
use crate::message::Message;

#[derive(Debug, Default)]
pub struct ScriptedLLM {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedLLM {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every message list passed to `generate`, in call order.
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl LLM for ScriptedLLM {
    fn generate<'a>(&'a self, messages: &'a [Message]) -> BoxFuture<'a, LLMResult<GenerateResult>> {
        async move {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(messages.to_vec());
            }
            let generation = self
                .replies
                .lock()
                .ok()
                .and_then(|mut replies| replies.pop_front())
                .ok_or_else(|| LLMError::InvalidResponse("script exhausted".to_string()))?;
            let tool_calls = parse_tool_calls(&generation);
            Ok(GenerateResult {
                tokens: TokenUsage::new(10, 5),
                generation,
                tool_calls,
            })
        }
        .boxed()
    }
}
