use std::sync::Arc;
use crate::message::Message;
use crate::llm::{LLMResult, GenerateResult};
use futures::future::BoxFuture;

/// Convert a concrete L into an `Arc<dyn LLM>`.
pub fn llm_to_arc_dyn<L>(llm: L) -> Arc<dyn LLM>
where
    L: 'static + LLM,
{
    Arc::new(llm)
}

/// Core LLM trait. Returns a `BoxFuture` tied to the input lifetime so
/// implementations can borrow `messages` instead of cloning them.
pub trait LLM: Send + Sync {
    /// Produce a generation result for the conversation in `messages`.
    fn generate<'a>(&'a self, messages: &'a [Message]) -> BoxFuture<'a, LLMResult<GenerateResult>>;
}
