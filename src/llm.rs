pub mod traits;
pub mod openai;
pub mod ollama;
pub mod tokens;
pub mod error;
pub mod scripted;


use serde::{Serialize, Deserialize};
use serde_json::Value as JsonValue;
use tokens::TokenUsage;

/// Result of a text generation from an LLM.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GenerateResult {
    pub tokens: TokenUsage,
    pub generation: String,
    /// Tool calls the model requested in this generation. Back ends recover
    /// these from the generated text with [`parse_tool_calls`].
    #[serde(default)]
    pub tool_calls: Vec<CallInfo>,
}

/// Structured information about a single tool call requested by the LLM.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CallInfo {
    pub name: String,
    #[serde(default)]
    pub args: JsonValue,
}

/// Result type for LLM operations.
pub type LLMResult<T> = std::result::Result<T, error::LLMError>;

/// Recover `{"tool_calls": [{"name": .., "args": {..}}]}` from generated text.
///
/// The whole generation is tried first, then the widest `{ .. }` span inside
/// it. Entries without a string `name` are skipped; a missing `args` becomes
/// an empty object.
pub fn parse_tool_calls(generation: &str) -> Vec<CallInfo> {
    let parsed = serde_json::from_str::<JsonValue>(generation).ok().or_else(|| {
        let start = generation.find('{')?;
        let end = generation.rfind('}')?;
        if end < start {
            return None;
        }
        serde_json::from_str::<JsonValue>(&generation[start..=end]).ok()
    });

    let Some(entries) = parsed
        .as_ref()
        .and_then(|v| v.get("tool_calls"))
        .and_then(|v| v.as_array())
    else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let obj = entry.as_object()?;
            let name = obj.get("name")?.as_str()?.to_string();
            let args = obj.get("args").cloned().unwrap_or_else(|| serde_json::json!({}));
            Some(CallInfo { name, args })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_bare_tool_call_object() {
        let text = r#"{"tool_calls":[{"name":"wikipedia","args":{"query":"Rust"}}]}"#;
        let calls = parse_tool_calls(text);
        let expected = CallInfo {
            name: "wikipedia".into(),
            args: json!({"query": "Rust"}),
        };
        assert_eq!(calls, vec![expected]);
    }

    #[test]
    fn parses_tool_calls_wrapped_in_prose() {
        let text = "Let me look that up.\n```json\n{\"tool_calls\":[{\"name\":\"duckduckgo_search\"}]}\n```";
        let calls = parse_tool_calls(text);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "duckduckgo_search");
        assert_eq!(calls[0].args, json!({}));
    }

    #[test]
    fn research_answer_is_not_a_tool_call() {
        let text = "```json\n{\"topic\":\"x\",\"tools_used\":[\"wikipedia\"]}\n```";
        assert!(parse_tool_calls(text).is_empty());
        assert!(parse_tool_calls("no json here } {").is_empty());
    }
}
