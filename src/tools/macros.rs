// Unit tests for the proc-macro-generated Tool wrappers
#[cfg(test)]
mod tests {
	use serde_json::json;
	use futures::executor::block_on;
	use crate::tools::error::ToolError;
	use crate::tools::traits::Tool;

	#[crate::tool(
		name = "word_count",
		description = "Count the words in a piece of text",
		params(text = "The text to count")
	)]
	fn count_words(text: String) -> String {
		text.split_whitespace().count().to_string()
	}

	#[crate::tool(
		description = "Keep the first characters of a piece of text",
		params(text = "Text to truncate", max_chars = "Maximum characters to keep")
	)]
	async fn truncate(text: String, max_chars: usize) -> String {
		text.chars().take(max_chars).collect()
	}

	#[test]
	fn generated_tool_runs_and_uses_name_override() {
		let tool = CountWordsTool;
		assert_eq!(tool.name(), "word_count");
		let got = block_on(tool.run(json!({ "text": "one two three" }))).expect("tool run failed");
		assert_eq!(got, "3");
	}

	#[test]
	fn async_tool_advertises_typed_args() {
		let args = TruncateTool.args();
		assert_eq!(TruncateTool.name(), "truncate");
		assert_eq!(args[0].arg_type, "string");
		assert_eq!(args[1].arg_type, "integer");
		assert!(args.iter().all(|a| a.required));

		let got = block_on(TruncateTool.run(json!({ "text": "abcdef", "max_chars": 2 }))).unwrap();
		assert_eq!(got, "ab");
	}

	#[test]
	fn mismatched_params_are_rejected() {
		let err = block_on(CountWordsTool.run(json!({ "body": "x" }))).unwrap_err();
		assert!(matches!(err, ToolError::ParamsNotMatched(_)));
		let err = block_on(TruncateTool.run(json!({ "text": "abc" }))).unwrap_err();
		assert!(matches!(err, ToolError::ParamsNotMatched(_)));
	}
}
