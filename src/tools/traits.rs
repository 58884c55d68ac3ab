use super::error::ToolError;

// re-export ArgSchema for macros use
pub use super::schema::ArgSchema;

/// Something the agent can run on the model's behalf. Input is the `args`
/// object of a tool call; output is the text fed back to the model.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn args(&self) -> Vec<ArgSchema>;
    async fn run(&self, input: serde_json::Value) -> Result<String, ToolError>;
}

/// Pull a required string argument out of a tool-call `args` object.
pub(crate) fn string_arg(
    tool: &str,
    input: &serde_json::Value,
    key: &str,
) -> Result<String, ToolError> {
    input
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            ToolError::ParamsNotMatched(format!("{tool}: missing string argument '{key}'"))
        })
}
