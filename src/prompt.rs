//! Prompts for the research agent.

use serde_json::json;

use crate::research::DisplayMode;

/// JSON schema of [`ResearchRecord`](crate::research::ResearchRecord) as shown to the model.
pub fn record_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "topic": { "type": "string" },
            "summary": { "type": "string" },
            "sources": { "type": "array", "items": { "type": "string" } },
            "tools_used": { "type": "array", "items": { "type": "string" } }
        },
        "required": ["topic", "summary", "sources", "tools_used"]
    })
}

pub fn format_instructions() -> String {
    format!(
        "Answer with a JSON object that conforms to this JSON schema, inside a ```json fenced block:\n\
         ```\n{}\n```\n\
         List every tool you called in \"tools_used\", using the tool's exact name.",
        record_schema()
    )
}

pub fn system_prompt(mode: DisplayMode) -> String {
    let role = "You are an expert research assistant. You will be given a topic to research. \
                Use the tools at your disposal to gather information and provide a concise summary \
                of the topic along with sources.";
    match mode {
        DisplayMode::SingleShot => format!(
            "{role}\nResearch the user query. Use the tools as needed and provide a summary, sources, \
             and tools used in your response.\n{}",
            format_instructions()
        ),
        DisplayMode::Conversational => format!(
            "{role}\nYou are in a conversation. Reply in plain text unless the user asks you to save \
             the research. When they do, call save_to_txt_file if you want to, and ALWAYS end with the \
             structured answer described below, including \"save_to_txt_file\" in \"tools_used\".\n{}",
            format_instructions()
        ),
    }
}

/// Wraps the user's input the way each mode presents it to the model.
pub fn user_prompt(mode: DisplayMode, query: &str) -> String {
    match mode {
        DisplayMode::SingleShot => format!("Research the following query: {query}"),
        DisplayMode::Conversational => query.to_string(),
    }
}
