//! `save_to_txt_file`: lets the model write research data to the output file.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use super::error::ToolError;
use super::traits::{string_arg, ArgSchema, Tool};
use crate::research::sink::{PersistenceEvent, Sink};

pub const TOOL_NAME: &str = "save_to_txt_file";

pub struct SaveToTxt {
    sink: Arc<dyn Sink>,
}

impl SaveToTxt {
    pub fn new(sink: Arc<dyn Sink>) -> Self {
        Self { sink }
    }
}

#[async_trait::async_trait]
impl Tool for SaveToTxt {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Saves structured research data to a text file."
    }

    fn args(&self) -> Vec<ArgSchema> {
        vec![ArgSchema::required("data", "string", "The research data to save")]
    }

    async fn run(&self, input: Value) -> Result<String, ToolError> {
        let data = string_arg(TOOL_NAME, &input, "data")?;
        let entry = PersistenceEvent::new(data).render();
        self.sink
            .append(&entry)
            .map_err(|e| ToolError::execution(TOOL_NAME, e))?;
        info!(sink = self.sink.name(), "model saved research data");
        Ok(format!("Data saved to {}", self.sink.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::sink::MemorySink;
    use serde_json::json;

    #[tokio::test]
    async fn appends_framed_entry() {
        let sink = Arc::new(MemorySink::named("notes.txt"));
        let tool = SaveToTxt::new(sink.clone());

        let out = tool.run(json!({ "data": "quantum notes" })).await.unwrap();

        assert_eq!(out, "Data saved to notes.txt");
        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].starts_with("----------Research Output----------\nTimestamp: "));
        assert!(entries[0].ends_with("quantum notes\n-------------------------------\n"));
    }

    #[test]
    fn missing_data_is_a_parameter_error() {
        let tool = SaveToTxt::new(Arc::new(MemorySink::default()));
        let err = tokio_test::block_on(tool.run(json!({ "text": "x" }))).unwrap_err();
        assert!(matches!(err, ToolError::ParamsNotMatched(_)));
    }
}
