use serde::{Serialize, Deserialize};
use serde_json::{Map, Value};

/// The structured answer the model is asked to produce.
///
/// Every field is optional: a record missing fields is still a record, it is
/// just not [complete](ResearchRecord::is_complete). Keys outside the schema
/// are kept in `extra` so persisting a record writes back what the model said.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResearchRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools_used: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResearchRecord {
    pub fn new(
        topic: impl Into<String>,
        summary: impl Into<String>,
        sources: Vec<String>,
        tools_used: Vec<String>,
    ) -> Self {
        Self {
            topic: Some(topic.into()),
            summary: Some(summary.into()),
            sources: Some(sources),
            tools_used: Some(tools_used),
            extra: Map::new(),
        }
    }

    /// All four schema fields are present.
    pub fn is_complete(&self) -> bool {
        self.topic.is_some()
            && self.summary.is_some()
            && self.sources.is_some()
            && self.tools_used.is_some()
    }

    pub fn tools_used(&self) -> &[String] {
        self.tools_used.as_deref().unwrap_or_default()
    }

    /// Two-space indented JSON.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
