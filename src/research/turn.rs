use std::sync::Arc;

use serde::{Serialize, Deserialize};
use tracing::{debug, warn};

use super::error::ExtractionError;
use super::record::ResearchRecord;
use super::sink::Sink;
use super::{extract, persist, should_persist, Confirmation};

/// How a recovered record is shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// REPL: show only the summary.
    #[default]
    Conversational,
    /// One query: show the raw output followed by the parsed record.
    SingleShot,
}

/// What happened to the record's save intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    /// No record, or the record did not ask to be saved.
    NotRequested,
    Saved(Confirmation),
    Failed(String),
}

/// Outcome of one turn: the text to show plus side-channel information.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayResult {
    pub display: String,
    pub record: Option<ResearchRecord>,
    pub extraction_error: Option<ExtractionError>,
    pub persistence: Persistence,
}

impl DisplayResult {
    /// Informational lines to print after `display`.
    pub fn notices(&self, mode: DisplayMode) -> Vec<String> {
        match &self.persistence {
            Persistence::Saved(confirmation) => vec![confirmation.to_string()],
            Persistence::Failed(reason) => {
                vec![format!("Could not save research output: {reason}")]
            }
            Persistence::NotRequested
                if mode == DisplayMode::SingleShot && self.record.is_some() =>
            {
                vec!["No save tool requested — skipping file write.".to_string()]
            }
            Persistence::NotRequested => Vec::new(),
        }
    }
}

/// Post-processes each model reply. Holds no state besides the sink.
pub struct TurnHandler {
    sink: Arc<dyn Sink>,
    mode: DisplayMode,
}

impl TurnHandler {
    pub fn new(sink: Arc<dyn Sink>, mode: DisplayMode) -> Self {
        Self { sink, mode }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn sink(&self) -> &Arc<dyn Sink> {
        &self.sink
    }

    /// Extract, maybe persist, and pick the display text for `raw_text`.
    ///
    /// Never fails: extraction problems fall back to showing `raw_text`
    /// verbatim and persistence problems become a `Persistence::Failed`.
    pub fn handle_turn(&self, raw_text: &str) -> DisplayResult {
        let record = match extract(raw_text) {
            Ok(record) => record,
            Err(err) => {
                match &err {
                    ExtractionError::NoBlockFound => debug!("no JSON block in model output"),
                    ExtractionError::MalformedJson(details) => {
                        warn!(%details, "model output has a malformed JSON block")
                    }
                }
                return DisplayResult {
                    display: raw_text.to_string(),
                    record: None,
                    extraction_error: Some(err),
                    persistence: Persistence::NotRequested,
                };
            }
        };

        if !record.is_complete() {
            debug!("recovered a partial research record");
        }

        let persistence = if should_persist(&record) {
            match persist(&record, self.sink.as_ref()) {
                Ok(confirmation) => Persistence::Saved(confirmation),
                Err(err) => {
                    warn!(error = %err, "failed to persist research record");
                    Persistence::Failed(err.to_string())
                }
            }
        } else {
            Persistence::NotRequested
        };

        DisplayResult {
            display: self.render(raw_text, &record),
            record: Some(record),
            extraction_error: None,
            persistence,
        }
    }

    fn render(&self, raw_text: &str, record: &ResearchRecord) -> String {
        match self.mode {
            DisplayMode::Conversational => record
                .summary
                .clone()
                .unwrap_or_else(|| raw_text.to_string()),
            DisplayMode::SingleShot => match record.to_pretty_json() {
                Ok(pretty) => format!("{raw_text}\n\nParsed JSON:\n{pretty}"),
                Err(err) => {
                    warn!(error = %err, "failed to render research record");
                    raw_text.to_string()
                }
            },
        }
    }
}
