//! Recovery of structured research records from free-form model output.
//!
//! The model is asked to answer with a fenced JSON [`ResearchRecord`], but
//! nothing guarantees it does. [`extract`] finds and parses the first fenced
//! block, [`should_persist`] checks for a save intent, [`persist`] appends the
//! record to a [`Sink`], and [`TurnHandler`] ties them together without ever
//! failing the caller's turn.

pub mod error;
pub mod extract;
pub mod record;
pub mod sink;
pub mod turn;

use std::fmt;

use tracing::info;

pub use error::{ExtractionError, PersistError};
pub use extract::{extract, find_json_block};
pub use record::ResearchRecord;
pub use sink::{MemorySink, PersistenceEvent, Sink, TextFileSink};
pub use turn::{DisplayMode, DisplayResult, Persistence, TurnHandler};

/// Marker that declares save intent inside `tools_used`.
pub const SAVE_MARKER: &str = "save";

/// Proof that a record reached a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub sink: String,
}

impl fmt::Display for Confirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Data saved to {}", self.sink)
    }
}

/// True iff some `tools_used` entry contains "save", ignoring case.
pub fn should_persist(record: &ResearchRecord) -> bool {
    record
        .tools_used()
        .iter()
        .any(|tool| tool.to_lowercase().contains(SAVE_MARKER))
}

/// Append `record` as a timestamped, pretty-printed entry. Not retried.
pub fn persist(record: &ResearchRecord, sink: &dyn Sink) -> Result<Confirmation, PersistError> {
    let payload = record.to_pretty_json()?;
    let entry = PersistenceEvent::new(payload).render();
    sink.append(&entry).map_err(|source| PersistError::Io {
        sink: sink.name().to_string(),
        source,
    })?;
    info!(
        sink = sink.name(),
        topic = record.topic.as_deref().unwrap_or_default(),
        "research record saved"
    );
    Ok(Confirmation {
        sink: sink.name().to_string(),
    })
}
