/// Why a structured record could not be recovered from model output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("No JSON block found")]
    NoBlockFound,

    #[error("Malformed JSON: {0}")]
    MalformedJson(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write to {sink}: {source}")]
    Io {
        sink: String,
        #[source]
        source: std::io::Error,
    },
}
