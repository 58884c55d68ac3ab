use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Local};

pub const ENTRY_HEADER: &str = "----------Research Output----------";
pub const ENTRY_FOOTER: &str = "-------------------------------";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append-only text destination for persisted research.
///
/// `append` receives a complete entry and must write it in one piece; entries
/// from concurrent callers never interleave.
pub trait Sink: Send + Sync {
    /// Human-readable name used in confirmations, e.g. the file path.
    fn name(&self) -> &str;
    fn append(&self, entry: &str) -> io::Result<()>;
}

/// A payload stamped with the time it was written.
#[derive(Debug, Clone)]
pub struct PersistenceEvent {
    pub payload: String,
    pub timestamp: DateTime<Local>,
}

impl PersistenceEvent {
    pub fn new(payload: impl Into<String>) -> Self {
        Self::at(payload, Local::now())
    }

    pub fn at(payload: impl Into<String>, timestamp: DateTime<Local>) -> Self {
        Self {
            payload: payload.into(),
            timestamp,
        }
    }

    /// The framed entry as it appears in the output file.
    pub fn render(&self) -> String {
        format!(
            "{ENTRY_HEADER}\nTimestamp: {}\n{}\n{ENTRY_FOOTER}\n",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.payload
        )
    }
}

/// UTF-8 text file opened in append mode for every entry.
#[derive(Debug)]
pub struct TextFileSink {
    path: PathBuf,
    name: String,
    lock: Mutex<()>,
}

impl TextFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: path.display().to_string(),
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for TextFileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn append(&self, entry: &str) -> io::Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(entry.as_bytes())?;
        file.flush()
    }
}

/// In-memory sink, handy for embedding and tests.
#[derive(Debug)]
pub struct MemorySink {
    name: String,
    entries: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::named("memory")
    }
}

impl Sink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    fn append(&self, entry: &str) -> io::Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;

    #[test]
    fn renders_framed_entry() {
        let ts = Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let entry = PersistenceEvent::at("{\n  \"topic\": \"x\"\n}", ts).render();
        assert_eq!(
            entry,
            "----------Research Output----------\nTimestamp: 2025-01-02 03:04:05\n{\n  \"topic\": \"x\"\n}\n-------------------------------\n"
        );
    }

    #[test]
    fn file_sink_appends_without_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("research_output.txt");
        std::fs::write(&path, "existing\n").unwrap();

        let sink = TextFileSink::new(&path);
        sink.append("one\n").unwrap();
        sink.append("two\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "existing\none\ntwo\n");
        assert_eq!(sink.name(), path.display().to_string());
    }

    #[test]
    fn concurrent_appends_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(TextFileSink::new(dir.path().join("out.txt")));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let sink = sink.clone();
                std::thread::spawn(move || {
                    let payload = format!("payload-{i}\n{}", "x".repeat(4096));
                    let entry = PersistenceEvent::new(payload).render();
                    sink.append(&entry).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let contents = std::fs::read_to_string(sink.path()).unwrap();
        let entries: Vec<&str> = contents.split_inclusive(&format!("{ENTRY_FOOTER}\n")).collect();
        assert_eq!(entries.len(), 8);
        for entry in entries {
            assert!(entry.starts_with(ENTRY_HEADER));
        }
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = TextFileSink::new(dir.path().join("missing").join("out.txt"));
        assert!(sink.append("x").is_err());
    }
}
