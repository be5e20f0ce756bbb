//! CSV-backed answer history.
//!
//! Every append reads the whole file, adds one row and rewrites the file.
//! The rewrite goes to a temporary file in the same directory which is then
//! renamed over the original, so readers never see a half-written store.
//! Appends from any number of tasks are serialized by an internal mutex.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

use super::record::{AnswerRecord, HEADERS};

// ---------------------------------------------------------------------------
// HistoryError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history file I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("history file is not valid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Header row differs from `Timestamp,Question,Answer,Tone`.
    #[error("unexpected history columns: {found}")]
    Columns { found: String },

    #[error("failed to replace history file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

// ---------------------------------------------------------------------------
// HistoryStore
// ---------------------------------------------------------------------------

pub struct HistoryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl HistoryStore {
    /// Bind to `path`.  Nothing is touched on disk until the first call.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// All records in insertion order, or `None` when no store exists yet
    /// or the file holds no rows.
    pub fn load(&self) -> Result<Option<Vec<AnswerRecord>>, HistoryError> {
        if !self.exists() {
            return Ok(None);
        }
        let records = read_records(&self.path)?;
        Ok((!records.is_empty()).then_some(records))
    }

    /// Append `record` and rewrite the store.  Returns the new row count.
    pub fn append(&self, record: AnswerRecord) -> Result<usize, HistoryError> {
        // The guarded value is `()`, so a poisoned lock carries no broken state.
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut records = self.load()?.unwrap_or_default();
        records.push(record);
        self.write_all(&records)?;

        log::debug!(
            "history: wrote {} records to {}",
            records.len(),
            self.path.display()
        );
        Ok(records.len())
    }

    fn write_all(&self, records: &[AnswerRecord]) -> Result<(), HistoryError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|source| HistoryError::Io {
            path: dir.clone(),
            source,
        })?;

        let tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|source| HistoryError::Io {
            path: dir.clone(),
            source,
        })?;

        let mut writer = csv::Writer::from_writer(tmp);
        for record in records {
            writer.serialize(record)?;
        }
        let tmp = writer
            .into_inner()
            .map_err(|e| HistoryError::Io {
                path: self.path.clone(),
                source: std::io::Error::new(e.error().kind(), e.error().to_string()),
            })?;

        tmp.persist(&self.path)?;
        Ok(())
    }
}

fn read_records(path: &Path) -> Result<Vec<AnswerRecord>, HistoryError> {
    let mut reader = csv::Reader::from_path(path)?;

    let headers = reader.headers()?.clone();
    // A zero-byte file (e.g. truncated by another program) holds no rows.
    if headers.is_empty() {
        return Ok(Vec::new());
    }
    if headers.iter().ne(HEADERS.iter().copied()) {
        return Err(HistoryError::Columns {
            found: headers.iter().collect::<Vec<_>>().join(","),
        });
    }

    reader
        .deserialize::<AnswerRecord>()
        .map(|row| row.map_err(HistoryError::from))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Tone;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn record(question: &str) -> AnswerRecord {
        AnswerRecord {
            timestamp: "2024-03-23 10:15:00".into(),
            question: question.into(),
            answer: format!("answer to {question}"),
            tone: "Formal".into(),
        }
    }

    #[test]
    fn missing_store_loads_as_none() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join("chat_history.csv"));
        assert!(!store.exists());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn single_append_creates_store_with_four_columns() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join("chat_history.csv"));

        let rec = AnswerRecord::now("What is K2?", "A mountain.", Tone::Friendly);
        assert_eq!(store.append(rec.clone()).unwrap(), 1);

        let text = std::fs::read_to_string(store.path()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Timestamp,Question,Answer,Tone"));

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, vec![rec]);
        assert_eq!(loaded[0].tone, "Friendly");
    }

    #[test]
    fn sequential_appends_keep_order() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join("chat_history.csv"));

        for i in 0..5 {
            assert_eq!(store.append(record(&format!("q{i}"))).unwrap(), i + 1);
        }

        let questions: Vec<String> = store
            .load()
            .unwrap()
            .unwrap()
            .into_iter()
            .map(|r| r.question)
            .collect();
        assert_eq!(questions, ["q0", "q1", "q2", "q3", "q4"]);
    }

    #[test]
    fn fields_with_commas_quotes_and_newlines_survive() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join("chat_history.csv"));

        let mut rec = record("Lahore, Karachi?");
        rec.answer = "Two \"big\" cities.\n* Lahore\n* Karachi".into();
        store.append(rec.clone()).unwrap();

        assert_eq!(store.load().unwrap().unwrap(), vec![rec]);
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join("nested/deeper/chat_history.csv"));
        store.append(record("q")).unwrap();
        assert!(store.exists());
    }

    #[test]
    fn concurrent_appends_lose_nothing() {
        let dir = tempdir().unwrap();
        let store = Arc::new(HistoryStore::open(dir.path().join("chat_history.csv")));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.append(record(&format!("t{i}"))).unwrap())
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.load().unwrap().unwrap().len(), 8);
    }

    #[test]
    fn wrong_header_is_a_column_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat_history.csv");
        std::fs::write(&path, "When,Q,A\n2024-01-01 00:00:00,q,a\n").unwrap();

        let store = HistoryStore::open(&path);
        assert!(matches!(store.load(), Err(HistoryError::Columns { .. })));
        assert!(store.append(record("q")).is_err());
    }

    #[test]
    fn empty_file_is_an_empty_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat_history.csv");
        std::fs::write(&path, "").unwrap();

        let store = HistoryStore::open(&path);
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(store.append(record("q")).unwrap(), 1);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Timestamp,Question,Answer,Tone\n"), "{text}");
        assert_eq!(store.load().unwrap().unwrap(), vec![record("q")]);
    }

    #[test]
    fn directory_in_place_of_file_fails() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path());
        assert!(store.append(record("q")).is_err());
    }
}
