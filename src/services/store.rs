use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

use crate::models::MatchRecord;

/// Errors that can occur reading or writing the match record
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot read match record {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write match record {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("match record store unavailable: {0}")]
    Unavailable(String),
}

/// Stable storage for the members matched this period
pub trait RecordStore {
    /// Whether a record has ever been written
    fn exists(&self) -> Result<bool, StoreError>;

    /// Current record, empty when nothing was saved yet
    fn load(&self) -> Result<MatchRecord, StoreError>;

    /// Replace the stored record
    fn save(&self, record: &MatchRecord) -> Result<(), StoreError>;
}

/// Plain text record, one member id per line
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    path: PathBuf,
}

impl FileRecordStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn write_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl RecordStore for FileRecordStore {
    fn exists(&self) -> Result<bool, StoreError> {
        self.path.try_exists().map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })
    }

    fn load(&self) -> Result<MatchRecord, StoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(MatchRecord::new()),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    fn save(&self, record: &MatchRecord) -> Result<(), StoreError> {
        let mut file = std::fs::File::create(&self.path).map_err(|e| self.write_error(e))?;
        for member in record.iter() {
            writeln!(file, "{}", member).map_err(|e| self.write_error(e))?;
        }
        file.flush().map_err(|e| self.write_error(e))?;

        tracing::debug!("Saved {} matched members to {}", record.len(), self.path.display());
        Ok(())
    }
}

/// Record store double kept in memory
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    record: Mutex<Option<MatchRecord>>,
    saves: Mutex<usize>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that already holds `record`
    pub fn with_record(record: MatchRecord) -> Self {
        Self {
            record: Mutex::new(Some(record)),
            saves: Mutex::new(0),
        }
    }

    /// Snapshot of the stored record, if any
    pub fn snapshot(&self) -> Option<MatchRecord> {
        self.record.lock().ok().and_then(|record| record.clone())
    }

    /// Number of times `save` was called
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|saves| *saves).unwrap_or_default()
    }
}

impl RecordStore for MemoryRecordStore {
    fn exists(&self) -> Result<bool, StoreError> {
        Ok(self.snapshot().is_some())
    }

    fn load(&self) -> Result<MatchRecord, StoreError> {
        Ok(self.snapshot().unwrap_or_default())
    }

    fn save(&self, record: &MatchRecord) -> Result<(), StoreError> {
        let mut stored = self
            .record
            .lock()
            .map_err(|_| StoreError::Unavailable("record lock poisoned".to_string()))?;
        *stored = Some(record.clone());

        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Couple;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRecordStore::new(dir.path().join("hadcoffee"));

        assert!(!store.exists().unwrap());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load_one_id_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hadcoffee");
        let store = FileRecordStore::new(&path);

        let mut record = MatchRecord::new();
        record.record(&Couple::new("U2", "U1"));
        store.save(&record).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "U2\nU1\n");
        assert!(store.exists().unwrap());
        assert_eq!(store.load().unwrap(), record);
    }

    #[test]
    fn test_save_truncates_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hadcoffee");
        std::fs::write(&path, "old1\nold2\nold3\n").unwrap();

        let store = FileRecordStore::new(&path);
        store.save(&MatchRecord::new()).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
        assert!(store.exists().unwrap());
    }

    #[test]
    fn test_load_ignores_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hadcoffee");
        std::fs::write(&path, "a\n\n  b  \n").unwrap();

        let record = FileRecordStore::new(&path).load().unwrap();
        assert_eq!(record.len(), 2);
        assert!(record.contains("b"));
    }

    #[test]
    fn test_unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRecordStore::new(dir.path().join("missing").join("hadcoffee"));
        assert!(matches!(
            store.save(&MatchRecord::new()),
            Err(StoreError::Write { .. })
        ));
    }

    #[test]
    fn test_memory_store_counts_saves() {
        let store = MemoryRecordStore::new();
        assert!(!store.exists().unwrap());

        store.save(&MatchRecord::new()).unwrap();
        assert!(store.exists().unwrap());
        assert_eq!(store.save_count(), 1);
    }
}
