//! Audit store that appends one JSON record per line to a file.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

use super::{AuditError, AuditFilter, AuditRecord, AuditStore};

/// File-backed audit store.
///
/// Records are only ever appended. IDs continue from the number of lines
/// already present when the store is opened.
pub struct JsonlAuditStore {
    path: PathBuf,
    inner: Mutex<Inner>,
}

struct Inner {
    file: File,
    next_id: i64,
}

impl JsonlAuditStore {
    /// Open (or create) the log file, creating parent directories if needed
    pub fn new(path: &Path) -> Result<Self, AuditError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| AuditError::Io(e.to_string()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(path)
            .map_err(|e| AuditError::Io(e.to_string()))?;

        let existing = BufReader::new(
            File::open(path).map_err(|e| AuditError::Io(e.to_string()))?,
        )
        .lines()
        .map_while(Result::ok)
        .filter(|line| !line.trim().is_empty())
        .count() as i64;

        Ok(Self {
            path: path.to_path_buf(),
            inner: Mutex::new(Inner {
                file,
                next_id: existing + 1,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record that passes the filter, newest first.
    fn read_matching(&self, filter: &AuditFilter) -> Result<Vec<AuditRecord>, AuditError> {
        // Hold the lock so a concurrent append can't be read half-written.
        let _guard = self
            .inner
            .lock()
            .map_err(|_| AuditError::Io("audit log lock poisoned".to_string()))?;

        let file = File::open(&self.path).map_err(|e| AuditError::Io(e.to_string()))?;
        let mut records = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| AuditError::Io(e.to_string()))?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AuditRecord>(&line) {
                Ok(record) if filter.matches(&record) => records.push(record),
                Ok(_) => {}
                Err(e) => warn!("Skipping malformed audit line {}: {}", index + 1, e),
            }
        }

        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(records)
    }
}

impl AuditStore for JsonlAuditStore {
    fn insert(&self, record: &AuditRecord) -> Result<i64, AuditError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| AuditError::Io("audit log lock poisoned".to_string()))?;

        let id = inner.next_id;
        let mut stored = record.clone();
        stored.id = id;

        let mut line =
            serde_json::to_string(&stored).map_err(|e| AuditError::Serialization(e.to_string()))?;
        line.push('\n');

        inner
            .file
            .write_all(line.as_bytes())
            .map_err(|e| AuditError::Io(e.to_string()))?;
        inner
            .file
            .flush()
            .map_err(|e| AuditError::Io(e.to_string()))?;

        inner.next_id += 1;
        Ok(id)
    }

    fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditRecord>, AuditError> {
        let records = self.read_matching(filter)?;
        Ok(records
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect())
    }

    fn count(&self, filter: &AuditFilter) -> Result<i64, AuditError> {
        Ok(self.read_matching(filter)?.len() as i64)
    }
}
