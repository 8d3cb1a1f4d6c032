//! Append-only migration journal
//!
//! Entries are stored one JSON object per line (JSONL). Every append is
//! flushed before returning.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{KeystashError, KeystashResult};

use super::entry::AuditEntry;

/// Reads and appends journal entries
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Append one entry
    pub fn log(&self, entry: &AuditEntry) -> KeystashResult<()> {
        self.log_batch(std::slice::from_ref(entry))
    }

    /// Append several entries with a single flush
    pub fn log_batch(&self, entries: &[AuditEntry]) -> KeystashResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.log_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| KeystashError::Io(format!("Failed to create audit directory: {}", e)))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| KeystashError::Io(format!("Failed to open audit log: {}", e)))?;

        for entry in entries {
            let line = serde_json::to_string(entry).map_err(|e| {
                KeystashError::Json(format!("Failed to serialize audit entry: {}", e))
            })?;
            writeln!(file, "{}", line)
                .map_err(|e| KeystashError::Io(format!("Failed to write audit entry: {}", e)))?;
        }

        file.flush()
            .map_err(|e| KeystashError::Io(format!("Failed to flush audit log: {}", e)))
    }

    /// All entries, oldest first
    pub fn read_all(&self) -> KeystashResult<Vec<AuditEntry>> {
        let Some(reader) = self.open_reader()? else {
            return Ok(Vec::new());
        };

        let mut entries = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                KeystashError::Io(format!("Failed to read audit log line {}: {}", index + 1, e))
            })?;
            if line.trim().is_empty() {
                continue;
            }

            let entry = serde_json::from_str(&line).map_err(|e| {
                KeystashError::Json(format!(
                    "Failed to parse audit entry at line {}: {}",
                    index + 1,
                    e
                ))
            })?;
            entries.push(entry);
        }

        Ok(entries)
    }

    /// The last `count` entries
    pub fn read_recent(&self, count: usize) -> KeystashResult<Vec<AuditEntry>> {
        let mut entries = self.read_all()?;
        let start = entries.len().saturating_sub(count);
        Ok(entries.split_off(start))
    }

    /// Entries belonging to one migration run
    pub fn read_run(&self, run_id: Uuid) -> KeystashResult<Vec<AuditEntry>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|entry| entry.run_id == run_id)
            .collect())
    }

    pub fn entry_count(&self) -> KeystashResult<usize> {
        match self.open_reader()? {
            Some(reader) => Ok(reader
                .lines()
                .filter_map(Result::ok)
                .filter(|line| !line.trim().is_empty())
                .count()),
            None => Ok(0),
        }
    }

    pub fn exists(&self) -> bool {
        self.log_path.exists()
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    fn open_reader(&self) -> KeystashResult<Option<BufReader<File>>> {
        if !self.log_path.exists() {
            return Ok(None);
        }

        File::open(&self.log_path)
            .map(|file| Some(BufReader::new(file)))
            .map_err(|e| KeystashError::Io(format!("Failed to open audit log: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::Operation;
    use crate::migration::OutcomeStatus;
    use chrono::Utc;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn create_test_logger() -> (AuditLogger, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("audit.log");
        let logger = AuditLogger::new(log_path);
        (logger, temp_dir)
    }

    fn create_test_entry(backup: &str) -> AuditEntry {
        AuditEntry {
            timestamp: Utc::now(),
            operation: Operation::Migrate,
            run_id: Uuid::new_v4(),
            backup: backup.to_string(),
            from_path: "users/alice-laptop-alice".to_string(),
            to_path: "shared".to_string(),
            status: OutcomeStatus::Migrated,
            dry_run: false,
        }
    }

    #[test]
    fn test_log_and_read() {
        let (logger, _temp) = create_test_logger();
        logger.log(&create_test_entry("daily")).unwrap();

        let entries = logger.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].operation, Operation::Migrate);
        assert_eq!(entries[0].backup, "daily");
    }

    #[test]
    fn test_log_batch() {
        let (logger, _temp) = create_test_logger();
        let entries: Vec<AuditEntry> = ["a", "b", "c"]
            .iter()
            .map(|name| create_test_entry(name))
            .collect();

        logger.log_batch(&entries).unwrap();

        assert_eq!(logger.entry_count().unwrap(), 3);
        assert_eq!(logger.read_all().unwrap(), entries);
    }

    #[test]
    fn test_empty_batch_creates_nothing() {
        let (logger, _temp) = create_test_logger();
        logger.log_batch(&[]).unwrap();
        assert!(!logger.exists());
    }

    #[test]
    fn test_read_recent() {
        let (logger, _temp) = create_test_logger();
        for i in 0..10 {
            logger.log(&create_test_entry(&format!("backup-{}", i))).unwrap();
        }

        let recent = logger.read_recent(3).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].backup, "backup-7");
        assert_eq!(recent[2].backup, "backup-9");
    }

    #[test]
    fn test_empty_log() {
        let (logger, _temp) = create_test_logger();

        assert!(!logger.exists());
        assert_eq!(logger.entry_count().unwrap(), 0);
        assert!(logger.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_read_run_filters() {
        let (logger, _temp) = create_test_logger();
        let first = create_test_entry("daily");
        let mut second = create_test_entry("weekly");
        second.run_id = first.run_id;
        logger.log_batch(&[first.clone(), second, create_test_entry("other")]).unwrap();

        let run = logger.read_run(first.run_id).unwrap();
        assert_eq!(run.len(), 2);
        assert!(run.iter().all(|entry| entry.run_id == first.run_id));
    }

    #[test]
    fn test_survives_restart() {
        let (logger, temp) = create_test_logger();
        logger.log(&create_test_entry("daily")).unwrap();

        let reopened = AuditLogger::new(temp.path().join("audit.log"));
        assert_eq!(reopened.read_all().unwrap().len(), 1);
    }
}
