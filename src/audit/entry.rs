//! Audit entry data structures
//!
//! Defines the operation types recorded in the journal and the entry format
//! itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::migration::{BackupOutcome, CleanupReport, MigrationResult, OutcomeStatus};

/// Types of operations that are journaled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// A backup was copied to a new base path
    Migrate,
    /// A source backup was removed after migration
    Cleanup,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Migrate => write!(f, "MIGRATE"),
            Operation::Cleanup => write!(f, "CLEANUP"),
        }
    }
}

/// A single journal entry, one per backup per operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the entry was written (UTC)
    pub timestamp: DateTime<Utc>,

    pub operation: Operation,

    /// Migration run the entry belongs to
    pub run_id: Uuid,

    /// Backup name
    pub backup: String,

    pub from_path: String,

    pub to_path: String,

    /// Outcome for this backup
    #[serde(flatten)]
    pub status: OutcomeStatus,

    #[serde(default)]
    pub dry_run: bool,
}

impl AuditEntry {
    fn new(
        operation: Operation,
        run_id: Uuid,
        outcome: &BackupOutcome,
        from_path: &str,
        to_path: &str,
        dry_run: bool,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            run_id,
            backup: outcome.name.clone(),
            from_path: from_path.to_string(),
            to_path: to_path.to_string(),
            status: outcome.status.clone(),
            dry_run,
        }
    }

    /// One entry per backup in a migration run
    pub fn from_migration(result: &MigrationResult) -> Vec<Self> {
        result
            .outcomes
            .iter()
            .map(|outcome| {
                Self::new(
                    Operation::Migrate,
                    result.run_id,
                    outcome,
                    &result.from_path,
                    &result.to_path,
                    result.dry_run,
                )
            })
            .collect()
    }

    /// One entry per backup in a cleanup pass that followed `result`
    pub fn from_cleanup(result: &MigrationResult, report: &CleanupReport) -> Vec<Self> {
        report
            .outcomes
            .iter()
            .map(|outcome| {
                Self::new(
                    Operation::Cleanup,
                    result.run_id,
                    outcome,
                    &report.base_path,
                    &result.to_path,
                    report.dry_run,
                )
            })
            .collect()
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {} -> {} ({})",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.backup,
            self.from_path,
            self.to_path,
            self.status
        );

        if self.dry_run {
            output.push_str(" [dry run]");
        }

        output
    }
}
