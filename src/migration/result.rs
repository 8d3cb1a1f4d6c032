//! Result types for validation, migration and cleanup

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::KeystashError;
use crate::layout::Strategy;

/// Stage of one migration operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationPhase {
    Created,
    Listed,
    Validated,
    DryRun,
    Migrating,
    Completed,
}

impl fmt::Display for MigrationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MigrationPhase::Created => "created",
            MigrationPhase::Listed => "listed",
            MigrationPhase::Validated => "validated",
            MigrationPhase::DryRun => "dry-run",
            MigrationPhase::Migrating => "migrating",
            MigrationPhase::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Outcome of pre-flight checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub benefits: Vec<String>,
    /// Names present at both source and destination
    pub conflicts: Vec<String>,
    pub source_backup_count: usize,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            benefits: Vec::new(),
            conflicts: Vec::new(),
            source_backup_count: 0,
        }
    }
}

impl ValidationResult {
    /// Record a blocking problem
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(message.into());
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// What happened to one backup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Migrated,
    WouldMigrate,
    Deleted,
    WouldDelete,
    Failed { reason: String },
}

impl OutcomeStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, OutcomeStatus::Failed { .. })
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeStatus::Migrated => write!(f, "migrated"),
            OutcomeStatus::WouldMigrate => write!(f, "would migrate"),
            OutcomeStatus::Deleted => write!(f, "deleted"),
            OutcomeStatus::WouldDelete => write!(f, "would delete"),
            OutcomeStatus::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// Per-backup result entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupOutcome {
    pub name: String,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl BackupOutcome {
    pub fn new(name: impl Into<String>, status: OutcomeStatus) -> Self {
        Self {
            name: name.into(),
            status,
        }
    }

    pub fn failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            name,
            OutcomeStatus::Failed {
                reason: reason.into(),
            },
        )
    }
}

/// Summary of one batch migration
///
/// `migrated_backups` and `failed_backups` partition the names listed at
/// the start of the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationResult {
    pub run_id: Uuid,
    pub from_strategy: Strategy,
    pub to_strategy: Strategy,
    pub from_path: String,
    pub to_path: String,
    pub total_backups: usize,
    pub migrated_backups: Vec<String>,
    pub failed_backups: Vec<String>,
    pub outcomes: Vec<BackupOutcome>,
    pub dry_run: bool,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_ms: i64,
}

impl MigrationResult {
    pub(crate) fn start(
        from_strategy: Strategy,
        to_strategy: Strategy,
        from_path: &str,
        to_path: &str,
        total_backups: usize,
        dry_run: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::new_v4(),
            from_strategy,
            to_strategy,
            from_path: from_path.to_string(),
            to_path: to_path.to_string(),
            total_backups,
            migrated_backups: Vec::new(),
            failed_backups: Vec::new(),
            outcomes: Vec::with_capacity(total_backups),
            dry_run,
            start_time: now,
            end_time: now,
            duration_ms: 0,
        }
    }

    /// Add one backup's outcome
    pub(crate) fn record(&mut self, outcome: BackupOutcome) {
        if outcome.status.is_failure() {
            self.failed_backups.push(outcome.name.clone());
        } else {
            self.migrated_backups.push(outcome.name.clone());
        }
        self.outcomes.push(outcome);
    }

    pub(crate) fn finish(&mut self) {
        self.end_time = Utc::now();
        self.duration_ms = (self.end_time - self.start_time).num_milliseconds();
    }

    pub fn duration(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.duration_ms)
    }

    pub fn has_failures(&self) -> bool {
        !self.failed_backups.is_empty()
    }

    /// A `PartialFailure` error if any backup failed
    pub fn partial_failure(&self) -> Option<KeystashError> {
        self.has_failures().then(|| KeystashError::PartialFailure {
            failed: self.failed_backups.len(),
            total: self.total_backups,
        })
    }
}

/// Summary of a cleanup pass over the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupReport {
    pub base_path: String,
    pub dry_run: bool,
    pub outcomes: Vec<BackupOutcome>,
    /// Deleted names still visible in the source listing after all retries
    pub unconfirmed: Vec<String>,
}

impl CleanupReport {
    pub fn deleted(&self) -> Vec<&str> {
        self.names_where(|status| matches!(status, OutcomeStatus::Deleted))
    }

    pub fn failed(&self) -> Vec<&str> {
        self.names_where(OutcomeStatus::is_failure)
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|o| o.status.is_failure())
    }

    fn names_where(&self, predicate: impl Fn(&OutcomeStatus) -> bool) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| predicate(&o.status))
            .map(|o| o.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_invalidates() {
        let mut result = ValidationResult::default();
        assert!(result.valid);
        result.add_warning("heads up");
        assert!(result.valid);
        result.add_error("same path");
        assert!(!result.valid);
        assert_eq!(result.errors, vec!["same path".to_string()]);
    }

    #[test]
    fn test_result_partitions_outcomes() {
        let mut result = MigrationResult::start(
            Strategy::MachineUser,
            Strategy::Universal,
            "users/h-u",
            "shared",
            3,
            false,
        );
        result.record(BackupOutcome::new("a", OutcomeStatus::Migrated));
        result.record(BackupOutcome::failed("b", "boom"));
        result.record(BackupOutcome::new("c", OutcomeStatus::Migrated));
        result.finish();

        assert_eq!(result.migrated_backups, vec!["a", "c"]);
        assert_eq!(result.failed_backups, vec!["b"]);
        assert!(result.duration_ms >= 0);
        assert!(matches!(
            result.partial_failure(),
            Some(KeystashError::PartialFailure { failed: 1, total: 3 })
        ));
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(BackupOutcome::failed("daily", "timed out")).unwrap();
        assert_eq!(json["name"], "daily");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "timed out");

        let json = serde_json::to_value(BackupOutcome::new("daily", OutcomeStatus::WouldMigrate))
            .unwrap();
        assert_eq!(json["status"], "would_migrate");
    }

    #[test]
    fn test_cleanup_report_views() {
        let report = CleanupReport {
            base_path: "users/h-u".into(),
            dry_run: false,
            outcomes: vec![
                BackupOutcome::new("a", OutcomeStatus::Deleted),
                BackupOutcome::failed("b", "denied"),
            ],
            unconfirmed: Vec::new(),
        };
        assert_eq!(report.deleted(), vec!["a"]);
        assert_eq!(report.failed(), vec!["b"]);
        assert!(report.has_failures());
    }
}
