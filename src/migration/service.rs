//! Migration service
//!
//! Moves a backup set from one base path to another. Each backup is copied
//! independently; one failing record never stops the rest of the batch.
//! Removing the source copies is a separate step the caller must ask for.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::advisor::{get_migration_info, MigrationInfo};
use super::result::{
    BackupOutcome, CleanupReport, MigrationPhase, MigrationResult, OutcomeStatus,
    ValidationResult,
};
use super::retry::{retry_until, RetryPolicy, Sleeper, TokioSleeper};
use crate::error::{KeystashError, KeystashResult};
use crate::layout::{IdentityProvider, PathGenerator, Strategy};
use crate::storage::StorageProvider;

/// Deadline applied to every storage call unless overridden
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Metadata key holding the latest provenance block
pub const PROVENANCE_KEY: &str = "migration";

/// Metadata key holding earlier provenance blocks
pub const PROVENANCE_HISTORY_KEY: &str = "migration_history";

/// Where and when a record was migrated
#[derive(Debug, Clone, Serialize)]
struct Provenance<'a> {
    from_strategy: Strategy,
    to_strategy: Strategy,
    from_path: &'a str,
    to_path: &'a str,
    migrated_at: chrono::DateTime<Utc>,
}

/// Moves backups between two base paths
pub struct MigrationService {
    from_strategy: Strategy,
    to_strategy: Strategy,
    from_path: String,
    to_path: String,
    provider: Arc<dyn StorageProvider>,
    timeout: Duration,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    phase: Mutex<MigrationPhase>,
}

impl MigrationService {
    /// Create a service for already-computed base paths
    pub fn new(
        provider: Arc<dyn StorageProvider>,
        from_strategy: Strategy,
        to_strategy: Strategy,
        from_path: impl Into<String>,
        to_path: impl Into<String>,
    ) -> Self {
        Self {
            from_strategy,
            to_strategy,
            from_path: from_path.into(),
            to_path: to_path.into(),
            provider,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
            phase: Mutex::new(MigrationPhase::Created),
        }
    }

    /// Create a service by generating both base paths
    ///
    /// Source and destination take separate identities so that a layout
    /// written by another machine or user can be addressed.
    pub fn from_generators(
        provider: Arc<dyn StorageProvider>,
        from: &PathGenerator,
        from_identity: &dyn IdentityProvider,
        to: &PathGenerator,
        to_identity: &dyn IdentityProvider,
    ) -> KeystashResult<Self> {
        let from_path = from.generate_base_path(from_identity)?;
        let to_path = to.generate_base_path(to_identity)?;
        Ok(Self::new(
            provider,
            from.strategy(),
            to.strategy(),
            from_path,
            to_path,
        ))
    }

    /// Set the deadline for each storage call
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set how deletions are confirmed against the listing
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn from_strategy(&self) -> Strategy {
        self.from_strategy
    }

    pub fn to_strategy(&self) -> Strategy {
        self.to_strategy
    }

    pub fn from_path(&self) -> &str {
        &self.from_path
    }

    pub fn to_path(&self) -> &str {
        &self.to_path
    }

    pub fn phase(&self) -> MigrationPhase {
        self.phase
            .lock()
            .map(|phase| *phase)
            .unwrap_or(MigrationPhase::Created)
    }

    fn set_phase(&self, next: MigrationPhase) {
        if let Ok(mut phase) = self.phase.lock() {
            let current = *phase;
            if current != next {
                debug!(from = %current, to = %next, "migration phase change");
                *phase = next;
            }
        }
    }

    /// Run a storage call under the configured deadline
    async fn call<T, F>(&self, operation: &str, fut: F) -> KeystashResult<T>
    where
        F: Future<Output = KeystashResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(KeystashError::timeout(operation, self.timeout)),
        }
    }

    /// Advice for this service's strategy pair
    pub fn migration_info(&self) -> MigrationInfo {
        get_migration_info(
            self.from_strategy,
            self.to_strategy,
            &self.from_path,
            &self.to_path,
        )
    }

    /// Names of all backups under the source path
    pub async fn list_backups_to_migrate(&self) -> KeystashResult<Vec<String>> {
        let names = self
            .call("list_backups", self.provider.list_backups(&self.from_path))
            .await?;
        self.set_phase(MigrationPhase::Listed);
        debug!(path = %self.from_path, count = names.len(), "listed source backups");
        Ok(names)
    }

    /// Pre-flight checks before any data moves
    ///
    /// Returns `valid = false` for a self-migration or an empty source.
    /// Names already present at the destination are reported as a warning
    /// since they will be overwritten. Failing to list either side is an error.
    pub async fn validate_migration(&self) -> KeystashResult<ValidationResult> {
        let mut result = ValidationResult::default();

        if self.from_path == self.to_path {
            result.add_error(format!(
                "Source and destination paths are the same ('{}'); nothing to migrate",
                self.from_path
            ));
            return Ok(result);
        }

        let source = self.list_backups_to_migrate().await?;
        result.source_backup_count = source.len();

        if source.is_empty() {
            result.add_error(format!("No backups found at source path '{}'", self.from_path));
            return Ok(result);
        }

        let destination: BTreeSet<String> = self
            .call("list_backups", self.provider.list_backups(&self.to_path))
            .await?
            .into_iter()
            .collect();

        result.conflicts = source
            .iter()
            .filter(|name| destination.contains(*name))
            .cloned()
            .collect();

        if !result.conflicts.is_empty() {
            result.add_warning(format!(
                "{} backup(s) already exist at '{}' and will be overwritten: {}",
                result.conflicts.len(),
                self.to_path,
                result.conflicts.join(", ")
            ));
        }

        let info = self.migration_info();
        result.warnings.extend(info.risks);
        result.benefits.extend(info.benefits);

        self.set_phase(MigrationPhase::Validated);
        Ok(result)
    }

    /// Copy one backup to the destination, annotating its provenance
    ///
    /// Overwrites any record of the same name, so retrying is safe.
    pub async fn migrate_backup(&self, name: &str) -> KeystashResult<()> {
        let mut record = self
            .call("get_backup", self.provider.get_backup(&self.from_path, name))
            .await?;

        let provenance = Provenance {
            from_strategy: self.from_strategy,
            to_strategy: self.to_strategy,
            from_path: &self.from_path,
            to_path: &self.to_path,
            migrated_at: Utc::now(),
        };
        annotate_provenance(&mut record.metadata, serde_json::to_value(&provenance)?);

        self.call(
            "store_backup",
            self.provider.store_backup(&self.to_path, name, &record),
        )
        .await
    }

    /// Migrate every backup under the source path
    ///
    /// With `dry_run` nothing is read or written; every listed name is
    /// reported as "would migrate". Otherwise each backup is migrated on its
    /// own and failures are recorded without stopping the loop.
    pub async fn migrate_all_backups(&self, dry_run: bool) -> KeystashResult<MigrationResult> {
        if self.from_path == self.to_path {
            return Err(KeystashError::Validation(format!(
                "Refusing to migrate '{}' onto itself",
                self.from_path
            )));
        }

        let names = self.list_backups_to_migrate().await?;
        let mut result = MigrationResult::start(
            self.from_strategy,
            self.to_strategy,
            &self.from_path,
            &self.to_path,
            names.len(),
            dry_run,
        );

        self.set_phase(if dry_run {
            MigrationPhase::DryRun
        } else {
            MigrationPhase::Migrating
        });
        info!(
            run_id = %result.run_id,
            from = %self.from_path,
            to = %self.to_path,
            total = names.len(),
            dry_run,
            "starting migration"
        );

        for name in &names {
            if dry_run {
                info!(backup = %name, "would migrate");
                result.record(BackupOutcome::new(name, OutcomeStatus::WouldMigrate));
                continue;
            }

            match self.migrate_backup(name).await {
                Ok(()) => {
                    info!(backup = %name, "migrated");
                    result.record(BackupOutcome::new(name, OutcomeStatus::Migrated));
                }
                Err(e) => {
                    warn!(backup = %name, error = %e, "failed to migrate backup");
                    result.record(BackupOutcome::failed(name, e.to_string()));
                }
            }
        }

        result.finish();
        self.set_phase(MigrationPhase::Completed);
        info!(
            run_id = %result.run_id,
            migrated = result.migrated_backups.len(),
            failed = result.failed_backups.len(),
            "migration finished"
        );

        Ok(result)
    }

    /// Delete the given names from the source path
    ///
    /// Only pass names a real (non-dry-run) migration reported as migrated;
    /// the service does not remember them between calls. Each deletion is
    /// attempted even if earlier ones fail. Deleted names are then polled
    /// out of the source listing with backoff, and any still listed after
    /// the last attempt are reported as unconfirmed.
    pub async fn cleanup_source_backups(
        &self,
        names: &[String],
        dry_run: bool,
    ) -> KeystashResult<CleanupReport> {
        let mut report = CleanupReport {
            base_path: self.from_path.clone(),
            dry_run,
            outcomes: Vec::with_capacity(names.len()),
            unconfirmed: Vec::new(),
        };

        if dry_run {
            for name in names {
                info!(backup = %name, path = %self.from_path, "would delete source backup");
                report
                    .outcomes
                    .push(BackupOutcome::new(name, OutcomeStatus::WouldDelete));
            }
            return Ok(report);
        }

        let mut deleted = Vec::new();
        for name in names {
            match self
                .call(
                    "delete_backup",
                    self.provider.delete_backup(&self.from_path, name),
                )
                .await
            {
                Ok(()) => {
                    info!(backup = %name, path = %self.from_path, "deleted source backup");
                    deleted.push(name.clone());
                    report
                        .outcomes
                        .push(BackupOutcome::new(name, OutcomeStatus::Deleted));
                }
                Err(e) => {
                    warn!(backup = %name, error = %e, "failed to delete source backup, skipping");
                    report
                        .outcomes
                        .push(BackupOutcome::failed(name, e.to_string()));
                }
            }
        }

        if !deleted.is_empty() {
            report.unconfirmed = self.confirm_deleted(&deleted).await;
        }

        Ok(report)
    }

    /// Poll the source listing until none of `names` appear in it
    ///
    /// Returns the names still listed when the attempts ran out.
    async fn confirm_deleted(&self, names: &[String]) -> Vec<String> {
        let outcome = retry_until(
            &self.retry,
            self.sleeper.as_ref(),
            || self.call("list_backups", self.provider.list_backups(&self.from_path)),
            |listing: &Vec<String>| names.iter().all(|name| !listing.contains(name)),
        )
        .await;

        if outcome.satisfied {
            debug!(attempts = outcome.attempts, "source deletions confirmed");
            return Vec::new();
        }

        let unconfirmed: Vec<String> = match outcome.last {
            Some(listing) => names
                .iter()
                .filter(|name| listing.contains(*name))
                .cloned()
                .collect(),
            None => names.to_vec(),
        };
        warn!(
            attempts = outcome.attempts,
            unconfirmed = ?unconfirmed,
            "source listing still shows deleted backups"
        );
        unconfirmed
    }
}

/// Attach a provenance block to record metadata
///
/// An existing block is moved into the history array rather than replaced.
pub fn annotate_provenance(metadata: &mut Map<String, Value>, provenance: Value) {
    if let Some(previous) = metadata.remove(PROVENANCE_KEY) {
        let history = metadata
            .entry(PROVENANCE_HISTORY_KEY)
            .or_insert_with(|| Value::Array(Vec::new()));

        match history {
            Value::Array(entries) => entries.push(previous),
            other => {
                let existing = other.take();
                *other = Value::Array(vec![existing, previous]);
            }
        }
    }

    metadata.insert(PROVENANCE_KEY.to_string(), provenance);
}
