//! Migration CLI commands
//!
//! `migration-info`, `migrate` and `history`. The migrate handler runs
//! validation first and only touches data once it passes; cleanup is a
//! second, explicit step gated on `--cleanup`.

use clap::Args;
use serde::Serialize;
use tracing::{info, warn};

use super::open_provider;
use crate::audit::{AuditEntry, AuditLogger};
use crate::config::{KeystashPaths, Settings};
use crate::display::{
    format_cleanup_report, format_migration_info, format_migration_result, format_validation,
    render_structured, OutputFormat,
};
use crate::error::{KeystashError, KeystashResult};
use crate::layout::{PathGenerator, SystemIdentity};
use crate::migration::{
    get_migration_info, CleanupReport, MigrationResult, MigrationService, ValidationResult,
};
use crate::storage::{BackupIndex, StorageProvider};

/// Source and destination layouts for a migration
#[derive(Args, Debug, Clone)]
pub struct MigrationInfoArgs {
    /// Strategy the backups are stored under now
    #[arg(long)]
    pub from: String,

    /// Strategy to move the backups to
    #[arg(long)]
    pub to: String,

    /// Custom prefix of the source layout
    #[arg(long)]
    pub from_prefix: Option<String>,

    /// Custom prefix of the destination layout
    #[arg(long)]
    pub to_prefix: Option<String>,

    /// Namespace of the source layout
    #[arg(long)]
    pub from_namespace: Option<String>,

    /// Namespace of the destination layout
    #[arg(long)]
    pub to_namespace: Option<String>,

    /// Hostname the source layout was written from
    #[arg(long)]
    pub from_host: Option<String>,

    /// Username the source layout was written by
    #[arg(long)]
    pub from_user: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl MigrationInfoArgs {
    /// Build generators and identities for both sides
    ///
    /// The destination always uses the local identity.
    fn resolve(&self) -> KeystashResult<ResolvedPair> {
        let from = PathGenerator::from_config(
            &self.from,
            self.from_prefix.as_deref(),
            self.from_namespace.as_deref(),
        )?;
        let to = PathGenerator::from_config(
            &self.to,
            self.to_prefix.as_deref(),
            self.to_namespace.as_deref(),
        )?;
        from.validate_strategy()?;
        to.validate_strategy()?;

        Ok(ResolvedPair {
            from_identity: SystemIdentity::with_overrides(
                self.from_user.clone(),
                self.from_host.clone(),
            ),
            to_identity: SystemIdentity::new(),
            from,
            to,
        })
    }
}

struct ResolvedPair {
    from: PathGenerator,
    from_identity: SystemIdentity,
    to: PathGenerator,
    to_identity: SystemIdentity,
}

impl ResolvedPair {
    fn paths(&self) -> KeystashResult<(String, String)> {
        Ok((
            self.from.generate_base_path(&self.from_identity)?,
            self.to.generate_base_path(&self.to_identity)?,
        ))
    }
}

/// Arguments for `keystash migrate`
#[derive(Args, Debug, Clone)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub layouts: MigrationInfoArgs,

    /// Report what would happen without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Delete migrated backups from the source afterwards
    #[arg(long)]
    pub cleanup: bool,

    /// Overwrite backups that already exist at the destination.
    /// Advisory risks are reported but never require this flag
    #[arg(short, long)]
    pub force: bool,
}

/// A real run that would overwrite destination backups needs `--force`
fn needs_force(validation: &ValidationResult, dry_run: bool, force: bool) -> bool {
    !validation.conflicts.is_empty() && !dry_run && !force
}

/// Everything a migrate run produced, for structured output
#[derive(Serialize)]
struct MigrateReport<'a> {
    validation: &'a ValidationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a MigrationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cleanup: Option<&'a CleanupReport>,
}

impl MigrateReport<'_> {
    fn print(&self, format: OutputFormat) -> KeystashResult<()> {
        if let Some(rendered) = render_structured(self, format)? {
            println!("{}", rendered.trim_end());
            return Ok(());
        }

        print!("{}", format_validation(self.validation));
        if let Some(result) = self.result {
            println!();
            println!("{}", format_migration_result(result));
        }
        if let Some(cleanup) = self.cleanup {
            println!();
            println!("{}", format_cleanup_report(cleanup));
        }
        Ok(())
    }
}

/// Handle `keystash migration-info`
pub fn handle_migration_info_command(args: MigrationInfoArgs) -> KeystashResult<()> {
    let pair = args.resolve()?;
    let (from_path, to_path) = pair.paths()?;
    let info = get_migration_info(pair.from.strategy(), pair.to.strategy(), &from_path, &to_path);

    match render_structured(&info, args.format)? {
        Some(rendered) => println!("{}", rendered.trim_end()),
        None => print!("{}", format_migration_info(&info)),
    }
    Ok(())
}

/// Handle `keystash migrate`
pub async fn handle_migrate_command(
    paths: &KeystashPaths,
    settings: &Settings,
    args: MigrateArgs,
) -> KeystashResult<()> {
    let format = args.layouts.format;
    let pair = args.layouts.resolve()?;
    let provider = open_provider(paths, settings).await?;

    let service = MigrationService::from_generators(
        provider.clone(),
        &pair.from,
        &pair.from_identity,
        &pair.to,
        &pair.to_identity,
    )?
    .with_timeout(settings.storage.timeout())
    .with_retry_policy(settings.retry.policy());

    let validation = service.validate_migration().await?;
    if !validation.valid {
        MigrateReport {
            validation: &validation,
            result: None,
            cleanup: None,
        }
        .print(format)?;
        return Err(KeystashError::Validation(validation.errors.join("; ")));
    }

    if needs_force(&validation, args.dry_run, args.force) {
        MigrateReport {
            validation: &validation,
            result: None,
            cleanup: None,
        }
        .print(format)?;
        return Err(KeystashError::Validation(format!(
            "{} backup(s) would be overwritten; re-run with --force, or use --dry-run",
            validation.conflicts.len()
        )));
    }

    let result = service.migrate_all_backups(args.dry_run).await?;
    let audit = AuditLogger::new(paths.audit_log());
    audit.log_batch(&AuditEntry::from_migration(&result))?;

    if !result.dry_run {
        update_destination_index(provider.as_ref(), &result).await;
    }

    // Only names this run reported as migrated are eligible for deletion
    let cleanup = if args.cleanup {
        let report = service
            .cleanup_source_backups(&result.migrated_backups, result.dry_run)
            .await?;
        audit.log_batch(&AuditEntry::from_cleanup(&result, &report))?;
        if !report.dry_run {
            update_source_index(provider.as_ref(), &report).await;
        }
        Some(report)
    } else {
        None
    };

    MigrateReport {
        validation: &validation,
        result: Some(&result),
        cleanup: cleanup.as_ref(),
    }
    .print(format)?;

    if let Some(err) = result.partial_failure() {
        return Err(err);
    }
    if let Some(report) = &cleanup {
        if report.has_failures() {
            return Err(KeystashError::PartialFailure {
                failed: report.failed().len(),
                total: report.outcomes.len(),
            });
        }
    }

    Ok(())
}

/// Record migrated names in the destination index
///
/// The index is advisory; a failure here never fails the migration.
async fn update_destination_index(provider: &dyn StorageProvider, result: &MigrationResult) {
    let outcome: KeystashResult<()> = async {
        let mut index = BackupIndex::load(provider, &result.to_path).await?;
        for name in &result.migrated_backups {
            index.record(name, Some(&result.from_path));
        }
        index.save(provider, &result.to_path).await
    }
    .await;

    match outcome {
        Ok(()) => info!(base_path = %result.to_path, "Updated backup index"),
        Err(e) => warn!(base_path = %result.to_path, error = %e, "Failed to update backup index"),
    }
}

/// Drop deleted names from the source index
async fn update_source_index(provider: &dyn StorageProvider, report: &CleanupReport) {
    let outcome: KeystashResult<()> = async {
        let mut index = BackupIndex::load(provider, &report.base_path).await?;
        for name in report.deleted() {
            index.remove(name);
        }
        index.save(provider, &report.base_path).await
    }
    .await;

    if let Err(e) = outcome {
        warn!(base_path = %report.base_path, error = %e, "Failed to update backup index");
    }
}

/// Handle `keystash history`
pub fn handle_history_command(paths: &KeystashPaths, limit: usize) -> KeystashResult<()> {
    let audit = AuditLogger::new(paths.audit_log());
    let entries = audit.read_recent(limit)?;

    if entries.is_empty() {
        println!("No migrations recorded yet.");
        return Ok(());
    }

    for entry in &entries {
        println!("{}", entry.format_human_readable());
    }
    Ok(())
}
