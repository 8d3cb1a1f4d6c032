//! Cross-layout migration for Keystash
//!
//! Moves a backup set from one base path to another.
//!
//! # Architecture
//!
//! - `MigrationService`: lists, validates, migrates and cleans up
//! - `advisor`: benefit/risk text for a strategy pair
//! - `result`: validation, per-backup outcome and batch result types
//! - `retry`: bounded polling used to confirm deletions
//!
//! # Example
//!
//! ```rust,ignore
//! use keystash::migration::MigrationService;
//!
//! let service = MigrationService::from_generators(provider, &from, &identity, &to, &identity)?;
//! let validation = service.validate_migration().await?;
//! if validation.valid {
//!     let result = service.migrate_all_backups(false).await?;
//!     service.cleanup_source_backups(&result.migrated_backups, false).await?;
//! }
//! ```

pub mod advisor;
pub mod result;
pub mod retry;
pub mod service;

pub use advisor::{get_migration_info, MigrationInfo};
pub use result::{
    BackupOutcome, CleanupReport, MigrationPhase, MigrationResult, OutcomeStatus,
    ValidationResult,
};
pub use retry::{retry_until, RetryPolicy, Sleeper, TokioSleeper};
pub use service::{annotate_provenance, MigrationService, DEFAULT_TIMEOUT};
