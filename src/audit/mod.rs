//! Migration journal for Keystash
//!
//! Records every per-backup migrate and cleanup outcome in an append-only
//! JSONL file next to the settings, so past runs can be reviewed with
//! `keystash history`.
//!
//! # Example
//!
//! ```rust,ignore
//! use keystash::audit::{AuditEntry, AuditLogger};
//!
//! let logger = AuditLogger::new(paths.audit_log());
//! logger.log_batch(&AuditEntry::from_migration(&result))?;
//! ```

mod entry;
mod logger;

pub use entry::{AuditEntry, Operation};
pub use logger::AuditLogger;
