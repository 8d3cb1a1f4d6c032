//! Keystash - SSH credential backups across storage layouts
//!
//! This library decides where a backup set lives in a hierarchical secret
//! store and moves existing backup sets between layouts. A layout is picked
//! by a [`layout::Strategy`]; the [`migration::MigrationService`] copies
//! backups from one layout's base path to another's with validation,
//! dry runs and a separate cleanup step.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `layout`: Strategies, path sanitizing and base path generation
//! - `storage`: The storage provider contract plus file and memory stores
//! - `migration`: Migration engine, advisor and retry policy
//! - `config`: Configuration and path management
//! - `audit`: Audit journal of migration runs
//! - `display`: Terminal rendering
//! - `cli`: Command handlers for the `keystash` binary
//! - `error`: Custom error types
//!
//! # Example
//!
//! ```rust,ignore
//! use keystash::layout::{PathGenerator, Strategy, SystemIdentity};
//!
//! let generator = PathGenerator::new(Strategy::MachineUser);
//! let base_path = generator.generate_base_path(&SystemIdentity::new())?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod layout;
pub mod logging;
pub mod migration;
pub mod storage;

pub use error::KeystashError;
