//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the layout, storage and
//! migration layers.

pub mod layout;
pub mod migrate;

pub use layout::{handle_layout_command, LayoutArgs, LayoutCommands};
pub use migrate::{
    handle_history_command, handle_migrate_command, handle_migration_info_command, MigrateArgs,
    MigrationInfoArgs,
};

use std::sync::Arc;

use crate::config::{KeystashPaths, Settings};
use crate::error::KeystashResult;
use crate::storage::{FileStorageProvider, StorageProvider};

/// Open the configured store and check that it answers
pub async fn open_provider(
    paths: &KeystashPaths,
    settings: &Settings,
) -> KeystashResult<Arc<FileStorageProvider>> {
    let provider = Arc::new(FileStorageProvider::new(
        settings.storage.root_or_default(paths),
    ));

    let timeout = settings.storage.timeout();
    match tokio::time::timeout(timeout, provider.test_connection()).await {
        Ok(result) => result?,
        Err(_) => return Err(crate::error::KeystashError::timeout("test_connection", timeout)),
    }

    Ok(provider)
}
