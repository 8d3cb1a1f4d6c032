//! Display formatting for terminal output
//!
//! Renders layouts, validation results and migration outcomes as plain
//! text, or as JSON/YAML for scripting.

pub mod layout;
pub mod migration;

pub use layout::{format_backup_list, format_strategy_table};
pub use migration::{
    format_cleanup_report, format_migration_info, format_migration_result, format_validation,
};

use clap::ValueEnum;
use serde::Serialize;

use crate::error::{KeystashError, KeystashResult};

/// Output format for machine-readable commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
    /// YAML
    #[value(alias = "yml")]
    Yaml,
}

/// Serialize a value as JSON or YAML
///
/// Returns `None` for [`OutputFormat::Text`]; callers render text themselves.
pub fn render_structured<T: Serialize>(
    value: &T,
    format: OutputFormat,
) -> KeystashResult<Option<String>> {
    match format {
        OutputFormat::Text => Ok(None),
        OutputFormat::Json => Ok(Some(serde_json::to_string_pretty(value)?)),
        OutputFormat::Yaml => serde_yaml::to_string(value)
            .map(Some)
            .map_err(|e| KeystashError::Json(format!("Failed to render YAML: {}", e))),
    }
}
