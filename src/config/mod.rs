//! Configuration module for Keystash
//!
//! This module provides configuration management including:
//! - Config directory resolution
//! - User settings persistence (layout, store, timing)

pub mod paths;
pub mod settings;

pub use paths::KeystashPaths;
pub use settings::{LayoutSettings, RetrySettings, Settings, StorageSettings};
