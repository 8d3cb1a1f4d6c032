//! Storage layout strategies
//!
//! A strategy decides how the base path of a backup set is derived from the
//! identity of the machine and user running the tool.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KeystashError;

/// Layout policy for backup sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// One namespace shared by every machine and user
    #[serde(alias = "shared")]
    Universal,
    /// One namespace per user, reachable from any machine
    User,
    /// One namespace per (machine, user) pair; the legacy layout
    #[default]
    #[serde(alias = "machine_user", alias = "legacy")]
    MachineUser,
    /// A caller-supplied prefix
    Custom,
}

impl Strategy {
    /// All strategies, in display order
    pub const ALL: [Strategy; 4] = [
        Strategy::Universal,
        Strategy::User,
        Strategy::MachineUser,
        Strategy::Custom,
    ];

    /// Canonical name used in configuration and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Universal => "universal",
            Strategy::User => "user",
            Strategy::MachineUser => "machine-user",
            Strategy::Custom => "custom",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = KeystashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "universal" | "shared" => Ok(Strategy::Universal),
            "user" => Ok(Strategy::User),
            "machine-user" | "machine_user" | "legacy" => Ok(Strategy::MachineUser),
            "custom" => Ok(Strategy::Custom),
            _ => Err(KeystashError::Config(format!(
                "unknown storage strategy '{}' (expected universal, user, machine-user or custom)",
                s
            ))),
        }
    }
}
