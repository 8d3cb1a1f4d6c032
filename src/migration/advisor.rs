//! Advisory text for strategy changes
//!
//! Derived only from the strategy pair, never from stored data.

use serde::{Deserialize, Serialize};

use crate::layout::Strategy;

/// Benefits and risks of moving between two layouts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationInfo {
    pub from_strategy: Strategy,
    pub to_strategy: Strategy,
    pub from_path: String,
    pub to_path: String,
    /// Every pair can be migrated; kept for callers that display it
    pub compatible: bool,
    /// False when no advice exists for this pair
    pub has_guidance: bool,
    pub risks: Vec<String>,
    pub benefits: Vec<String>,
}

/// Look up the advice for a strategy pair
pub fn get_migration_info(
    from: Strategy,
    to: Strategy,
    from_path: &str,
    to_path: &str,
) -> MigrationInfo {
    let (benefits, risks) = advice_for(from, to);

    MigrationInfo {
        from_strategy: from,
        to_strategy: to,
        from_path: from_path.to_string(),
        to_path: to_path.to_string(),
        compatible: true,
        has_guidance: !benefits.is_empty() || !risks.is_empty(),
        risks: risks.into_iter().map(str::to_string).collect(),
        benefits: benefits.into_iter().map(str::to_string).collect(),
    }
}

fn advice_for(from: Strategy, to: Strategy) -> (Vec<&'static str>, Vec<&'static str>) {
    if from == to {
        return (vec!["No migration needed"], Vec::new());
    }

    match (from, to) {
        (Strategy::MachineUser, Strategy::Universal) => (
            vec![
                "Backups can be restored from any machine",
                "Simplifies path management: one shared location for all backups",
            ],
            vec!["Backup names must now be unique across all machines"],
        ),
        (Strategy::MachineUser, Strategy::User) => (
            vec!["Backups can be restored from any machine you use"],
            vec!["Backup names must be unique across all of your machines"],
        ),
        (Strategy::Universal, Strategy::User) => (
            vec!["Adds per-user isolation to the previously shared namespace"],
            vec![
                "Reduces sharing: other users will no longer see these backups",
                "Existing shared backups may need to be reorganized",
            ],
        ),
        _ => (Vec::new(), Vec::new()),
    }
}
