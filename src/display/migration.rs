//! Migration display formatting
//!
//! Formats validation results, migration outcomes and advisory text.

use crate::migration::{CleanupReport, MigrationInfo, MigrationResult, ValidationResult};

/// Format the benefits and risks of a strategy change
pub fn format_migration_info(info: &MigrationInfo) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Migration: {} -> {}\n",
        info.from_strategy, info.to_strategy
    ));
    output.push_str(&format!("  From: {}\n", info.from_path));
    output.push_str(&format!("  To:   {}\n", info.to_path));

    if !info.has_guidance {
        output.push_str("\nNo specific guidance for this strategy pair.\n");
        return output;
    }

    push_section(&mut output, "Benefits", &info.benefits);
    push_section(&mut output, "Risks", &info.risks);
    output
}

/// Format a validation result
pub fn format_validation(result: &ValidationResult) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Validation: {} ({} backup(s) at source)\n",
        if result.valid { "OK" } else { "FAILED" },
        result.source_backup_count
    ));

    push_section(&mut output, "Errors", &result.errors);
    push_section(&mut output, "Warnings", &result.warnings);
    push_section(&mut output, "Benefits", &result.benefits);
    output
}

/// Format the outcome of a migration run
pub fn format_migration_result(result: &MigrationResult) -> String {
    let mut output = String::new();

    let heading = if result.dry_run {
        "Migration preview (dry run)"
    } else {
        "Migration complete"
    };
    output.push_str(&format!("{}\n", heading));
    output.push_str(&format!("{}\n", "=".repeat(heading.len())));
    output.push_str(&format!("Run:      {}\n", result.run_id));
    output.push_str(&format!(
        "From:     {} ({})\n",
        result.from_path, result.from_strategy
    ));
    output.push_str(&format!(
        "To:       {} ({})\n",
        result.to_path, result.to_strategy
    ));
    output.push_str(&format!("Duration: {} ms\n", result.duration_ms));
    output.push('\n');

    for outcome in &result.outcomes {
        output.push_str(&format!("  {:<24} {}\n", outcome.name, outcome.status));
    }

    output.push('\n');
    let verb = if result.dry_run {
        "would migrate"
    } else {
        "migrated"
    };
    output.push_str(&format!(
        "Total: {}, {}: {}, failed: {}",
        result.total_backups,
        verb,
        result.migrated_backups.len(),
        result.failed_backups.len()
    ));

    output
}

/// Format the outcome of a cleanup pass
pub fn format_cleanup_report(report: &CleanupReport) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Cleanup of '{}'{}\n",
        report.base_path,
        if report.dry_run { " (dry run)" } else { "" }
    ));

    for outcome in &report.outcomes {
        output.push_str(&format!("  {:<24} {}\n", outcome.name, outcome.status));
    }

    if !report.unconfirmed.is_empty() {
        output.push_str(&format!(
            "\nStill listed after deletion (the store may be catching up): {}\n",
            report.unconfirmed.join(", ")
        ));
    }

    output
}

fn push_section(output: &mut String, title: &str, lines: &[String]) {
    if lines.is_empty() {
        return;
    }

    output.push_str(&format!("\n{}:\n", title));
    for line in lines {
        output.push_str(&format!("  - {}\n", line));
    }
}
