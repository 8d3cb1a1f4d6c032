//! Layout display formatting

use crate::layout::{IdentityProvider, PathGenerator, Strategy};

/// Describe every strategy with the path it would produce for `identity`
pub fn format_strategy_table(identity: &dyn IdentityProvider, current: Strategy) -> String {
    let rows: Vec<(String, String, String)> = Strategy::ALL
        .iter()
        .map(|strategy| {
            let generator = example_generator(*strategy);
            let path = generator
                .generate_base_path(identity)
                .unwrap_or_else(|e| e.to_string());
            let marker = if *strategy == current { "*" } else { " " };
            (
                format!("{} {}", marker, strategy),
                path,
                generator.strategy_description(),
            )
        })
        .collect();

    let name_width = rows.iter().map(|r| r.0.len()).max().unwrap_or(8).max(10);
    let path_width = rows.iter().map(|r| r.1.len()).max().unwrap_or(4).max(9);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<path_width$}  {}\n",
        "  Strategy",
        "Base path",
        "Description",
        name_width = name_width,
        path_width = path_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:-<path_width$}  {:-<11}\n",
        "",
        "",
        "",
        name_width = name_width,
        path_width = path_width,
    ));

    for (name, path, description) in rows {
        output.push_str(&format!(
            "{:<name_width$}  {:<path_width$}  {}\n",
            name,
            path,
            description,
            name_width = name_width,
            path_width = path_width,
        ));
    }

    output
}

fn example_generator(strategy: Strategy) -> PathGenerator {
    match strategy {
        Strategy::Custom => PathGenerator::new(strategy).with_custom_prefix("my-prefix"),
        _ => PathGenerator::new(strategy),
    }
}

/// List backup names under a base path
pub fn format_backup_list(base_path: &str, names: &[String]) -> String {
    if names.is_empty() {
        return format!("No backups found under '{}'.", base_path);
    }

    let mut output = format!("Backups under '{}':\n", base_path);
    for name in names {
        output.push_str(&format!("  - {}\n", name));
    }
    output.push_str(&format!("\nTotal: {} backup(s)", names.len()));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::StaticIdentity;

    #[test]
    fn test_strategy_table() {
        let identity = StaticIdentity::new("alice", "alice-laptop");
        let table = format_strategy_table(&identity, Strategy::MachineUser);

        assert!(table.contains("users/alice-laptop-alice"));
        assert!(table.contains("users/alice"));
        assert!(table.contains("shared"));
        assert!(table.contains("my-prefix"));
        assert!(table.contains("* machine-user"));
    }

    #[test]
    fn test_backup_list() {
        assert_eq!(
            format_backup_list("shared", &[]),
            "No backups found under 'shared'."
        );

        let list = format_backup_list("shared", &["daily".to_string(), "weekly".to_string()]);
        assert!(list.contains("  - daily"));
        assert!(list.contains("Total: 2 backup(s)"));
    }
}
