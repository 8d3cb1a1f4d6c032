//! Layout CLI commands
//!
//! Show base paths, describe strategies, list backups and check the store.

use clap::{Args, Subcommand};

use super::open_provider;
use crate::config::{KeystashPaths, Settings};
use crate::display::{format_backup_list, format_strategy_table};
use crate::error::KeystashResult;
use crate::layout::{IdentityProvider, PathGenerator, Strategy, SystemIdentity};
use crate::storage::StorageProvider;

/// Layout selection shared by several commands
///
/// Anything not given on the command line falls back to the saved settings.
#[derive(Args, Debug, Clone, Default)]
pub struct LayoutArgs {
    /// Storage strategy (universal, user, machine-user, custom)
    #[arg(long, env = "KEYSTASH_STRATEGY")]
    pub strategy: Option<String>,

    /// Prefix for the custom strategy
    #[arg(long, env = "KEYSTASH_PREFIX")]
    pub prefix: Option<String>,

    /// Namespace for the universal strategy
    #[arg(long, env = "KEYSTASH_NAMESPACE")]
    pub namespace: Option<String>,

    /// Use this hostname instead of the local one
    #[arg(long)]
    pub host: Option<String>,

    /// Use this username instead of the current one
    #[arg(long)]
    pub user: Option<String>,
}

impl LayoutArgs {
    /// Build the generator and identity for these arguments
    pub fn resolve(&self, settings: &Settings) -> KeystashResult<(PathGenerator, SystemIdentity)> {
        let strategy: Strategy = match &self.strategy {
            Some(name) => name.parse()?,
            None => settings.layout.strategy,
        };

        let prefix = self
            .prefix
            .clone()
            .or_else(|| settings.layout.custom_prefix.clone())
            .unwrap_or_default();
        let namespace = self
            .namespace
            .clone()
            .or_else(|| settings.layout.namespace.clone())
            .unwrap_or_default();

        let generator = PathGenerator::new(strategy)
            .with_custom_prefix(prefix)
            .with_namespace(namespace);
        generator.validate_strategy()?;

        let identity = SystemIdentity::with_overrides(self.user.clone(), self.host.clone());
        Ok((generator, identity))
    }
}

/// Layout subcommands
#[derive(Subcommand)]
pub enum LayoutCommands {
    /// Show the base path for a layout
    Path {
        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Describe all strategies with the paths they produce here
    Strategies,

    /// List backups stored under a layout
    List {
        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Check that the store is reachable
    Check,
}

/// Handle a layout command
pub async fn handle_layout_command(
    paths: &KeystashPaths,
    settings: &Settings,
    cmd: LayoutCommands,
) -> KeystashResult<()> {
    match cmd {
        LayoutCommands::Path { layout } => {
            let (generator, identity) = layout.resolve(settings)?;
            let base_path = generator.generate_base_path(&identity)?;
            println!("Strategy:  {}", generator.strategy());
            println!("Base path: {}", base_path);
            println!("{}", generator.strategy_description());
        }

        LayoutCommands::Strategies => {
            let identity = SystemIdentity::new();
            println!(
                "Identity: {}@{}",
                identity.username(),
                identity.hostname()
            );
            println!();
            print!(
                "{}",
                format_strategy_table(&identity, settings.layout.strategy)
            );
        }

        LayoutCommands::List { layout } => {
            let (generator, identity) = layout.resolve(settings)?;
            let base_path = generator.generate_base_path(&identity)?;
            let provider = open_provider(paths, settings).await?;
            let names = provider.list_backups(&base_path).await?;
            println!("{}", format_backup_list(&base_path, &names));
        }

        LayoutCommands::Check => {
            let provider = open_provider(paths, settings).await?;
            println!("Store reachable at {}", provider.root().display());
        }
    }

    Ok(())
}
