use anyhow::Result;
use clap::{Parser, Subcommand};

use keystash::cli::{
    handle_history_command, handle_layout_command, handle_migrate_command,
    handle_migration_info_command, LayoutCommands, MigrateArgs, MigrationInfoArgs,
};
use keystash::config::{KeystashPaths, Settings};
use keystash::logging::init_logging;

#[derive(Parser)]
#[command(
    name = "keystash",
    author = "Kaylee Beyene",
    version,
    about = "Back up SSH credentials and move them between storage layouts",
    long_about = "Keystash keeps SSH credential backups in a hierarchical secret \
                  store. Backups live under a base path chosen by a layout strategy \
                  (universal, user, machine-user or custom) and can be migrated \
                  between layouts with validation and dry runs."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration and the local store
    Init,

    /// Show current configuration and paths
    Config,

    #[command(flatten)]
    Layout(LayoutCommands),

    /// Explain the benefits and risks of changing strategy
    MigrationInfo(MigrationInfoArgs),

    /// Move backups from one layout to another
    Migrate(MigrateArgs),

    /// Show recent migration and cleanup activity
    History {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Initialize paths and settings
    let paths = KeystashPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Some(Commands::Init) => {
            println!("Initializing Keystash at: {}", paths.base_dir().display());
            settings.save(&paths)?;
            let store = settings.storage.root_or_default(&paths);
            std::fs::create_dir_all(&store)?;
            println!("Initialization complete!");
            println!();
            println!("Store:    {}", store.display());
            println!("Strategy: {}", settings.layout.strategy);
            println!();
            println!("Run 'keystash strategies' to compare storage layouts.");
        }
        Some(Commands::Config) => {
            println!("Keystash Configuration");
            println!("======================");
            println!("Config directory: {}", paths.base_dir().display());
            println!(
                "Settings file:    {}{}",
                paths.settings_file().display(),
                if paths.is_initialized() {
                    ""
                } else {
                    " (not saved; run 'keystash init')"
                }
            );
            println!("Audit log:        {}", paths.audit_log().display());
            println!(
                "Store:            {}",
                settings.storage.root_or_default(&paths).display()
            );
            println!();
            println!("Settings:");
            println!("  Strategy:       {}", settings.layout.strategy);
            if let Some(prefix) = &settings.layout.custom_prefix {
                println!("  Custom prefix:  {}", prefix);
            }
            if let Some(namespace) = &settings.layout.namespace {
                println!("  Namespace:      {}", namespace);
            }
            println!("  Timeout:        {}s", settings.storage.timeout_secs);
            println!("  Delete retries: {}", settings.retry.max_attempts);
        }
        Some(Commands::Layout(cmd)) => {
            handle_layout_command(&paths, &settings, cmd).await?;
        }
        Some(Commands::MigrationInfo(args)) => {
            handle_migration_info_command(args)?;
        }
        Some(Commands::Migrate(args)) => {
            handle_migrate_command(&paths, &settings, args).await?;
        }
        Some(Commands::History { limit }) => {
            handle_history_command(&paths, limit)?;
        }
        None => {
            println!("Keystash - SSH credential backups across storage layouts");
            println!();
            println!("Run 'keystash --help' for usage information.");
        }
    }

    Ok(())
}
