//! oxide-schema CLI
//!
//! Command-line tool for reading and synchronizing SQLite table definitions.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_schema::prelude::*;

/// Keeps SQLite tables in line with JSON table definitions.
#[derive(Parser)]
#[command(name = "oxide-schema")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL (SQLite path or connection string).
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:db.sqlite3")]
    database: String,

    /// Prefix prepended to every table name.
    #[arg(short, long, env = "OXIDE_SCHEMA_TABLE_PREFIX", default_value = "")]
    prefix: String,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the live definition of a table as JSON.
    Show {
        /// Logical table name.
        table: String,
    },

    /// Print the create-table SQL of a definition file.
    Sql {
        /// JSON table definition.
        file: PathBuf,
    },

    /// Create a table from a definition file.
    Create {
        /// JSON table definition.
        file: PathBuf,

        /// Show SQL without executing (dry run).
        #[arg(long)]
        dry_run: bool,
    },

    /// Drop a table.
    Drop {
        /// Logical table name.
        table: String,

        /// Show SQL without executing (dry run).
        #[arg(long)]
        dry_run: bool,
    },

    /// Add and remove fields so the live table matches a definition file.
    Sync {
        /// JSON table definition.
        file: PathBuf,

        /// Also add and remove indexes.
        #[arg(long)]
        indexes: bool,

        /// Show SQL without executing (dry run).
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let prefix = TablePrefix::new(cli.prefix);

    // Printing SQL needs no database
    if let Commands::Sql { file } = &cli.command {
        let table = load_table_definition(file)?;
        println!("{}", SqliteSchemaSqlBuilder::with_prefix(prefix).create_table_sql(&table));
        return Ok(());
    }

    // Connect to database
    let options = SqliteConnectOptions::from_str(&cli.database)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    match cli.command {
        Commands::Sql { .. } => {}

        Commands::Show { table } => {
            let modifier = SqliteSchemaModifier::with_prefix(pool, prefix);
            let definition = modifier.reader().read_definition(&table).await?;
            println!("{}", serde_json::to_string_pretty(&definition)?);
        }

        Commands::Create { file, dry_run } => {
            let table = load_table_definition(&file)?;
            let modifier = SqliteSchemaModifier::with_prefix(pool, prefix).dry_run(dry_run);
            modifier.create_table(&table).await?;
        }

        Commands::Drop { table, dry_run } => {
            let modifier = SqliteSchemaModifier::with_prefix(pool, prefix).dry_run(dry_run);
            modifier.drop_table(&table).await?;
        }

        Commands::Sync {
            file,
            indexes,
            dry_run,
        } => {
            let desired = load_table_definition(&file)?;
            let modifier = SqliteSchemaModifier::with_prefix(pool, prefix).dry_run(dry_run);

            if !modifier.table_exists(desired.name()).await? {
                info!(table = %desired.name(), "Table does not exist, creating it");
                modifier.create_table(&desired).await?;
                return Ok(());
            }

            let current = modifier.reader().read_definition(desired.name()).await?;
            if current == desired {
                info!(table = %desired.name(), "Table is up to date");
                return Ok(());
            }

            let updater = SimpleTableSchemaUpdater::new(&modifier);
            updater.update_table(&current, &desired).await?;

            if indexes {
                // Field removals may have dropped indexes with them
                let current = if dry_run {
                    current
                } else {
                    modifier.reader().read_definition(desired.name()).await?
                };
                updater.update_indexes(&current, &desired).await?;
            }
        }
    }

    Ok(())
}
