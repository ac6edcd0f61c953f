//! oxide-query-migrate CLI
//!
//! Command-line tool for applying schema definitions.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use oxide_query_core::dialect::SqliteDialect;
use oxide_query_core::Database;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_query_migrate::log;
use oxide_query_migrate::prelude::*;

/// Logged, idempotent schema migrations.
#[derive(Parser)]
#[command(name = "oxide-query-migrate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL (SQLite path or connection string).
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:db.sqlite3")]
    database: String,

    /// Name recorded as the executor of each action.
    #[arg(short, long, env = "USER", default_value = "unknown")]
    executed_by: String,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply schema definitions.
    Migrate {
        /// Definition files, applied in order.
        #[arg(required = true)]
        definitions: Vec<PathBuf>,
    },

    /// Print the SQL a migration would execute (dry run).
    ShowSql {
        /// Definition files, applied in order.
        #[arg(required = true)]
        definitions: Vec<PathBuf>,
    },

    /// List executed actions.
    Log {
        /// Only this definition.
        #[arg(long)]
        definition: Option<String>,
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

    // Connect to database
    let options = SqliteConnectOptions::from_str(&cli.database)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    let database = Database::new(SqliteDialect::new());
    let context = PipelineContext::new(database.clone(), Arc::new(SqliteExecutor::new(pool)))
        .with_executed_by(cli.executed_by);

    match cli.command {
        Commands::Migrate { definitions } => {
            let definitions = SchemaDefinition::load_all(&definitions)?;
            let report = SchemaGenerator::new(context).generate(&definitions).await?;
            info!(
                actions = report.action_count(),
                statements = report.executable().count(),
                "Migration complete"
            );
        }

        Commands::ShowSql { definitions } => {
            let definitions = SchemaDefinition::load_all(&definitions)?;
            let report = SchemaGenerator::new(context.with_dry_run(true))
                .generate(&definitions)
                .await?;
            for statement in report.executable() {
                match &statement.origin {
                    Some(meta) => println!("-- {meta}"),
                    None => println!("-- action log"),
                }
                println!("{};", statement.sql);
            }
        }

        Commands::Log { definition } => {
            if !database
                .table_exists(context.executor(), &ActionLogEntry::table_name())
                .await?
            {
                info!("No actions have been executed yet.");
                return Ok(());
            }

            let entries = log::entries(&database, context.executor(), definition.as_deref()).await?;
            if entries.is_empty() {
                info!("No matching actions.");
            } else {
                println!("\nExecuted actions:");
                println!("{:-<60}", "");
                for entry in &entries {
                    println!(
                        " [X] {}/{} by {} ({}, {})",
                        entry.definition_id,
                        entry.action_id,
                        entry.author,
                        entry.executed_by,
                        entry.execution_ts.format("%Y-%m-%d %H:%M:%S")
                    );
                }
                println!();
            }
        }
    }

    Ok(())
}
