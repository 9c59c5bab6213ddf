//! Applies a SQL migration file to the bot database.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use streak_bot_admin::cli::CommonArgs;
use streak_bot_admin::config::DatabaseConfig;
use streak_bot_admin::db::SupabaseClient;
use streak_bot_admin::maintenance::migration::{self, dashboard_url, manual_instructions};
use streak_bot_admin::maintenance::{DEFAULT_EXEC_FUNCTION, ManualReason, MigrationOutcome};

/// Migration applier.
#[derive(Parser, Debug)]
#[command(name = "apply_migration")]
#[command(about = "Runs a .sql file remotely, or prints it for manual execution")]
#[command(version)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Path to the .sql file.
    file: PathBuf,

    /// Remote procedure that executes raw SQL.
    #[arg(long, default_value = DEFAULT_EXEC_FUNCTION)]
    function: String,

    /// Skip the remote call and only print manual instructions.
    #[arg(long)]
    print_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    args.common.init("warn");

    let config =
        DatabaseConfig::from_env().context("Failed to load database configuration from environment")?;
    let client = SupabaseClient::new(&config).context("Failed to create database client")?;

    let sql = match migration::read_sql(&args.file) {
        Ok(sql) => sql,
        Err(e) => {
            println!("✗ {e}");
            return Ok(());
        }
    };
    println!("Migration: {} ({} lines)", args.file.display(), sql.lines().count());

    let outcome = if args.print_only {
        MigrationOutcome::ManualRequired {
            sql,
            reason: ManualReason::Requested,
        }
    } else {
        migration::apply(&client, &args.function, sql).await
    };

    match outcome {
        MigrationOutcome::Applied => println!("✓ Migration applied."),
        MigrationOutcome::ManualRequired { sql, reason } => {
            let dashboard = dashboard_url(&config.url);
            println!("\n{}", manual_instructions(&sql, &reason, dashboard.as_deref()));
        }
    }

    Ok(())
}
