//! Read-only inspection of the users table.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use streak_bot_admin::cli::CommonArgs;
use streak_bot_admin::config::DatabaseConfig;
use streak_bot_admin::db::SupabaseClient;
use streak_bot_admin::maintenance::SCAN_LIMIT;
use streak_bot_admin::maintenance::inspector;

/// User inspector.
#[derive(Parser, Debug)]
#[command(name = "inspect_users")]
#[command(about = "Prints users and their streaks from the bot database")]
#[command(version)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Print the first users in insertion order with every column.
    Scan {
        /// Maximum number of users to print.
        #[arg(long, default_value_t = SCAN_LIMIT)]
        limit: usize,
    },

    /// Print the most recently created user.
    Latest,

    /// Print one user and their streak.
    Find {
        /// Telegram user id.
        #[arg(short, long)]
        telegram_id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    args.common.init("warn");

    let config =
        DatabaseConfig::from_env().context("Failed to load database configuration from environment")?;
    let client = SupabaseClient::new(&config).context("Failed to create database client")?;

    let report = match args.mode {
        Mode::Scan { limit } => inspector::scan(&client, limit)
            .await
            .map(|rows| inspector::render_scan(&rows)),
        Mode::Latest => inspector::latest(&client)
            .await
            .map(|row| inspector::render_latest(row.as_ref())),
        Mode::Find { telegram_id } => {
            println!("Looking up telegram_id {telegram_id}...\n");
            inspector::lookup(&client, telegram_id)
                .await
                .map(|lookup| inspector::render_lookup(&lookup))
        }
    };

    match report {
        Ok(text) => println!("{text}"),
        Err(e) => println!("✗ Query failed: {e}"),
    }

    Ok(())
}
