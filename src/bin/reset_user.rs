//! Resets a user's state, either in place or by deleting it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::Confirm;

use streak_bot_admin::cli::CommonArgs;
use streak_bot_admin::config::DatabaseConfig;
use streak_bot_admin::db::SupabaseClient;
use streak_bot_admin::maintenance::{Lookup, inspector, reset};

/// User resetter.
#[derive(Parser, Debug)]
#[command(name = "reset_user")]
#[command(about = "Resets a bot user back to the start of onboarding")]
#[command(version)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    policy: Policy,
}

#[derive(Subcommand, Debug)]
enum Policy {
    /// Set level to 1, onboarding to not completed and zero the current streak.
    Soft {
        /// Telegram user id.
        #[arg(short, long)]
        telegram_id: i64,

        /// Show the user that would be reset without changing anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete the user together with their streaks and tasks.
    Hard {
        /// Telegram user id.
        #[arg(short, long)]
        telegram_id: i64,

        /// Show the user that would be deleted without changing anything.
        #[arg(long)]
        dry_run: bool,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    args.common.init("warn");

    let config =
        DatabaseConfig::from_env().context("Failed to load database configuration from environment")?;
    let client = SupabaseClient::new(&config).context("Failed to create database client")?;

    match args.policy {
        Policy::Soft { telegram_id, dry_run: true }
        | Policy::Hard { telegram_id, dry_run: true, .. } => {
            preview(&client, telegram_id).await;
            println!("\nDry run: nothing was changed.");
        }
        Policy::Soft { telegram_id, .. } => match reset::soft_reset(&client, telegram_id).await {
            Ok(report) => println!("{}", reset::render_soft_reset(&report)),
            Err(e) => println!("✗ Soft reset failed: {e}"),
        },
        Policy::Hard { telegram_id, yes, .. } => {
            if !yes {
                if !preview(&client, telegram_id).await {
                    return Ok(());
                }
                if !confirm_delete(telegram_id) {
                    println!("Aborted, nothing was deleted.");
                    return Ok(());
                }
            }

            match reset::hard_reset(&client, telegram_id).await {
                Ok(report) => println!("{}", reset::render_hard_reset(telegram_id, &report)),
                Err(e) => println!("✗ Hard reset failed: {e}"),
            }
        }
    }

    Ok(())
}

/// Prints the target user; returns whether it exists.
async fn preview(client: &SupabaseClient, telegram_id: i64) -> bool {
    match inspector::lookup(client, telegram_id).await {
        Ok(lookup) => {
            println!("{}", inspector::render_lookup(&lookup));
            matches!(lookup, Lookup::Found { .. })
        }
        Err(e) => {
            println!("✗ Query failed: {e}");
            false
        }
    }
}

fn confirm_delete(telegram_id: i64) -> bool {
    Confirm::new()
        .with_prompt(format!(
            "\nDelete user {telegram_id} with all streaks and tasks? This cannot be undone"
        ))
        .default(false)
        .interact()
        .unwrap_or(false)
}
