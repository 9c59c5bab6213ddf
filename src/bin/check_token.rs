//! Checks a bot token against the Telegram Bot API.

use anyhow::{Context, Result};
use clap::Parser;

use streak_bot_admin::cli::CommonArgs;
use streak_bot_admin::config::BotConfig;
use streak_bot_admin::telegram::{BotApi, BotIdentity, mask_token, token_shape_warnings};

/// Bot token checker.
#[derive(Parser, Debug)]
#[command(name = "check_token")]
#[command(about = "Calls getMe with TELEGRAM_BOT_TOKEN and reports the result")]
#[command(version)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    args.common.init("warn");

    let config = BotConfig::from_env().context("Failed to load bot configuration from environment")?;

    println!("Checking token {}", mask_token(&config.token));
    for warning in token_shape_warnings(&config.token) {
        println!("⚠ Warning: {warning}");
    }

    let api = BotApi::new(&config).context("Failed to create HTTP client")?;

    match api.get_me().await {
        Ok(me) => print_identity(&me),
        Err(e) => {
            println!("✗ Token check failed: {e}");
            if let Some(hint) = e.hint() {
                println!("\n{hint}");
            }
        }
    }

    Ok(())
}

fn print_identity(me: &BotIdentity) {
    println!("✓ Token is valid!\n");
    println!("  id:                          {}", me.id);
    println!("  first_name:                  {}", me.first_name);
    println!(
        "  username:                    {}",
        me.username.as_deref().map_or_else(|| "-".to_owned(), |u| format!("@{u}"))
    );
    println!("  can_join_groups:             {}", me.can_join_groups);
    println!("  can_read_all_group_messages: {}", me.can_read_all_group_messages);
}
