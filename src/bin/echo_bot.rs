//! Minimal echo bot for checking the token and connectivity by hand.

use anyhow::{Context, Result};
use clap::Parser;

use streak_bot_admin::cli::CommonArgs;
use streak_bot_admin::config::BotConfig;
use streak_bot_admin::echo::EchoBot;

/// Echo test bot.
#[derive(Parser, Debug)]
#[command(name = "echo_bot")]
#[command(about = "Answers /start, /help and /ping and echoes any other text")]
#[command(version)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    args.common.init("info");

    let config = BotConfig::from_env().context("Failed to load bot configuration from environment")?;

    EchoBot::new(&config).run().await;

    Ok(())
}
