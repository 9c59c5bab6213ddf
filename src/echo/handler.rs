//! Echo bot runtime.

use teloxide::RequestError;
use teloxide::prelude::*;
use tracing::{debug, info};

use super::types::EchoCommand;
use crate::config::BotConfig;
use crate::telegram::mask_token;

/// Reply to `/ping`.
pub const PING_REPLY: &str = "pong 🏓";

/// Builds the reply for a parsed message.
#[must_use]
pub fn reply_for(command: &EchoCommand, sender: Option<&str>) -> String {
    match command {
        EchoCommand::Start => {
            let name = sender.filter(|n| !n.trim().is_empty()).unwrap_or("there");
            format!("Hi, {name}! 👋 I'm a test bot. Send me any text and I'll echo it back.")
        }
        EchoCommand::Help => {
            let mut lines = vec!["Available commands:".to_owned()];
            for (cmd, desc) in EchoCommand::all_commands() {
                lines.push(format!("  {cmd} - {desc}"));
            }
            lines.push("Any other text is echoed back.".to_owned());
            lines.join("\n")
        }
        EchoCommand::Ping => PING_REPLY.to_owned(),
        EchoCommand::Text(text) => text.clone(),
    }
}

/// Long-polling echo bot.
///
/// Updates are handled one at a time: all of them go into a single
/// dispatcher queue and handlers run on the current thread.
pub struct EchoBot {
    bot: Bot,
    token_hint: String,
}

impl EchoBot {
    /// Creates the bot from configuration.
    #[must_use]
    pub fn new(config: &BotConfig) -> Self {
        Self {
            bot: Bot::new(config.token.trim()),
            token_hint: mask_token(&config.token),
        }
    }

    /// Polls for updates until Ctrl+C, then shuts down gracefully.
    ///
    /// After the signal no new updates are fetched; handlers already
    /// running finish before this returns.
    pub async fn run(self) {
        info!("Starting echo bot (token {})", self.token_hint);

        info!("Bot is running. Use Ctrl+C to stop.");
        dispatcher(self.bot).dispatch().await;

        info!("Echo bot stopped");
    }
}

/// Single-queue dispatcher that stops on Ctrl+C.
///
/// The signal handler is installed by the dispatcher itself when it starts,
/// so a signal is never consumed before there is something to shut down.
fn dispatcher(bot: Bot) -> Dispatcher<Bot, RequestError, ()> {
    let handler = Update::filter_message().endpoint(handle_message);

    Dispatcher::builder(bot, handler)
        .distribution_function(|_: &Update| Some(()))
        .default_handler(|_| async {
            debug!("Ignoring non-message update");
        })
        .enable_ctrlc_handler()
        .build()
}

impl std::fmt::Debug for EchoBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EchoBot")
            .field("token", &self.token_hint)
            .finish_non_exhaustive()
    }
}

async fn handle_message(bot: Bot, msg: Message) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        debug!("Ignoring non-text message in chat {}", msg.chat.id.0);
        return Ok(());
    };

    let command = EchoCommand::parse(text);
    let sender = msg.from.as_ref().map(|user| user.first_name.as_str());

    match &command {
        EchoCommand::Text(text) => info!(
            "Message from {} in chat {}: {}",
            sender.unwrap_or("unknown"),
            msg.chat.id.0,
            text
        ),
        other => info!("Command {} in chat {}", other, msg.chat.id.0),
    }

    bot.send_message(msg.chat.id, reply_for(&command, sender))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dispatcher_idle_until_dispatched() {
        let dp = dispatcher(Bot::new("1:test"));
        assert!(dp.shutdown_token().shutdown().is_err());
    }

    #[test]
    fn test_start_greets_sender() {
        let reply = reply_for(&EchoCommand::Start, Some("Maria"));
        assert!(reply.starts_with("Hi, Maria!"));
    }

    #[test]
    fn test_start_without_name() {
        assert!(reply_for(&EchoCommand::Start, None).starts_with("Hi, there!"));
        assert!(reply_for(&EchoCommand::Start, Some("  ")).starts_with("Hi, there!"));
    }

    #[test]
    fn test_help_lists_commands() {
        let reply = reply_for(&EchoCommand::Help, None);
        for (cmd, _) in EchoCommand::all_commands() {
            assert!(reply.contains(cmd));
        }
    }

    #[test]
    fn test_ping_and_echo() {
        assert_eq!(reply_for(&EchoCommand::Ping, None), PING_REPLY);
        assert_eq!(
            reply_for(&EchoCommand::Text("hello  world".to_owned()), Some("x")),
            "hello  world"
        );
    }
}
