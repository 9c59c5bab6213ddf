//! Echo bot command types.

use std::fmt;

/// What an inbound text message asks the bot to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EchoCommand {
    /// Greet the sender.
    Start,

    /// List available commands.
    Help,

    /// Reply with a fixed acknowledgement.
    Ping,

    /// Anything else: echo it back verbatim.
    Text(String),
}

impl EchoCommand {
    /// Parses a message text.
    ///
    /// Commands are case-insensitive and may carry a `@botname` suffix
    /// (as sent in group chats). Unknown commands are echoed like text.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();

        let Some(rest) = trimmed.strip_prefix('/') else {
            return Self::Text(text.to_owned());
        };

        let word = rest.split_whitespace().next().unwrap_or_default();
        let name = word.split_once('@').map_or(word, |(name, _)| name);

        match name.to_lowercase().as_str() {
            "start" => Self::Start,
            "help" => Self::Help,
            "ping" => Self::Ping,
            _ => Self::Text(text.to_owned()),
        }
    }

    /// Returns all commands with their descriptions.
    #[must_use]
    pub const fn all_commands() -> [(&'static str, &'static str); 3] {
        [
            ("/start", "Greeting"),
            ("/help", "Show this help message"),
            ("/ping", "Check that the bot is alive"),
        ]
    }
}

impl fmt::Display for EchoCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("/start"),
            Self::Help => f.write_str("/help"),
            Self::Ping => f.write_str("/ping"),
            Self::Text(_) => f.write_str("text"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(EchoCommand::parse("/start"), EchoCommand::Start);
        assert_eq!(EchoCommand::parse("/help"), EchoCommand::Help);
        assert_eq!(EchoCommand::parse("/ping"), EchoCommand::Ping);
    }

    #[test]
    fn test_parse_bot_suffix_and_case() {
        assert_eq!(EchoCommand::parse("/start@streak_test_bot"), EchoCommand::Start);
        assert_eq!(EchoCommand::parse("/PING"), EchoCommand::Ping);
        assert_eq!(EchoCommand::parse("  /help extra words "), EchoCommand::Help);
    }

    #[test]
    fn test_parse_text_is_verbatim() {
        assert_eq!(
            EchoCommand::parse("  Привет, бот! "),
            EchoCommand::Text("  Привет, бот! ".to_owned())
        );
    }

    #[test]
    fn test_parse_unknown_command_is_echoed() {
        assert_eq!(
            EchoCommand::parse("/settings"),
            EchoCommand::Text("/settings".to_owned())
        );
        assert_eq!(EchoCommand::parse("/"), EchoCommand::Text("/".to_owned()));
    }
}
