//! Echo test bot.
//!
//! Answers `/start`, `/help` and `/ping`, echoes any other text back.
//! Used to confirm the token and connectivity by hand.

mod handler;
mod types;

pub use handler::{EchoBot, PING_REPLY, reply_for};
pub use types::EchoCommand;
