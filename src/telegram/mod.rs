//! Telegram Bot API access.
//!
//! Only what the maintenance tools need: a `getMe` call to check a token,
//! plus helpers for keeping the token out of logs.

mod client;

pub use client::{
    BotApi, BotIdentity, TelegramError, UNAUTHORIZED_HINT, mask_token, token_shape_warnings,
};
