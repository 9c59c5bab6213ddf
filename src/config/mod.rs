//! Configuration module for the maintenance tools.
//!
//! Every tool loads its settings from the environment exactly once,
//! before any network call is made.

mod settings;

pub use settings::{BotConfig, ConfigError, DEFAULT_TELEGRAM_API_URL, DatabaseConfig};
