//! Streak Bot Admin Library
//!
//! Maintenance tools for the streak tracking Telegram bot.
//!
//! This crate provides the core functionality for:
//! - Loading bot and database settings from the environment
//! - Checking a bot token against the Telegram Bot API
//! - Inspecting, soft-resetting and hard-resetting user state
//! - Applying a SQL migration, with a manual fallback
//! - Running a minimal echo bot for connectivity checks

pub mod cli;
pub mod config;
pub mod db;
pub mod echo;
pub mod maintenance;
pub mod telegram;
