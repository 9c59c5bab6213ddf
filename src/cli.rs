//! Shared command-line plumbing for the maintenance binaries.

use clap::Args;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Options every tool accepts.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env", global = true)]
    pub env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,
}

impl CommonArgs {
    /// Initializes logging, then loads the .env file.
    ///
    /// `default_level` applies when neither `--log-level` nor `RUST_LOG` is set.
    pub fn init(&self, default_level: &str) {
        init_logging(self.log_level.as_deref().unwrap_or(default_level));

        if let Err(e) = dotenvy::from_filename(&self.env_file) {
            debug!("Could not load .env file ({}): {}", self.env_file, e);
        }
    }
}

/// Initializes the logging subsystem.
///
/// Logs go to stderr so reports on stdout stay clean.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
