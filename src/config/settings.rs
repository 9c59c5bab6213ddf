//! Bot and database settings loaded from the environment.

use std::fmt;

use reqwest::Url;

/// Default Telegram Bot API endpoint.
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Telegram bot configuration.
#[derive(Clone)]
pub struct BotConfig {
    /// Bot token issued by @BotFather.
    pub token: String,

    /// Base URL of the Bot API server.
    pub api_url: String,
}

impl BotConfig {
    /// Creates a new bot configuration against the public Bot API.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_url: DEFAULT_TELEGRAM_API_URL.to_owned(),
        }
    }

    /// Overrides the Bot API base URL.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Creates configuration from environment variables.
    ///
    /// Expects `TELEGRAM_BOT_TOKEN` to be set and non-empty.
    /// `TELEGRAM_API_URL` optionally points at another Bot API server.
    ///
    /// # Errors
    ///
    /// Returns an error if `TELEGRAM_BOT_TOKEN` is missing or blank, or if
    /// `TELEGRAM_API_URL` is set but is not an http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = required_var("TELEGRAM_BOT_TOKEN")?;

        let api_url = std::env::var("TELEGRAM_API_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_owned());
        parse_http_url("TELEGRAM_API_URL", &api_url)?;

        Ok(Self { token, api_url })
    }
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Hosted database (Supabase) configuration.
#[derive(Clone)]
pub struct DatabaseConfig {
    /// Project URL, e.g. `https://abcd.supabase.co`.
    pub url: String,

    /// Service role key used for both `apikey` and bearer auth.
    pub service_key: String,
}

impl DatabaseConfig {
    /// Creates a new database configuration.
    #[must_use]
    pub fn new(url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            service_key: service_key.into(),
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Expects `SUPABASE_URL` and `SUPABASE_SERVICE_KEY` to be set.
    ///
    /// # Errors
    ///
    /// Returns an error if `SUPABASE_URL` or `SUPABASE_SERVICE_KEY` is missing
    /// or blank, or if the URL is not an http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = required_var("SUPABASE_URL")?;
        parse_http_url("SUPABASE_URL", &url)?;

        let service_key = required_var("SUPABASE_SERVICE_KEY")?;

        Ok(Self { url, service_key })
    }

    /// Parsed project URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse or is not http(s).
    pub fn parsed_url(&self) -> Result<Url, ConfigError> {
        parse_http_url("SUPABASE_URL", &self.url)
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url)
            .field("service_key", &"<redacted>")
            .finish()
    }
}

/// Reads a variable that must be present and non-blank.
///
/// The value is returned as-is (not trimmed) so callers can report
/// stray whitespace instead of silently hiding it.
fn required_var(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnvVar(name)),
    }
}

fn parse_http_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|e| ConfigError::InvalidUrl {
        name,
        reason: e.to_string(),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl {
            name,
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    Ok(url)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid URL in {name}: {reason}")]
    InvalidUrl { name: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_config_new() {
        let config = BotConfig::new("123:abc");
        assert_eq!(config.token, "123:abc");
        assert_eq!(config.api_url, DEFAULT_TELEGRAM_API_URL);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let bot = BotConfig::new("123:very-secret");
        let db = DatabaseConfig::new("https://abcd.supabase.co", "service-secret");

        assert!(!format!("{bot:?}").contains("very-secret"));
        assert!(!format!("{db:?}").contains("service-secret"));
        assert!(format!("{db:?}").contains("abcd.supabase.co"));
    }

    #[test]
    fn test_parse_http_url() {
        assert!(parse_http_url("X", "https://abcd.supabase.co").is_ok());
        assert!(parse_http_url("X", "http://127.0.0.1:54321").is_ok());
        assert!(matches!(
            parse_http_url("X", "ftp://example.com"),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_http_url("X", "not a url"),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_parsed_url() {
        let db = DatabaseConfig::new("https://abcd.supabase.co/", "key");
        let url = db.parsed_url().unwrap();
        assert_eq!(url.host_str(), Some("abcd.supabase.co"));
    }
}
