//! Minimal Bot API client used to validate a bot token.

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::BotConfig;

/// Hint shown when Telegram rejects the token as unauthorized.
pub const UNAUTHORIZED_HINT: &str = "The token was rejected. Check that:\n  \
     - it was copied in full from @BotFather (/mybots -> API Token)\n  \
     - there are no spaces, quotes or line breaks around it in .env\n  \
     - the token was not revoked or regenerated since it was copied";

/// Errors that can occur while talking to the Bot API.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bot API error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl TelegramError {
    /// Whether this error belongs to the "bad credentials" class.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Actionable hint for the error, if there is one.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        if self.is_unauthorized() {
            Some(UNAUTHORIZED_HINT)
        } else {
            None
        }
    }
}

/// Identity record returned by `getMe`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BotIdentity {
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub can_join_groups: bool,
    #[serde(default)]
    pub can_read_all_group_messages: bool,
}

/// Standard Bot API response envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

/// Thin Bot API client.
pub struct BotApi {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl BotApi {
    /// Creates a client for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &BotConfig) -> Result<Self, TelegramError> {
        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            token: config.token.clone(),
        })
    }

    /// Calls `getMe`, performing exactly one request.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError::Unauthorized`] if Telegram rejects the token,
    /// and other variants for transport failures or unexpected responses.
    pub async fn get_me(&self) -> Result<BotIdentity, TelegramError> {
        info!("Calling getMe for token {}", mask_token(&self.token));

        let url = format!("{}/bot{}/getMe", self.api_url, self.token);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| TelegramError::Http(e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TelegramError::Http(e.without_url()))?;
        debug!("getMe responded with HTTP {}", status.as_u16());

        match parse_get_me(status.as_u16(), &body) {
            // Telegram answers 404 for a token it cannot even route.
            Err(TelegramError::Api { code: 404, description }) => {
                let warnings = token_shape_warnings(&self.token);
                if warnings.is_empty() {
                    Err(TelegramError::Api { code: 404, description })
                } else {
                    Err(TelegramError::Unauthorized(format!(
                        "{description} (token looks malformed: {})",
                        warnings.join("; ")
                    )))
                }
            }
            other => other,
        }
    }
}

impl std::fmt::Debug for BotApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotApi")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

/// Interprets a `getMe` response body.
fn parse_get_me(status: u16, body: &str) -> Result<BotIdentity, TelegramError> {
    let Ok(envelope) = serde_json::from_str::<ApiResponse<BotIdentity>>(body) else {
        if status == 401 {
            return Err(TelegramError::Unauthorized(format!("HTTP {status}")));
        }
        return Err(TelegramError::Decode(format!(
            "HTTP {status}: {}",
            truncate_for_log(body, 120)
        )));
    };

    if envelope.ok {
        return envelope
            .result
            .ok_or_else(|| TelegramError::Decode("ok response without result".to_owned()));
    }

    let code = envelope.error_code.unwrap_or_else(|| i64::from(status));
    let description = envelope
        .description
        .unwrap_or_else(|| "no description".to_owned());

    if code == 401 || description.to_lowercase().contains("unauthorized") {
        Err(TelegramError::Unauthorized(description))
    } else {
        Err(TelegramError::Api { code, description })
    }
}

/// Masks a bot token for logging (keeps the bot id, hides the secret).
#[must_use]
pub fn mask_token(token: &str) -> String {
    match token.trim().split_once(':') {
        Some((id, _)) if !id.is_empty() => format!("{id}:***"),
        _ => "***".to_owned(),
    }
}

/// Returns warnings about a token that does not look like `<digits>:<secret>`.
#[must_use]
pub fn token_shape_warnings(token: &str) -> Vec<String> {
    let mut warnings = Vec::new();

    if token != token.trim() {
        warnings.push("token has leading or trailing whitespace".to_owned());
    }

    let trimmed = token.trim();
    if trimmed.starts_with(['"', '\'']) || trimmed.ends_with(['"', '\'']) {
        warnings.push("token is wrapped in quotes".to_owned());
    }

    let unquoted = trimmed.trim_matches(['"', '\'']);
    match unquoted.split_once(':') {
        Some((id, secret)) => {
            if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
                warnings.push("part before ':' should be the numeric bot id".to_owned());
            }
            if secret.is_empty() {
                warnings.push("secret part after ':' is empty".to_owned());
            } else if secret.chars().any(char::is_whitespace) {
                warnings.push("secret part contains whitespace".to_owned());
            }
        }
        None => warnings.push("token has no ':' separator".to_owned()),
    }

    warnings
}

/// Truncates a string for logging purposes.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_owned()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}
