//! PostgREST client for the hosted database.
//!
//! Requests go to `{project}/rest/v1/{table}` with PostgREST filter syntax
//! (`column=eq.value`, `order=column.desc`, `limit=n`). Stored procedures
//! are called through `{project}/rest/v1/rpc/{function}`.

use std::fmt;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::models::Row;
use crate::config::{ConfigError, DatabaseConfig};

/// PostgREST error code for "function not found in the schema cache".
const FUNCTION_NOT_FOUND: &str = "PGRST202";

/// Errors returned by the database client.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid header value for {0}")]
    InvalidHeader(&'static str),

    #[error("Database returned HTTP {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Remote procedure '{function}' is not available: {message}")]
    UnsupportedOperation { function: String, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Sort direction for `order=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Filter, ordering and limit parameters of a table request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Query {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality filter.
    #[must_use]
    pub fn eq(mut self, column: &str, value: impl fmt::Display) -> Self {
        self.params.push((column.to_owned(), format!("eq.{value}")));
        self
    }

    /// Sets the ordering column.
    #[must_use]
    pub fn order(mut self, column: &str, direction: Direction) -> Self {
        self.params
            .push(("order".to_owned(), format!("{column}.{}", direction.as_str())));
        self
    }

    /// Limits the number of rows returned.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.params.push(("limit".to_owned(), limit.to_string()));
        self
    }

    /// Restricts the returned columns.
    #[must_use]
    pub fn select(mut self, columns: &str) -> Self {
        self.params.push(("select".to_owned(), columns.to_owned()));
        self
    }

    /// Query parameters in insertion order.
    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// Error body returned by PostgREST.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

/// Client handle for the hosted database.
///
/// Built once per process from [`DatabaseConfig`] and shared by reference.
pub struct SupabaseClient {
    http: reqwest::Client,
    rest_url: Url,
}

impl SupabaseClient {
    /// Creates a client for the given project.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the key is not a valid header value.
    pub fn new(config: &DatabaseConfig) -> Result<Self, DbError> {
        let base = config.parsed_url()?;
        let rest_url = Url::parse(&format!(
            "{}/rest/v1/",
            base.as_str().trim_end_matches('/')
        ))
        .map_err(|e| ConfigError::InvalidUrl {
            name: "SUPABASE_URL",
            reason: e.to_string(),
        })?;

        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(&config.service_key)
            .map_err(|_| DbError::InvalidHeader("apikey"))?;
        key.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.service_key))
            .map_err(|_| DbError::InvalidHeader("authorization"))?;
        bearer.set_sensitive(true);
        headers.insert(HeaderName::from_static("apikey"), key);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self { http, rest_url })
    }

    /// Base REST endpoint (`{project}/rest/v1/`).
    #[must_use]
    pub fn rest_url(&self) -> &Url {
        &self.rest_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, DbError> {
        self.rest_url.join(path).map_err(|e| {
            DbError::Config(ConfigError::InvalidUrl {
                name: "SUPABASE_URL",
                reason: e.to_string(),
            })
        })
    }

    fn request(&self, method: Method, path: &str, query: &Query) -> Result<RequestBuilder, DbError> {
        let url = self.endpoint(path)?;
        debug!("{} {} {:?}", method, url.path(), query.params());
        Ok(self.http.request(method, url).query(query.params()))
    }

    /// Selects rows from a table.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    pub async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, DbError> {
        let request = self.request(Method::GET, table, query)?;
        let body = send(request).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Updates matching rows and returns them as stored after the update.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    pub async fn update(&self, table: &str, query: &Query, patch: &Value) -> Result<Vec<Row>, DbError> {
        let request = self
            .request(Method::PATCH, table, query)?
            .header("Prefer", "return=representation")
            .json(patch);
        let body = send(request).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Deletes matching rows and returns the deleted rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    pub async fn delete(&self, table: &str, query: &Query) -> Result<Vec<Row>, DbError> {
        let request = self
            .request(Method::DELETE, table, query)?
            .header("Prefer", "return=representation");
        let body = send(request).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Calls a stored procedure with named arguments.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::UnsupportedOperation`] if the function does not exist.
    pub async fn rpc(&self, function: &str, args: &Value) -> Result<Value, DbError> {
        let request = self
            .request(Method::POST, &format!("rpc/{function}"), &Query::new())?
            .json(args);

        send(request).await.map_err(|err| match err {
            DbError::Remote { status, message } if is_missing_function(status, &message) => {
                DbError::UnsupportedOperation {
                    function: function.to_owned(),
                    message,
                }
            }
            other => other,
        })
    }
}

impl fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("rest_url", &self.rest_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Sends a request and returns the JSON body, mapping non-2xx responses.
async fn send(request: RequestBuilder) -> Result<Value, DbError> {
    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(remote_error(status, &text));
    }

    if text.trim().is_empty() {
        return Ok(Value::Array(Vec::new()));
    }

    Ok(serde_json::from_str(&text)?)
}

fn remote_error(status: StatusCode, text: &str) -> DbError {
    let body: ErrorBody = serde_json::from_str(text).unwrap_or_default();

    let mut message = match (body.code, body.message) {
        (Some(code), Some(message)) => format!("[{code}] {message}"),
        (None, Some(message)) => message,
        (Some(code), None) => format!("[{code}]"),
        (None, None) if text.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_owned(),
        (None, None) => text.trim().to_owned(),
    };
    if let Some(hint) = body.hint {
        message.push_str(" (hint: ");
        message.push_str(&hint);
        message.push(')');
    }

    DbError::Remote {
        status: status.as_u16(),
        message,
    }
}

fn is_missing_function(status: u16, message: &str) -> bool {
    message.contains(FUNCTION_NOT_FOUND) || status == StatusCode::NOT_FOUND.as_u16()
}
