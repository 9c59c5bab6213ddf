//! Row types for the `users`, `streaks` and `tasks` tables.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A raw row as returned by the REST interface, keyed by column name.
pub type Row = Map<String, Value>;

/// Table names.
pub const USERS_TABLE: &str = "users";
pub const STREAKS_TABLE: &str = "streaks";
pub const TASKS_TABLE: &str = "tasks";

/// Level a user is put back to by a soft reset.
pub const INITIAL_LEVEL: i32 = 1;

/// Internal surrogate key of a user row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserKey(pub i64);

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The columns of a user row the reset and lookup protocols act on.
///
/// Display-only columns (`name`, `gender`, `created_at`, ...) are not decoded
/// here; they stay in [`UserRecord::fields`] so an unexpected value in one of
/// them never fails a protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserKey,
    pub telegram_id: i64,
    pub level: i32,
    pub onboarding_completed: bool,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl User {
    /// Decodes a user from a raw row.
    pub fn from_row(row: &Row) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(row.clone()))
    }
}

/// A user row together with every column the database returned.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub user: User,
    pub fields: Row,
}

impl UserRecord {
    /// Decodes the typed part of the row and keeps the raw columns.
    pub fn from_row(row: Row) -> Result<Self, serde_json::Error> {
        let user = User::from_row(&row)?;
        Ok(Self { user, fields: row })
    }
}

/// A user's streak counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub id: i64,
    pub user_id: UserKey,
    pub current_streak: u32,
    pub longest_streak: u32,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Renders a JSON value the way a person would read it in a report.
#[must_use]
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_owned(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
