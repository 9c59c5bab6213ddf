//! In-memory [`UserStore`] used by the protocol tests.
//!
//! Every call is recorded so tests can assert which queries were issued.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::client::DbError;
use super::models::{INITIAL_LEVEL, Row, Streak, User, UserKey, UserRecord};
use super::store::{UserOrder, UserStore};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<Row>,
    streaks: Vec<Streak>,
    tasks: Vec<UserKey>,
    calls: Vec<&'static str>,
}

/// Recording in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    sql_error: Option<fn() -> DbError>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `execute_sql` fail with the error built by `make`.
    pub fn with_sql_error(mut self, make: fn() -> DbError) -> Self {
        self.sql_error = Some(make);
        self
    }

    pub fn add_user(&self, id: i64, telegram_id: i64, level: i32, onboarding_completed: bool) {
        let row = json!({
            "id": id,
            "telegram_id": telegram_id,
            "name": format!("user{id}"),
            "level": level,
            "onboarding_completed": onboarding_completed,
            "gender": null,
            "created_at": format!("2024-01-{:02}T00:00:00+00:00", id.clamp(1, 28)),
            "updated_at": null,
        });
        if let Value::Object(row) = row {
            self.lock().users.push(row);
        }
    }

    pub fn add_streak(&self, id: i64, user: i64, current: u32, longest: u32) {
        self.lock().streaks.push(Streak {
            id,
            user_id: UserKey(user),
            current_streak: current,
            longest_streak: longest,
            updated_at: None,
        });
    }

    pub fn add_task(&self, user: i64) {
        self.lock().tasks.push(UserKey(user));
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.lock().calls.clone()
    }

    pub fn user(&self, telegram_id: i64) -> Option<User> {
        self.lock()
            .users
            .iter()
            .filter_map(|row| User::from_row(row).ok())
            .find(|u| u.telegram_id == telegram_id)
    }

    pub fn streak_of(&self, user: i64) -> Option<Streak> {
        self.lock()
            .streaks
            .iter()
            .find(|s| s.user_id == UserKey(user))
            .cloned()
    }

    pub fn task_count(&self, user: i64) -> usize {
        self.lock().tasks.iter().filter(|k| **k == UserKey(user)).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn record(&self, call: &'static str) -> std::sync::MutexGuard<'_, Tables> {
        let mut tables = self.lock();
        tables.calls.push(call);
        tables
    }
}

fn row_i64(row: &Row, key: &str) -> Option<i64> {
    row.get(key).and_then(Value::as_i64)
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn list_users(&self, order: UserOrder, limit: usize) -> Result<Vec<Row>, DbError> {
        let tables = self.record("list_users");
        let mut rows = tables.users.clone();
        match order {
            UserOrder::Inserted => rows.sort_by_key(|r| row_i64(r, "id")),
            UserOrder::NewestFirst => rows.sort_by(|a, b| {
                let key = |r: &Row| r.get("created_at").and_then(Value::as_str).map(str::to_owned);
                key(b).cmp(&key(a))
            }),
        }
        rows.truncate(limit);
        Ok(rows)
    }

    async fn find_user(&self, telegram_id: i64) -> Result<Option<UserRecord>, DbError> {
        let tables = self.record("find_user");
        let row = tables
            .users
            .iter()
            .find(|r| row_i64(r, "telegram_id") == Some(telegram_id))
            .cloned();
        drop(tables);

        row.map(UserRecord::from_row).transpose().map_err(DbError::from)
    }

    async fn find_streak(&self, user: UserKey) -> Result<Option<Streak>, DbError> {
        let tables = self.record("find_streak");
        Ok(tables.streaks.iter().find(|s| s.user_id == user).cloned())
    }

    async fn reset_progress(&self, telegram_id: i64, updated_at: &str) -> Result<Vec<User>, DbError> {
        let mut tables = self.record("reset_progress");
        let mut updated = Vec::new();
        for row in &mut tables.users {
            if row_i64(row, "telegram_id") == Some(telegram_id) {
                row.insert("level".to_owned(), json!(INITIAL_LEVEL));
                row.insert("onboarding_completed".to_owned(), json!(false));
                row.insert("updated_at".to_owned(), json!(updated_at));
                updated.push(User::from_row(row)?);
            }
        }
        Ok(updated)
    }

    async fn reset_current_streak(&self, streak_id: i64, updated_at: &str) -> Result<Option<Streak>, DbError> {
        let mut tables = self.record("reset_current_streak");
        Ok(tables.streaks.iter_mut().find(|s| s.id == streak_id).map(|s| {
            s.current_streak = 0;
            s.updated_at = Some(updated_at.to_owned());
            s.clone()
        }))
    }

    async fn delete_streaks(&self, user: UserKey) -> Result<usize, DbError> {
        let mut tables = self.record("delete_streaks");
        let before = tables.streaks.len();
        tables.streaks.retain(|s| s.user_id != user);
        Ok(before - tables.streaks.len())
    }

    async fn delete_tasks(&self, user: UserKey) -> Result<usize, DbError> {
        let mut tables = self.record("delete_tasks");
        let before = tables.tasks.len();
        tables.tasks.retain(|k| *k != user);
        Ok(before - tables.tasks.len())
    }

    async fn delete_user(&self, user: UserKey) -> Result<usize, DbError> {
        let mut tables = self.record("delete_user");
        let before = tables.users.len();
        tables.users.retain(|r| row_i64(r, "id") != Some(user.0));
        Ok(before - tables.users.len())
    }

    async fn execute_sql(&self, _function: &str, _sql: &str) -> Result<(), DbError> {
        drop(self.record("execute_sql"));
        match self.sql_error {
            Some(make) => Err(make()),
            None => Ok(()),
        }
    }
}
