//! Storage operations the maintenance protocols are written against.

use async_trait::async_trait;
use serde_json::json;

use super::client::{DbError, Direction, Query, SupabaseClient};
use super::models::{
    INITIAL_LEVEL, Row, STREAKS_TABLE, Streak, TASKS_TABLE, USERS_TABLE, User, UserKey, UserRecord,
};

/// Ordering used when listing users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserOrder {
    /// Insertion order (ascending surrogate key).
    Inserted,
    /// Most recently created first.
    NewestFirst,
}

/// Read, update and delete operations on user state.
///
/// Nothing here creates users; they only come from the bot's onboarding.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Lists up to `limit` user rows with every column.
    async fn list_users(&self, order: UserOrder, limit: usize) -> Result<Vec<Row>, DbError>;

    /// Finds a user by Telegram id.
    async fn find_user(&self, telegram_id: i64) -> Result<Option<UserRecord>, DbError>;

    /// Finds the streak row of a user.
    async fn find_streak(&self, user: UserKey) -> Result<Option<Streak>, DbError>;

    /// Puts the user back to level 1 with onboarding not completed.
    ///
    /// Returns the updated rows; empty when no user has that Telegram id.
    async fn reset_progress(&self, telegram_id: i64, updated_at: &str) -> Result<Vec<User>, DbError>;

    /// Zeroes `current_streak` of a streak row, leaving `longest_streak` alone.
    async fn reset_current_streak(&self, streak_id: i64, updated_at: &str) -> Result<Option<Streak>, DbError>;

    /// Deletes every streak row of a user, returning how many were removed.
    async fn delete_streaks(&self, user: UserKey) -> Result<usize, DbError>;

    /// Deletes every task row of a user, returning how many were removed.
    async fn delete_tasks(&self, user: UserKey) -> Result<usize, DbError>;

    /// Deletes the user row itself.
    async fn delete_user(&self, user: UserKey) -> Result<usize, DbError>;

    /// Runs raw SQL through a remote procedure.
    async fn execute_sql(&self, function: &str, sql: &str) -> Result<(), DbError>;
}

#[async_trait]
impl UserStore for SupabaseClient {
    async fn list_users(&self, order: UserOrder, limit: usize) -> Result<Vec<Row>, DbError> {
        let query = match order {
            UserOrder::Inserted => Query::new().select("*").order("id", Direction::Asc),
            UserOrder::NewestFirst => Query::new().select("*").order("created_at", Direction::Desc),
        };
        self.select(USERS_TABLE, &query.limit(limit)).await
    }

    async fn find_user(&self, telegram_id: i64) -> Result<Option<UserRecord>, DbError> {
        let query = Query::new().select("*").eq("telegram_id", telegram_id).limit(1);
        let rows = self.select(USERS_TABLE, &query).await?;

        match rows.into_iter().next() {
            Some(row) => Ok(Some(UserRecord::from_row(row)?)),
            None => Ok(None),
        }
    }

    async fn find_streak(&self, user: UserKey) -> Result<Option<Streak>, DbError> {
        let query = Query::new().select("*").eq("user_id", user).limit(1);
        let rows = self.select(STREAKS_TABLE, &query).await?;

        rows.into_iter()
            .next()
            .map(|row| serde_json::from_value(row.into()))
            .transpose()
            .map_err(DbError::from)
    }

    async fn reset_progress(&self, telegram_id: i64, updated_at: &str) -> Result<Vec<User>, DbError> {
        let patch = json!({
            "level": INITIAL_LEVEL,
            "onboarding_completed": false,
            "updated_at": updated_at,
        });
        let rows = self
            .update(USERS_TABLE, &Query::new().eq("telegram_id", telegram_id), &patch)
            .await?;

        rows.iter()
            .map(User::from_row)
            .collect::<Result<_, _>>()
            .map_err(DbError::from)
    }

    async fn reset_current_streak(&self, streak_id: i64, updated_at: &str) -> Result<Option<Streak>, DbError> {
        let patch = json!({
            "current_streak": 0,
            "updated_at": updated_at,
        });
        let rows = self
            .update(STREAKS_TABLE, &Query::new().eq("id", streak_id), &patch)
            .await?;

        rows.into_iter()
            .next()
            .map(|row| serde_json::from_value(row.into()))
            .transpose()
            .map_err(DbError::from)
    }

    async fn delete_streaks(&self, user: UserKey) -> Result<usize, DbError> {
        let rows = self.delete(STREAKS_TABLE, &Query::new().eq("user_id", user)).await?;
        Ok(rows.len())
    }

    async fn delete_tasks(&self, user: UserKey) -> Result<usize, DbError> {
        let rows = self.delete(TASKS_TABLE, &Query::new().eq("user_id", user)).await?;
        Ok(rows.len())
    }

    async fn delete_user(&self, user: UserKey) -> Result<usize, DbError> {
        let rows = self.delete(USERS_TABLE, &Query::new().eq("id", user)).await?;
        Ok(rows.len())
    }

    async fn execute_sql(&self, function: &str, sql: &str) -> Result<(), DbError> {
        self.rpc(function, &json!({ "sql": sql })).await.map(|_| ())
    }
}
