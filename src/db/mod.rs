//! Hosted database access.
//!
//! [`SupabaseClient`] talks PostgREST over HTTP; the maintenance protocols
//! only see the [`UserStore`] trait it implements.

mod client;
#[cfg(test)]
pub(crate) mod memory;
mod models;
mod store;

pub use client::{DbError, Direction, Query, SupabaseClient};
pub use models::{
    INITIAL_LEVEL, Row, STREAKS_TABLE, Streak, TASKS_TABLE, USERS_TABLE, User, UserKey,
    UserRecord, display_value,
};
pub use store::{UserOrder, UserStore};
