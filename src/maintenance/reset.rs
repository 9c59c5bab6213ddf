//! Soft and hard resets of a user's state.
//!
//! Soft reset keeps the user row and puts it back before onboarding.
//! Hard reset removes the user and everything that references it, in
//! three explicit phases:
//!
//! 1. [`resolve`] the Telegram id to the surrogate key
//! 2. [`cascade_delete`] streaks and tasks by that key
//! 3. [`delete_user`] by that key
//!
//! The key must be captured before anything is deleted: once the user row
//! is gone the Telegram id no longer resolves.

use chrono::{SecondsFormat, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::db::{DbError, Streak, User, UserKey, UserStore};

/// Errors that can occur during a reset.
#[derive(Debug, Error)]
pub enum ResetError {
    #[error("User with telegram_id {0} not found")]
    UserNotFound(i64),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// What happened to the user's streak during a soft reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreakOutcome {
    /// The streak was zeroed; `longest_streak` is as before.
    Reset(Streak),
    /// The user has no streak row yet.
    Missing,
}

/// Result of a soft reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftResetReport {
    /// The user row as stored after the update.
    pub user: User,
    pub streak: StreakOutcome,
}

/// Rows removed by [`cascade_delete`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub streaks: usize,
    pub tasks: usize,
}

/// Result of a hard reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardResetReport {
    pub key: UserKey,
    pub dependents: CascadeReport,
    pub users_deleted: usize,
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Puts a user back to level 1 with onboarding not completed and zeroes
/// the current streak.
///
/// Applying it twice leaves the same state. `longest_streak` is never
/// written.
///
/// # Errors
///
/// Returns [`ResetError::UserNotFound`] if no user has that Telegram id.
pub async fn soft_reset<S: UserStore + ?Sized>(
    store: &S,
    telegram_id: i64,
) -> Result<SoftResetReport, ResetError> {
    let at = now();

    let updated = store.reset_progress(telegram_id, &at).await?;
    let Some(user) = updated.into_iter().next() else {
        return Err(ResetError::UserNotFound(telegram_id));
    };
    info!(
        "User {} reset to level {} (onboarding_completed: {})",
        user.id, user.level, user.onboarding_completed
    );

    let streak = match store.find_streak(user.id).await? {
        Some(existing) => match store.reset_current_streak(existing.id, &at).await? {
            Some(streak) => {
                info!(
                    "Streak {} reset (longest kept at {})",
                    streak.id, streak.longest_streak
                );
                StreakOutcome::Reset(streak)
            }
            None => {
                warn!("Streak {} disappeared before it could be reset", existing.id);
                StreakOutcome::Missing
            }
        },
        None => {
            info!("User {} has no streak yet", user.id);
            StreakOutcome::Missing
        }
    };

    Ok(SoftResetReport { user, streak })
}

/// Phase 1 of a hard reset: captures the surrogate key.
///
/// # Errors
///
/// Returns [`ResetError::UserNotFound`] if no user has that Telegram id.
pub async fn resolve<S: UserStore + ?Sized>(
    store: &S,
    telegram_id: i64,
) -> Result<UserKey, ResetError> {
    store
        .find_user(telegram_id)
        .await?
        .map(|record| record.user.id)
        .ok_or(ResetError::UserNotFound(telegram_id))
}

/// Phase 2 of a hard reset: deletes streaks and tasks owned by `key`.
///
/// Deleting zero rows is not an error.
pub async fn cascade_delete<S: UserStore + ?Sized>(
    store: &S,
    key: UserKey,
) -> Result<CascadeReport, DbError> {
    let streaks = store.delete_streaks(key).await?;
    let tasks = store.delete_tasks(key).await?;
    info!("Deleted {} streak(s) and {} task(s) of user {}", streaks, tasks, key);
    Ok(CascadeReport { streaks, tasks })
}

/// Phase 3 of a hard reset: deletes the user row.
pub async fn delete_user<S: UserStore + ?Sized>(store: &S, key: UserKey) -> Result<usize, DbError> {
    let deleted = store.delete_user(key).await?;
    if deleted == 0 {
        warn!("User {} was already gone", key);
    }
    Ok(deleted)
}

/// Removes a user and all their dependent rows.
///
/// # Errors
///
/// Returns [`ResetError::UserNotFound`] before deleting anything if no user
/// has that Telegram id; database errors abort at the failing phase.
pub async fn hard_reset<S: UserStore + ?Sized>(
    store: &S,
    telegram_id: i64,
) -> Result<HardResetReport, ResetError> {
    let key = resolve(store, telegram_id).await?;
    let dependents = cascade_delete(store, key).await?;
    let users_deleted = delete_user(store, key).await?;

    Ok(HardResetReport {
        key,
        dependents,
        users_deleted,
    })
}

/// Renders a soft reset report.
#[must_use]
pub fn render_soft_reset(report: &SoftResetReport) -> String {
    let user = &report.user;
    let mut lines = vec![
        format!("✓ User {} (telegram_id {}) reset:", user.id, user.telegram_id),
        format!("  level: {}", user.level),
        format!("  onboarding_completed: {}", user.onboarding_completed),
        format!("  updated_at: {}", user.updated_at.as_deref().unwrap_or("-")),
    ];

    match &report.streak {
        StreakOutcome::Reset(streak) => lines.push(format!(
            "✓ Streak reset: current_streak {} (longest_streak {} kept)",
            streak.current_streak, streak.longest_streak
        )),
        StreakOutcome::Missing => lines.push("ℹ No streak row for this user.".to_owned()),
    }

    lines.join("\n")
}

/// Renders a hard reset report.
#[must_use]
pub fn render_hard_reset(telegram_id: i64, report: &HardResetReport) -> String {
    format!(
        "✓ Deleted user {} (telegram_id {telegram_id})\n  \
         streaks removed: {}\n  \
         tasks removed: {}\n  \
         user rows removed: {}",
        report.key, report.dependents.streaks, report.dependents.tasks, report.users_deleted
    )
}
