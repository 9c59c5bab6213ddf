//! Read-only diagnostics over users and their streaks.

use tracing::{debug, info};

use crate::db::{DbError, Row, Streak, UserOrder, UserRecord, UserStore, display_value};

/// Number of rows printed by a broad scan.
pub const SCAN_LIMIT: usize = 5;

/// Columns printed for the most recent user.
pub const LATEST_FIELDS: [&str; 7] = [
    "id",
    "telegram_id",
    "name",
    "level",
    "onboarding_completed",
    "gender",
    "created_at",
];

/// Outcome of a lookup by Telegram id.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// No user has this Telegram id.
    NotFound(i64),
    /// The user and their streak, if one exists yet.
    Found {
        user: UserRecord,
        streak: Option<Streak>,
    },
}

/// Fetches up to `limit` users in insertion order.
pub async fn scan<S: UserStore + ?Sized>(store: &S, limit: usize) -> Result<Vec<Row>, DbError> {
    debug!("Scanning up to {} users", limit);
    let rows = store.list_users(UserOrder::Inserted, limit).await?;
    info!("Fetched {} user rows", rows.len());
    Ok(rows)
}

/// Fetches the most recently created user.
pub async fn latest<S: UserStore + ?Sized>(store: &S) -> Result<Option<Row>, DbError> {
    let rows = store.list_users(UserOrder::NewestFirst, 1).await?;
    Ok(rows.into_iter().next())
}

/// Looks up a user and, only if found, their streak.
///
/// # Errors
///
/// Returns an error if either query fails.
pub async fn lookup<S: UserStore + ?Sized>(store: &S, telegram_id: i64) -> Result<Lookup, DbError> {
    let Some(user) = store.find_user(telegram_id).await? else {
        info!("No user with telegram_id {}", telegram_id);
        return Ok(Lookup::NotFound(telegram_id));
    };

    let streak = store.find_streak(user.user.id).await?;
    info!(
        "Found user {} (streak: {})",
        user.user.id,
        if streak.is_some() { "present" } else { "none" }
    );

    Ok(Lookup::Found { user, streak })
}

/// Renders one row as `key: value` lines for whatever columns came back.
#[must_use]
pub fn render_row(row: &Row) -> String {
    row.iter()
        .map(|(key, value)| format!("  {key}: {}", display_value(value)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders the result of a broad scan.
#[must_use]
pub fn render_scan(rows: &[Row]) -> String {
    if rows.is_empty() {
        return "No users in the table.".to_owned();
    }

    let mut out = vec![format!("Found {} user(s):", rows.len())];
    for (i, row) in rows.iter().enumerate() {
        out.push(String::new());
        out.push(format!("User #{}", i + 1));
        out.push(render_row(row));
    }
    out.join("\n")
}

/// Renders the most recent user with the fixed set of columns.
#[must_use]
pub fn render_latest(row: Option<&Row>) -> String {
    let Some(row) = row else {
        return "No users in the table.".to_owned();
    };

    let mut out = vec!["Most recent user:".to_owned()];
    for field in LATEST_FIELDS {
        let value = row
            .get(field)
            .or_else(|| (field == "name").then(|| row.get("first_name")).flatten())
            .map_or_else(|| "(missing)".to_owned(), display_value);
        out.push(format!("  {field}: {value}"));
    }
    out.join("\n")
}

/// Renders a lookup outcome.
#[must_use]
pub fn render_lookup(lookup: &Lookup) -> String {
    match lookup {
        Lookup::NotFound(telegram_id) => format!("User not found (telegram_id {telegram_id})."),
        Lookup::Found { user, streak } => {
            let mut out = vec![
                format!("User (telegram_id {}):", user.user.telegram_id),
                render_row(&user.fields),
                String::new(),
            ];
            match streak {
                Some(streak) => {
                    out.push("Streak:".to_owned());
                    out.push(format!("  current_streak: {}", streak.current_streak));
                    out.push(format!("  longest_streak: {}", streak.longest_streak));
                }
                None => out.push("No streak yet (new user).".to_owned()),
            }
            out.join("\n")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;

    #[tokio::test]
    async fn test_lookup_unknown_id_skips_streak_query() {
        let store = MemoryStore::new();
        store.add_user(1, 111, 3, true);

        let result = lookup(&store, 972_753_303).await.unwrap();

        assert_eq!(result, Lookup::NotFound(972_753_303));
        assert_eq!(store.calls(), vec!["find_user"]);
        assert!(render_lookup(&result).starts_with("User not found"));
    }

    #[tokio::test]
    async fn test_lookup_user_without_streak() {
        let store = MemoryStore::new();
        store.add_user(4, 444, 2, true);

        let result = lookup(&store, 444).await.unwrap();

        let Lookup::Found { user, streak } = &result else {
            panic!("expected a user");
        };
        assert_eq!(user.user.telegram_id, 444);
        assert!(streak.is_none());
        assert_eq!(store.calls(), vec!["find_user", "find_streak"]);
        assert!(render_lookup(&result).contains("No streak yet"));
    }

    #[tokio::test]
    async fn test_lookup_user_with_streak() {
        let store = MemoryStore::new();
        store.add_user(4, 444, 2, true);
        store.add_streak(10, 4, 3, 12);

        let result = lookup(&store, 444).await.unwrap();
        let text = render_lookup(&result);

        assert!(text.contains("current_streak: 3"));
        assert!(text.contains("longest_streak: 12"));
    }

    #[tokio::test]
    async fn test_scan_limits_and_orders_by_insertion() {
        let store = MemoryStore::new();
        for id in (1..=7).rev() {
            store.add_user(id, id * 100, 1, false);
        }

        let rows = scan(&store, SCAN_LIMIT).await.unwrap();
        let ids: Vec<_> = rows.iter().filter_map(|r| r.get("id")?.as_i64()).collect();

        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_latest_picks_newest() {
        let store = MemoryStore::new();
        store.add_user(1, 100, 1, false);
        store.add_user(3, 300, 1, false);
        store.add_user(2, 200, 1, false);

        let row = latest(&store).await.unwrap();
        let text = render_latest(row.as_ref());

        assert!(text.contains("telegram_id: 300"));
        assert!(text.contains("gender: null"));
    }

    #[test]
    fn test_render_row_iterates_actual_keys() {
        let serde_json::Value::Object(row) = serde_json::json!({"id": 1, "brand_new_column": "x"})
        else {
            unreachable!()
        };
        let text = render_row(&row);
        assert!(text.contains("brand_new_column: x"));
    }

    #[test]
    fn test_render_empty_results() {
        assert_eq!(render_scan(&[]), "No users in the table.");
        assert_eq!(render_latest(None), "No users in the table.");
    }

    #[test]
    fn test_render_latest_marks_missing_fields() {
        let serde_json::Value::Object(row) = serde_json::json!({"id": 1, "first_name": "Olga"})
        else {
            unreachable!()
        };
        let text = render_latest(Some(&row));
        assert!(text.contains("name: Olga"));
        assert!(text.contains("level: (missing)"));
    }
}
