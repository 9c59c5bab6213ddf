//! Applying a single SQL migration file.
//!
//! Remote SQL execution is usually disabled on hosted projects, so falling
//! back to manual application is the common path. The SQL itself is
//! expected to be idempotent (`IF NOT EXISTS` and friends); nothing records
//! whether a migration was applied.

use std::path::{Path, PathBuf};

use reqwest::Url;
use thiserror::Error;
use tracing::{info, warn};

use crate::db::{DbError, UserStore};

/// Name of the remote procedure that runs raw SQL.
pub const DEFAULT_EXEC_FUNCTION: &str = "exec_sql";

/// Errors that can occur while reading a migration.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Migration file not found or unreadable: {}: {source}", .path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Migration file is empty: {}", .0.display())]
    Empty(PathBuf),
}

/// Why the migration has to be applied by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManualReason {
    /// The remote SQL procedure does not exist.
    Unsupported(String),
    /// The remote call was made and failed.
    Failed(String),
    /// The caller asked to skip the remote call.
    Requested,
}

/// Result of applying a migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    Applied,
    ManualRequired { sql: String, reason: ManualReason },
}

/// Reads a migration file as UTF-8 text.
///
/// # Errors
///
/// Returns an error if the file cannot be read or holds only whitespace.
pub fn read_sql(path: impl AsRef<Path>) -> Result<String, MigrationError> {
    let path = path.as_ref();
    let sql = std::fs::read_to_string(path).map_err(|source| MigrationError::NotFound {
        path: path.to_path_buf(),
        source,
    })?;

    if sql.trim().is_empty() {
        return Err(MigrationError::Empty(path.to_path_buf()));
    }

    Ok(sql)
}

/// Submits the SQL through `function`, falling back to manual application.
///
/// Never retries. The SQL text is handed back untouched on every
/// fallback path.
pub async fn apply<S: UserStore + ?Sized>(store: &S, function: &str, sql: String) -> MigrationOutcome {
    info!("Submitting migration ({} bytes) via rpc/{}", sql.len(), function);

    match store.execute_sql(function, &sql).await {
        Ok(()) => {
            info!("Migration applied remotely");
            MigrationOutcome::Applied
        }
        Err(DbError::UnsupportedOperation { message, .. }) => {
            warn!("Remote SQL execution unavailable: {}", message);
            MigrationOutcome::ManualRequired {
                sql,
                reason: ManualReason::Unsupported(message),
            }
        }
        Err(e) => {
            warn!("Remote SQL execution failed: {}", e);
            MigrationOutcome::ManualRequired {
                sql,
                reason: ManualReason::Failed(e.to_string()),
            }
        }
    }
}

/// Dashboard SQL editor URL for a `*.supabase.co` project URL.
#[must_use]
pub fn dashboard_url(project_url: &str) -> Option<String> {
    let url = Url::parse(project_url.trim()).ok()?;
    let host = url.host_str()?;
    let project = host.strip_suffix(".supabase.co")?;

    if project.is_empty() || project.contains('.') {
        return None;
    }

    Some(format!("https://supabase.com/dashboard/project/{project}/sql/new"))
}

/// Builds the manual application instructions, including the full SQL.
#[must_use]
pub fn manual_instructions(sql: &str, reason: &ManualReason, dashboard: Option<&str>) -> String {
    let why = match reason {
        ManualReason::Unsupported(message) => {
            format!("Remote SQL execution is not available ({message}).")
        }
        ManualReason::Failed(message) => format!("Remote SQL execution failed: {message}"),
        ManualReason::Requested => "Remote execution skipped on request.".to_owned(),
    };

    let editor = dashboard.map_or_else(
        || "Open your project's dashboard and go to the SQL Editor.".to_owned(),
        |url| format!("Open the SQL Editor: {url}"),
    );

    let rule = "-".repeat(60);

    format!(
        "{why}\n\
         Apply the migration manually:\n  \
         1. {editor}\n  \
         2. Create a new query and paste the SQL below.\n  \
         3. Click Run.\n\n\
         Expected outcome: the statements finish without errors. Notices such as\n\
         \"already exists, skipping\" are fine, the migration is safe to run again.\n\n\
         {rule}\n\
         {sql}\n\
         {rule}",
        sql = sql.trim_end()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;

    const SQL: &str = "ALTER TABLE users ADD COLUMN IF NOT EXISTS gender text;\n";

    #[tokio::test]
    async fn test_apply_success() {
        let store = MemoryStore::new();
        let outcome = apply(&store, DEFAULT_EXEC_FUNCTION, SQL.to_owned()).await;
        assert_eq!(outcome, MigrationOutcome::Applied);
        assert_eq!(store.calls(), vec!["execute_sql"]);
    }

    #[tokio::test]
    async fn test_apply_unsupported_falls_back_with_full_sql() {
        let store = MemoryStore::new().with_sql_error(|| DbError::UnsupportedOperation {
            function: "exec_sql".to_owned(),
            message: "PGRST202".to_owned(),
        });

        let outcome = apply(&store, DEFAULT_EXEC_FUNCTION, SQL.to_owned()).await;

        assert_eq!(
            outcome,
            MigrationOutcome::ManualRequired {
                sql: SQL.to_owned(),
                reason: ManualReason::Unsupported("PGRST202".to_owned()),
            }
        );
        assert_eq!(store.calls(), vec!["execute_sql"]);
    }

    #[tokio::test]
    async fn test_apply_remote_failure_falls_back() {
        let store = MemoryStore::new().with_sql_error(|| DbError::Remote {
            status: 500,
            message: "boom".to_owned(),
        });

        let outcome = apply(&store, DEFAULT_EXEC_FUNCTION, SQL.to_owned()).await;

        let MigrationOutcome::ManualRequired { sql, reason } = outcome else {
            panic!("expected manual fallback");
        };
        assert_eq!(sql, SQL);
        assert!(matches!(reason, ManualReason::Failed(ref m) if m.contains("boom")));
    }

    #[test]
    fn test_manual_instructions_contain_sql() {
        let text = manual_instructions(
            SQL,
            &ManualReason::Requested,
            Some("https://supabase.com/dashboard/project/abcd/sql/new"),
        );
        assert!(text.contains(SQL.trim_end()));
        assert!(text.contains("project/abcd/sql/new"));
        assert!(text.contains("Click Run"));
    }

    #[test]
    fn test_dashboard_url() {
        assert_eq!(
            dashboard_url("https://abcd1234.supabase.co"),
            Some("https://supabase.com/dashboard/project/abcd1234/sql/new".to_owned())
        );
        assert_eq!(dashboard_url("http://127.0.0.1:54321"), None);
        assert_eq!(dashboard_url("https://db.example.com"), None);
    }

    #[test]
    fn test_read_sql_missing_file() {
        let err = read_sql("/definitely/not/here.sql").unwrap_err();
        assert!(matches!(err, MigrationError::NotFound { .. }));
    }

    #[test]
    fn test_read_sql_roundtrip_and_empty() {
        let dir = tempfile::tempdir().unwrap();

        let good = dir.path().join("add_gender.sql");
        std::fs::write(&good, SQL).unwrap();
        assert_eq!(read_sql(&good).unwrap(), SQL);

        let empty = dir.path().join("empty.sql");
        std::fs::write(&empty, "  \n").unwrap();
        assert!(matches!(read_sql(&empty), Err(MigrationError::Empty(_))));
    }
}
