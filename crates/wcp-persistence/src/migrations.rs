//! Migration runner (`§6` "Migrations").
//!
//! Forward SQL lives in `migrations/NNNN_name.sql`, the matching rollback in
//! `migrations/NNNN_name.down.sql`. Application is delegated to
//! `sqlx::migrate!`, which tracks its own `_sqlx_migrations` bookkeeping
//! table and natively understands the `.down.sql` convention for
//! `Migrator::undo`. Alongside it we maintain the literal `migrations(id,
//! name UNIQUE, executed_at)` table the schema contract names, so the
//! `doctor`/`config` CLI surface can report status without reaching into
//! sqlx's internal table.

use sqlx::{Row, SqlitePool};
use wcp_domain::error::Result;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Apply all pending migrations, then mirror them into the `migrations`
/// tracker table.
pub async fn run(pool: &SqlitePool) -> Result<()> {
    ensure_tracker_table(pool).await?;
    MIGRATOR.run(pool).await.map_err(|e| {
        wcp_domain::error::Error::Fatal(format!("migration failed: {e}"))
    })?;
    sync_tracker(pool).await
}

/// Roll back the most recently applied migration (`§6`: "Rollback reverses
/// the most recent record").
pub async fn rollback_last(pool: &SqlitePool) -> Result<Option<String>> {
    let last = sqlx::query("SELECT id, name FROM migrations ORDER BY id DESC LIMIT 1")
        .fetch_optional(pool)
        .await?;
    let Some(row) = last else {
        return Ok(None);
    };
    let version: i64 = row.get("id");
    let name: String = row.get("name");

    let target = (version - 1).max(0) as i64;
    MIGRATOR
        .undo(pool, target)
        .await
        .map_err(|e| wcp_domain::error::Error::Fatal(format!("rollback failed: {e}")))?;

    sqlx::query("DELETE FROM migrations WHERE id = ?")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(Some(name))
}

/// Status rows for `doctor`/`config show` (`§4.8` CLI).
pub async fn status(pool: &SqlitePool) -> Result<Vec<MigrationStatus>> {
    ensure_tracker_table(pool).await?;
    let rows = sqlx::query("SELECT id, name, executed_at FROM migrations ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(rows
        .into_iter()
        .map(|r| MigrationStatus {
            id: r.get("id"),
            name: r.get("name"),
            executed_at: r.get("executed_at"),
        })
        .collect())
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MigrationStatus {
    pub id: i64,
    pub name: String,
    pub executed_at: String,
}

async fn ensure_tracker_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS migrations (\
            id INTEGER PRIMARY KEY, \
            name TEXT NOT NULL UNIQUE, \
            executed_at TEXT NOT NULL\
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn sync_tracker(pool: &SqlitePool) -> Result<()> {
    let applied = sqlx::query("SELECT version, description, installed_on FROM _sqlx_migrations ORDER BY version")
        .fetch_all(pool)
        .await?;
    for row in applied {
        let version: i64 = row.get("version");
        let description: String = row.get("description");
        let installed_on: chrono::DateTime<chrono::Utc> = row.get("installed_on");
        sqlx::query(
            "INSERT INTO migrations (id, name, executed_at) VALUES (?, ?, ?) \
             ON CONFLICT(id) DO NOTHING",
        )
        .bind(version)
        .bind(description)
        .bind(installed_on.to_rfc3339())
        .execute(pool)
        .await?;
    }
    Ok(())
}
