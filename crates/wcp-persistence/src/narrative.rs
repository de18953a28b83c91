//! `series`/`books`/`chapters` tables (`§6` schema contract).
//!
//! The narrator/storytelling agent that reads and writes these rows is an
//! out-of-scope collaborator (`§1`); this adapter only carries enough typed
//! access to exercise the `World -> series -> books -> chapters` cascade
//! delete the schema contract requires.

use sqlx::{Executor, FromRow, Sqlite};
use wcp_domain::error::Result;

#[derive(Debug, Clone, FromRow)]
pub struct Series {
    pub id: i64,
    pub world_id: i64,
    pub title: String,
    pub description: String,
}

pub async fn create_series<'e, E>(
    exec: E,
    world_id: i64,
    title: &str,
    description: &str,
) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query("INSERT INTO series (world_id, title, description) VALUES (?, ?, ?)")
        .bind(world_id)
        .bind(title)
        .bind(description)
        .execute(exec)
        .await?;
    Ok(res.last_insert_rowid())
}

pub async fn list_series_for_world<'e, E>(exec: E, world_id: i64) -> Result<Vec<Series>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, Series>(
        "SELECT id, world_id, title, description FROM series WHERE world_id = ? ORDER BY id",
    )
    .bind(world_id)
    .fetch_all(exec)
    .await?;
    Ok(rows)
}
