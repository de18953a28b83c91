//! `worlds` table adapter (`§3` World, `§6` cascade-delete contract).

use sqlx::{Executor, Sqlite};
use wcp_domain::entity::World;
use wcp_domain::error::Result;

pub async fn list<'e, E>(exec: E) -> Result<Vec<World>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, World>("SELECT id, name, description FROM worlds ORDER BY id")
        .fetch_all(exec)
        .await?;
    Ok(rows)
}

pub async fn get<'e, E>(exec: E, id: i64) -> Result<Option<World>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, World>("SELECT id, name, description FROM worlds WHERE id = ?")
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(row)
}

pub async fn create<'e, E>(exec: E, name: &str, description: &str) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query("INSERT INTO worlds (name, description) VALUES (?, ?)")
        .bind(name)
        .bind(description)
        .execute(exec)
        .await?;
    Ok(res.last_insert_rowid())
}

/// Cascade delete: `World -> {styles, areas, characters, items, series}`
/// (`§3` Lifecycles). Foreign keys carry `ON DELETE CASCADE`, so a single
/// delete on `worlds` is sufficient once `PRAGMA foreign_keys = ON` (set at
/// connect time in `pool::connect`).
pub async fn delete<'e, E>(exec: E, id: i64) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query("DELETE FROM worlds WHERE id = ?")
        .bind(id)
        .execute(exec)
        .await?;
    Ok(res.rows_affected() > 0)
}
