//! `areas` table adapter. `exits` and `triggers` are JSON-valued columns
//! (`§6` schema contract) decoded here so every other crate works with
//! `Area`'s native `HashMap`/`Vec<Trigger>` fields.

use sqlx::{Executor, FromRow, Sqlite};
use std::collections::HashMap;
use wcp_domain::entity::Area;
use wcp_domain::error::{Error, Result};
use wcp_domain::trigger::Trigger;

#[derive(FromRow)]
struct AreaRow {
    id: i64,
    world_id: i64,
    name: String,
    description: String,
    temperature: f64,
    exits: String,
    triggers: String,
}

impl TryFrom<AreaRow> for Area {
    type Error = Error;
    fn try_from(row: AreaRow) -> Result<Self> {
        let exits: HashMap<String, i64> = serde_json::from_str(&row.exits)?;
        let triggers: Vec<Trigger> = serde_json::from_str(&row.triggers)?;
        Ok(Area {
            id: row.id,
            world_id: row.world_id,
            name: row.name,
            description: row.description,
            temperature: row.temperature,
            exits,
            triggers,
        })
    }
}

const SELECT_COLUMNS: &str =
    "id, world_id, name, description, temperature, exits, triggers";

pub async fn list_for_world<'e, E>(exec: E, world_id: i64) -> Result<Vec<Area>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, AreaRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM areas WHERE world_id = ? ORDER BY id"
    ))
    .bind(world_id)
    .fetch_all(exec)
    .await?;
    rows.into_iter().map(Area::try_from).collect()
}

pub async fn get<'e, E>(exec: E, id: i64) -> Result<Option<Area>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, AreaRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM areas WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(exec)
    .await?;
    row.map(Area::try_from).transpose()
}

pub struct NewArea<'a> {
    pub world_id: i64,
    pub name: &'a str,
    pub description: &'a str,
    pub temperature: f64,
    pub exits: HashMap<String, i64>,
}

pub async fn create<'e, E>(exec: E, new: NewArea<'_>) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let exits_json = serde_json::to_string(&new.exits)?;
    let res = sqlx::query(
        "INSERT INTO areas (world_id, name, description, temperature, exits, triggers) \
         VALUES (?, ?, ?, ?, ?, '[]')",
    )
    .bind(new.world_id)
    .bind(new.name)
    .bind(new.description)
    .bind(new.temperature)
    .bind(exits_json)
    .execute(exec)
    .await?;
    Ok(res.last_insert_rowid())
}

/// Persist a full `Area` (used after trigger reactions mutate `exits`,
/// `description`, `temperature`, or `triggers`; `§4.2`).
pub async fn save<'e, E>(exec: E, area: &Area) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let exits_json = serde_json::to_string(&area.exits)?;
    let triggers_json = serde_json::to_string(&area.triggers)?;
    sqlx::query(
        "UPDATE areas SET name = ?, description = ?, temperature = ?, exits = ?, triggers = ? \
         WHERE id = ?",
    )
    .bind(&area.name)
    .bind(&area.description)
    .bind(area.temperature)
    .bind(exits_json)
    .bind(triggers_json)
    .bind(area.id)
    .execute(exec)
    .await?;
    Ok(())
}
