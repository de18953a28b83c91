//! `items` table adapter. `properties` is a JSON-valued column (`§6`); the
//! location invariant (area XOR holder) is a `CHECK` constraint in schema
//! and re-verified in `Item::location_invariant_holds` at the domain layer.

use sqlx::{Executor, FromRow, Sqlite};
use std::collections::HashMap;
use wcp_domain::entity::Item;
use wcp_domain::error::{Error, Result};

#[derive(FromRow)]
struct ItemRow {
    id: i64,
    world_id: i64,
    name: String,
    description: String,
    properties: String,
    current_area_id: Option<i64>,
    held_by_character_id: Option<i64>,
    held_location: Option<String>,
}

impl TryFrom<ItemRow> for Item {
    type Error = Error;
    fn try_from(row: ItemRow) -> Result<Self> {
        let properties: HashMap<String, serde_json::Value> =
            serde_json::from_str(&row.properties)?;
        Ok(Item {
            id: row.id,
            world_id: row.world_id,
            name: row.name,
            description: row.description,
            properties,
            current_area_id: row.current_area_id,
            held_by_character_id: row.held_by_character_id,
            held_location: row.held_location,
        })
    }
}

const SELECT_COLUMNS: &str =
    "id, world_id, name, description, properties, current_area_id, held_by_character_id, held_location";

pub async fn get<'e, E>(exec: E, id: i64) -> Result<Option<Item>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, ItemRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM items WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(exec)
    .await?;
    row.map(Item::try_from).transpose()
}

pub async fn list_for_area<'e, E>(exec: E, area_id: i64) -> Result<Vec<Item>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, ItemRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM items WHERE current_area_id = ? ORDER BY id"
    ))
    .bind(area_id)
    .fetch_all(exec)
    .await?;
    rows.into_iter().map(Item::try_from).collect()
}

pub async fn list_held_by<'e, E>(exec: E, character_id: i64) -> Result<Vec<Item>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, ItemRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM items WHERE held_by_character_id = ? ORDER BY id"
    ))
    .bind(character_id)
    .fetch_all(exec)
    .await?;
    rows.into_iter().map(Item::try_from).collect()
}

pub struct NewItem<'a> {
    pub world_id: i64,
    pub name: &'a str,
    pub description: &'a str,
    pub properties: &'a HashMap<String, serde_json::Value>,
    pub current_area_id: Option<i64>,
}

pub async fn create<'e, E>(exec: E, new: NewItem<'_>) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let properties_json = serde_json::to_string(new.properties)?;
    let res = sqlx::query(
        "INSERT INTO items (world_id, name, description, properties, current_area_id, \
         held_by_character_id, held_location) VALUES (?, ?, ?, ?, ?, NULL, NULL)",
    )
    .bind(new.world_id)
    .bind(new.name)
    .bind(new.description)
    .bind(properties_json)
    .bind(new.current_area_id)
    .execute(exec)
    .await?;
    Ok(res.last_insert_rowid())
}

/// Move the item into a character's hand (`pickup`, `§4.1`).
pub async fn set_held<'e, E>(
    exec: E,
    item_id: i64,
    character_id: i64,
    held_location: &str,
) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "UPDATE items SET current_area_id = NULL, held_by_character_id = ?, held_location = ? \
         WHERE id = ?",
    )
    .bind(character_id)
    .bind(held_location)
    .bind(item_id)
    .execute(exec)
    .await?;
    Ok(())
}

/// Restore the item to an area (`drop`, `§4.1`).
pub async fn set_area<'e, E>(exec: E, item_id: i64, area_id: i64) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "UPDATE items SET current_area_id = ?, held_by_character_id = NULL, held_location = NULL \
         WHERE id = ?",
    )
    .bind(area_id)
    .bind(item_id)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn delete<'e, E>(exec: E, id: i64) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query("DELETE FROM items WHERE id = ?")
        .bind(id)
        .execute(exec)
        .await?;
    Ok(res.rows_affected() > 0)
}
