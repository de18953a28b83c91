//! `characters` table adapter. `memory`, `likes`, `dislikes`, `interests`,
//! `beliefs`, and `damage` are JSON-valued columns (`§6`).

use sqlx::{Executor, FromRow, Sqlite};
use wcp_domain::entity::{Character, CharacterClass, DamageEntry, MemoryEntry};
use wcp_domain::error::{Error, Result};

#[derive(FromRow)]
struct CharacterRow {
    id: i64,
    world_id: i64,
    name: String,
    species: String,
    gender: String,
    age: i64,
    description: String,
    backstory: String,
    memory: String,
    likes: String,
    dislikes: String,
    interests: String,
    beliefs: String,
    internal_conflict: String,
    nutrition: f64,
    hydration: f64,
    tiredness: f64,
    alertness: f64,
    damage: String,
    current_area_id: Option<i64>,
    owner_id: Option<String>,
    character_class: String,
}

impl TryFrom<CharacterRow> for Character {
    type Error = Error;
    fn try_from(row: CharacterRow) -> Result<Self> {
        Ok(Character {
            id: row.id,
            world_id: row.world_id,
            name: row.name,
            species: row.species,
            gender: row.gender,
            age: row.age,
            description: row.description,
            backstory: row.backstory,
            memory: serde_json::from_str::<Vec<MemoryEntry>>(&row.memory)?,
            likes: serde_json::from_str(&row.likes)?,
            dislikes: serde_json::from_str(&row.dislikes)?,
            interests: serde_json::from_str(&row.interests)?,
            beliefs: serde_json::from_str(&row.beliefs)?,
            internal_conflict: row.internal_conflict,
            nutrition: row.nutrition,
            hydration: row.hydration,
            tiredness: row.tiredness,
            alertness: row.alertness,
            damage: serde_json::from_str::<Vec<DamageEntry>>(&row.damage)?,
            current_area_id: row.current_area_id,
            owner_id: row.owner_id,
            character_class: row.character_class.parse()?,
        })
    }
}

const SELECT_COLUMNS: &str = "id, world_id, name, species, gender, age, description, backstory, \
     memory, likes, dislikes, interests, beliefs, internal_conflict, \
     nutrition, hydration, tiredness, alertness, damage, \
     current_area_id, owner_id, character_class";

pub async fn get<'e, E>(exec: E, id: i64) -> Result<Option<Character>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, CharacterRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM characters WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(exec)
    .await?;
    row.map(Character::try_from).transpose()
}

pub async fn list_for_world<'e, E>(exec: E, world_id: i64) -> Result<Vec<Character>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, CharacterRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM characters WHERE world_id = ? ORDER BY id"
    ))
    .bind(world_id)
    .fetch_all(exec)
    .await?;
    rows.into_iter().map(Character::try_from).collect()
}

pub async fn list_for_area<'e, E>(exec: E, area_id: i64) -> Result<Vec<Character>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, CharacterRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM characters WHERE current_area_id = ? ORDER BY id"
    ))
    .bind(area_id)
    .fetch_all(exec)
    .await?;
    rows.into_iter().map(Character::try_from).collect()
}

/// Eligibility query for the Agent Scheduler (`§4.5` step 2): unowned,
/// awake, ordered story-first then by id for reproducibility.
pub async fn list_eligible<'e, E>(exec: E, world_id: i64) -> Result<Vec<Character>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, CharacterRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM characters \
         WHERE world_id = ? AND owner_id IS NULL AND alertness >= 20 \
         ORDER BY character_class DESC, id ASC"
    ))
    .bind(world_id)
    .fetch_all(exec)
    .await?;
    rows.into_iter().map(Character::try_from).collect()
}

/// `character_list_awake` WCP tool (`§6`): alertness ≥ 20, regardless of
/// ownership — broader than the scheduler's eligibility query above.
pub async fn list_awake<'e, E>(exec: E, world_id: i64) -> Result<Vec<Character>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, CharacterRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM characters WHERE world_id = ? AND alertness >= 20 ORDER BY id"
    ))
    .bind(world_id)
    .fetch_all(exec)
    .await?;
    rows.into_iter().map(Character::try_from).collect()
}

pub struct NewCharacter<'a> {
    pub world_id: i64,
    pub name: &'a str,
    pub species: &'a str,
    pub gender: &'a str,
    pub age: i64,
    pub description: &'a str,
    pub backstory: &'a str,
    pub likes: &'a [String],
    pub dislikes: &'a [String],
    pub interests: &'a [String],
    pub beliefs: &'a [String],
    pub internal_conflict: &'a str,
    pub current_area_id: Option<i64>,
    pub character_class: CharacterClass,
}

pub async fn create<'e, E>(exec: E, new: NewCharacter<'_>) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(
        "INSERT INTO characters (world_id, name, species, gender, age, description, backstory, \
         memory, likes, dislikes, interests, beliefs, internal_conflict, \
         nutrition, hydration, tiredness, alertness, damage, current_area_id, owner_id, character_class) \
         VALUES (?, ?, ?, ?, ?, ?, ?, '[]', ?, ?, ?, ?, ?, 100, 100, 0, 100, '[]', ?, NULL, ?)",
    )
    .bind(new.world_id)
    .bind(new.name)
    .bind(new.species)
    .bind(new.gender)
    .bind(new.age)
    .bind(new.description)
    .bind(new.backstory)
    .bind(serde_json::to_string(new.likes)?)
    .bind(serde_json::to_string(new.dislikes)?)
    .bind(serde_json::to_string(new.interests)?)
    .bind(serde_json::to_string(new.beliefs)?)
    .bind(new.internal_conflict)
    .bind(new.current_area_id)
    .bind(new.character_class.as_str())
    .execute(exec)
    .await?;
    Ok(res.last_insert_rowid())
}

/// Persist a character's mutable fields after a kernel mutator. Identity
/// fields (`name`, `species`, ...) never change through the mutators in
/// `§4.1`, so only the mutable columns are written.
pub async fn save<'e, E>(exec: E, c: &Character) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "UPDATE characters SET memory = ?, nutrition = ?, hydration = ?, tiredness = ?, \
         alertness = ?, damage = ?, current_area_id = ?, owner_id = ? WHERE id = ?",
    )
    .bind(serde_json::to_string(&c.memory)?)
    .bind(c.nutrition)
    .bind(c.hydration)
    .bind(c.tiredness)
    .bind(c.alertness)
    .bind(serde_json::to_string(&c.damage)?)
    .bind(c.current_area_id)
    .bind(&c.owner_id)
    .bind(c.id)
    .execute(exec)
    .await?;
    Ok(())
}

/// Set (or clear) `owner_id` directly, bypassing the full `save` path —
/// used by the Session & Ownership Layer's `claim`/`release` (`§4.3`),
/// which touches only this one column.
pub async fn set_owner<'e, E>(exec: E, id: i64, owner_id: Option<&str>) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE characters SET owner_id = ? WHERE id = ?")
        .bind(owner_id)
        .bind(id)
        .execute(exec)
        .await?;
    Ok(())
}

pub async fn delete<'e, E>(exec: E, id: i64) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query("DELETE FROM characters WHERE id = ?")
        .bind(id)
        .execute(exec)
        .await?;
    Ok(res.rows_affected() > 0)
}
