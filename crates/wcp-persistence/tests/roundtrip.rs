use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::collections::HashMap;
use std::str::FromStr;
use wcp_domain::entity::CharacterClass;
use wcp_persistence::{areas, characters, items, migrations, worlds};

async fn test_pool() -> (tempfile::TempDir, sqlx::SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let url = format!("sqlite://{}", db_path.display());
    let opts = SqliteConnectOptions::from_str(&url)
        .unwrap()
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await
        .unwrap();
    migrations::run(&pool).await.unwrap();
    (dir, pool)
}

#[tokio::test]
async fn world_area_character_item_roundtrip() {
    let (_dir, pool) = test_pool().await;

    let world_id = worlds::create(&pool, "Testworld", "a world for tests")
        .await
        .unwrap();

    let area_id = areas::create(
        &pool,
        areas::NewArea {
            world_id,
            name: "Tavern",
            description: "A dim tavern.",
            temperature: 18.0,
            exits: HashMap::new(),
        },
    )
    .await
    .unwrap();

    let character_id = characters::create(
        &pool,
        characters::NewCharacter {
            world_id,
            name: "Mira",
            species: "human",
            gender: "female",
            age: 27,
            description: "a wandering bard",
            backstory: "left home young",
            likes: &[],
            dislikes: &[],
            interests: &[],
            beliefs: &[],
            internal_conflict: "",
            current_area_id: Some(area_id),
            character_class: CharacterClass::Minor,
        },
    )
    .await
    .unwrap();

    let item_id = items::create(
        &pool,
        items::NewItem {
            world_id,
            name: "Torch",
            description: "a lit torch",
            properties: &HashMap::new(),
            current_area_id: Some(area_id),
        },
    )
    .await
    .unwrap();

    let character = characters::get(&pool, character_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(character.nutrition, 100.0);
    assert_eq!(character.alertness, 100.0);
    assert_eq!(character.current_area_id, Some(area_id));

    let item = items::get(&pool, item_id).await.unwrap().unwrap();
    assert_eq!(item.current_area_id, Some(area_id));
    assert!(item.held_by_character_id.is_none());

    let in_area = items::list_for_area(&pool, area_id).await.unwrap();
    assert_eq!(in_area.len(), 1);

    // Cascade delete: deleting the world removes the area/character/item.
    worlds::delete(&pool, world_id).await.unwrap();
    assert!(areas::get(&pool, area_id).await.unwrap().is_none());
    assert!(characters::get(&pool, character_id).await.unwrap().is_none());
    assert!(items::get(&pool, item_id).await.unwrap().is_none());
}

#[tokio::test]
async fn migration_tracker_records_applied_migration() {
    let (_dir, pool) = test_pool().await;
    let status = migrations::status(&pool).await.unwrap();
    assert!(status.iter().any(|m| m.name.contains("init")));
}
