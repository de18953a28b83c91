//! Session & Ownership Layer (`§4.3`, `§2` ~5% share).
//!
//! An in-memory map `token -> Session`, process-local per `§9` ("Session
//! storage. Process-local is acceptable for the core; note clearly that
//! horizontal scaling requires externalising the session map."). Guarded
//! by a single `parking_lot::RwLock` across the whole map, matching
//! `§5`'s "Shared resources" guidance.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use rand::RngCore;
use sqlx::SqlitePool;
use std::collections::HashMap;

use wcp_domain::entity::Session;
use wcp_domain::error::{Error, Result};
use wcp_domain::trace::TraceEvent;
use wcp_persistence::characters;

pub struct SessionStore {
    pool: SqlitePool,
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(pool: SqlitePool, ttl_hours: i64) -> Self {
        Self {
            pool,
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// `claim(playerId, characterId)` (`§4.3`). Idempotent for the same
    /// player: a second claim by the same owner reuses/refreshes the
    /// session rather than erroring.
    pub async fn claim(&self, player_id: &str, character_id: i64) -> Result<String> {
        let character = characters::get(&self.pool, character_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("character {character_id}")))?;

        if let Some(owner) = &character.owner_id {
            if owner != player_id {
                return Err(Error::AlreadyOwned(format!(
                    "character {character_id} is owned by another player"
                )));
            }
        } else {
            characters::set_owner(&self.pool, character_id, Some(player_id)).await?;
        }

        // Reuse an existing live session for this (player, character) pair
        // rather than minting a second one — idempotent claim.
        let existing_token = {
            let sessions = self.sessions.read();
            sessions
                .iter()
                .find(|(_, s)| s.character_id == character_id && s.player_id == player_id)
                .map(|(token, _)| token.clone())
        };
        if let Some(token) = existing_token {
            self.touch(&token);
            TraceEvent::SessionClaimed {
                player_id: player_id.to_string(),
                character_id,
                reused: true,
            }
            .emit();
            return Ok(token);
        }

        let token = generate_token();
        let now = Utc::now();
        let session = Session {
            token: token.clone(),
            player_id: player_id.to_string(),
            character_id,
            created_at: now,
            last_activity: now,
        };
        self.sessions.write().insert(token.clone(), session);

        TraceEvent::SessionClaimed {
            player_id: player_id.to_string(),
            character_id,
            reused: false,
        }
        .emit();

        Ok(token)
    }

    /// `validate(token)` (`§4.3`). Lazily expires sessions older than the
    /// configured TTL on lookup.
    pub fn validate(&self, token: &str) -> Option<Session> {
        {
            let sessions = self.sessions.read();
            let session = sessions.get(token)?;
            if Utc::now() - session.created_at > self.ttl {
                drop(sessions);
                self.expire(token);
                return None;
            }
        }
        self.touch(token);
        self.sessions.read().get(token).cloned()
    }

    fn touch(&self, token: &str) {
        if let Some(session) = self.sessions.write().get_mut(token) {
            session.last_activity = Utc::now();
        }
    }

    fn expire(&self, token: &str) {
        if let Some(session) = self.sessions.write().remove(token) {
            TraceEvent::SessionExpired {
                token_prefix: token.chars().take(8).collect(),
                character_id: session.character_id,
            }
            .emit();
        }
    }

    /// `release(characterId)` (`§4.3`): clears ownership and drops every
    /// session for that character.
    pub async fn release(&self, character_id: i64) -> Result<()> {
        characters::set_owner(&self.pool, character_id, None).await?;
        self.sessions
            .write()
            .retain(|_, s| s.character_id != character_id);
        TraceEvent::SessionReleased { character_id }.emit();
        Ok(())
    }

    /// `canControl(playerId, characterId)` (`§4.3`).
    pub async fn can_control(&self, player_id: &str, character_id: i64) -> Result<bool> {
        let character = characters::get(&self.pool, character_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("character {character_id}")))?;
        Ok(character.owner_id.as_deref() == Some(player_id))
    }

    /// Background sweep at the configured cadence (`§4.3`: "Background
    /// sweep at 1-hour cadence"). Removes every session older than the TTL.
    pub fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let ttl = self.ttl;
        let mut sessions = self.sessions.write();
        let expired: Vec<(String, i64)> = sessions
            .iter()
            .filter(|(_, s)| now - s.created_at > ttl)
            .map(|(t, s)| (t.clone(), s.character_id))
            .collect();
        sessions.retain(|_, s| now - s.created_at <= ttl);
        drop(sessions);
        for (token, character_id) in &expired {
            TraceEvent::SessionExpired {
                token_prefix: token.chars().take(8).collect(),
                character_id: *character_id,
            }
            .emit();
        }
        expired.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }
}

/// Spawn the `§4.3` background sweep task on the given interval.
pub fn spawn_gc(store: std::sync::Arc<SessionStore>, interval_secs: u64) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        loop {
            interval.tick().await;
            let removed = store.sweep_expired();
            if removed > 0 {
                tracing::info!(removed, "session gc sweep removed expired sessions");
            }
        }
    })
}

/// Opaque, high-entropy (≥128 bit) session token (`§4.3`).
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::str::FromStr;
    use wcp_domain::entity::CharacterClass;
    use wcp_persistence::{migrations, worlds};

    async fn test_pool() -> (tempfile::TempDir, SqlitePool) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("t.db").display());
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

    async fn seed_character(pool: &SqlitePool) -> i64 {
        let world_id = worlds::create(pool, "W", "").await.unwrap();
        characters::create(
            pool,
            characters::NewCharacter {
                world_id,
                name: "C",
                species: "human",
                gender: "",
                age: 20,
                description: "",
                backstory: "",
                likes: &[],
                dislikes: &[],
                interests: &[],
                beliefs: &[],
                internal_conflict: "",
                current_area_id: None,
                character_class: CharacterClass::Minor,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn claim_is_idempotent_for_same_player() {
        let (_dir, pool) = test_pool().await;
        let character_id = seed_character(&pool).await;
        let store = SessionStore::new(pool, 24);

        let t1 = store.claim("p1", character_id).await.unwrap();
        let t2 = store.claim("p1", character_id).await.unwrap();
        assert_eq!(t1, t2);
        assert!(store.validate(&t1).is_some());
        assert!(store.validate(&t2).is_some());
    }

    #[tokio::test]
    async fn second_player_cannot_claim_owned_character() {
        let (_dir, pool) = test_pool().await;
        let character_id = seed_character(&pool).await;
        let store = SessionStore::new(pool, 24);

        store.claim("p1", character_id).await.unwrap();
        let err = store.claim("p2", character_id).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyOwned(_)));

        store.release(character_id).await.unwrap();
        let token = store.claim("p2", character_id).await.unwrap();
        assert!(store.validate(&token).is_some());
    }

    #[tokio::test]
    async fn release_clears_owner_and_sessions() {
        let (_dir, pool) = test_pool().await;
        let character_id = seed_character(&pool).await;
        let store = SessionStore::new(pool.clone(), 24);

        let token = store.claim("p1", character_id).await.unwrap();
        store.release(character_id).await.unwrap();

        assert!(store.validate(&token).is_none());
        let character = characters::get(&pool, character_id).await.unwrap().unwrap();
        assert!(character.owner_id.is_none());
    }
}
