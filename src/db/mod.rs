use async_trait::async_trait;
use chrono::Utc;
use log::info;
use sqlx::{migrate::MigrateDatabase, sqlite::{SqlitePool, SqlitePoolOptions}, Sqlite, Row};
#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::Mutex;

use crate::error::StoreError;

// Id of the last poll this client voted in
pub const ALREADY_VOTED_KEY: &str = "alreadyVoted";
// Token of the current admin session
pub const ADMIN_TOKEN_KEY: &str = "adminToken";

/// Durable key-value state kept between runs of the client.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn clear(&self, key: &str) -> Result<(), StoreError>;
}

pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    pub async fn connect(db_url: &str) -> Result<Self, StoreError> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            info!("Creating session database at {}", db_url);
            Sqlite::create_database(db_url).await?;
        }

        // One connection: the client is single-user, and in-memory databases are per connection
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(db_url)
            .await?;

        Self::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    async fn init_schema(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS session (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT value FROM session WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| row.get::<String, _>("value")))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO session (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key)
            DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM session WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Non-durable store for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemorySessionStore {
    values: Mutex<HashMap<String, String>>,
}

#[cfg(test)]
impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<(), StoreError> {
        self.values().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn exercise(store: &dyn SessionStore) {
        assert_eq!(store.get(ALREADY_VOTED_KEY).await.unwrap(), None);

        store.set(ALREADY_VOTED_KEY, "p1").await.unwrap();
        assert_eq!(store.get(ALREADY_VOTED_KEY).await.unwrap().as_deref(), Some("p1"));

        store.set(ALREADY_VOTED_KEY, "p2").await.unwrap();
        assert_eq!(store.get(ALREADY_VOTED_KEY).await.unwrap().as_deref(), Some("p2"));

        store.clear(ALREADY_VOTED_KEY).await.unwrap();
        assert_eq!(store.get(ALREADY_VOTED_KEY).await.unwrap(), None);

        // clearing a missing key is fine
        store.clear(ADMIN_TOKEN_KEY).await.unwrap();
    }

    #[tokio::test]
    async fn sqlite_store_round_trip() {
        let store = SqliteSessionStore::connect("sqlite::memory:").await.unwrap();
        exercise(&store).await;
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        exercise(&MemorySessionStore::new()).await;
    }
}
