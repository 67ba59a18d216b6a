mod error;
mod guild_config;
mod introductions;
pub mod schema;

pub use error::{Result, StoreError};
pub use guild_config::GuildConfig;
pub use introductions::{AddOutcome, IngestSummary};

use crate::config::Config;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

const IN_MEMORY: &str = ":memory:";

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(config: &Config) -> Result<Self> {
        Self::open(&config.database_url)
    }

    pub fn open(path: &str) -> Result<Self> {
        if path != IN_MEMORY {
            if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn execute_init(&self) -> Result<()> {
        info!("Database: Initializing schema...");
        let conn = self.lock()?;
        conn.execute_batch(schema::SCHEMA)?;
        debug!("Database: Schema initialized successfully");
        Ok(())
    }

    /// Run a synchronous query off the async runtime.
    ///
    /// Callers that await each call in turn observe their writes in issue order.
    pub async fn run_blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| StoreError::Join(e.to_string()))?
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

// Discord snowflakes are stored bit-for-bit in SQLite's signed INTEGER.
fn sql_id(id: u64) -> i64 {
    id as i64
}

fn from_sql_id(id: i64) -> u64 {
    id as u64
}

#[cfg(test)]
pub(crate) fn test_db() -> Database {
    let db = Database::open(IN_MEMORY).unwrap();
    db.execute_init().unwrap();
    db
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let db = test_db();
        db.execute_init().unwrap();

        let conn = db.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('guild_config', 'introductions')")
            .unwrap();
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(tables.len(), 2);
    }

    #[test]
    fn test_snowflake_round_trip() {
        let id = u64::MAX - 7;
        assert_eq!(from_sql_id(sql_id(id)), id);
    }

    #[tokio::test]
    async fn test_run_blocking() {
        let db = test_db();
        db.run_blocking(|db| db.set_intro_channel(1, 42)).await.unwrap();
        let channel = db.run_blocking(|db| db.get_intro_channel(1)).await.unwrap();
        assert_eq!(channel, Some(42));
    }
}
