use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;

use super::PrimaryBackend;
use crate::error::{Result, VaultError};

/// SQLite-backed primary store: a single `kv` table of JSON documents.
///
/// The database is opened per operation on the blocking thread pool, so an
/// unavailable file surfaces as an error on that operation only.
pub struct SqliteBackend {
    path: PathBuf,
}

impl SqliteBackend {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the database, creating the table on first use
    fn open(path: &Path) -> Result<Connection> {
        let conn = Connection::open(path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(conn)
    }

    async fn run_blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(Connection) -> Result<T> + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || op(Self::open(&path)?))
            .await
            .map_err(|e| VaultError::Storage(format!("SQLite task failed: {}", e)))?
    }
}

#[async_trait]
impl PrimaryBackend for SqliteBackend {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let key = key.to_string();
        self.run_blocking(move |conn| {
            let raw: Option<String> = conn
                .query_row("SELECT value FROM kv WHERE key = ?1", [&key], |row| row.get(0))
                .optional()?;
            match raw {
                Some(text) => Ok(Some(serde_json::from_str(&text)?)),
                None => Ok(None),
            }
        })
        .await
    }

    async fn put(&self, key: &str, value: &Value) -> Result<()> {
        let key = key.to_string();
        let text = serde_json::to_string(value)?;
        self.run_blocking(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                [&key, &text],
            )?;
            Ok(())
        })
        .await
    }
}

impl From<rusqlite::Error> for VaultError {
    fn from(e: rusqlite::Error) -> Self {
        VaultError::Storage(format!("SQLite error: {}", e))
    }
}
