//! String-keyed local storage with a size quota

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use libsql::params;

use super::Database;
use crate::error::{Error, Result};
use crate::util::unix_millis_now;

/// Trait for string key-value storage (async)
#[allow(async_fn_in_trait)]
pub trait KeyValueStore {
    /// Read the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the value stored under `key`
    ///
    /// Fails with [`Error::QuotaExceeded`] when the write would push the
    /// store over its quota; the previous value is left untouched.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete the value stored under `key`, if any
    async fn remove(&self, key: &str) -> Result<()>;
}

/// libSQL implementation of [`KeyValueStore`]
pub struct LocalStorage {
    db: Database,
    quota_bytes: usize,
}

impl LocalStorage {
    /// Wrap an opened database with the given quota
    pub const fn new(db: Database, quota_bytes: usize) -> Self {
        Self { db, quota_bytes }
    }

    /// Bytes currently held by every key except `excluded_key`
    async fn bytes_excluding(&self, excluded_key: &str) -> Result<usize> {
        let mut rows = self
            .db
            .connection()
            .query(
                "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
                 FROM storage_entries
                 WHERE key != ?",
                [excluded_key],
            )
            .await?;

        let total: i64 = if let Some(row) = rows.next().await? {
            row.get(0)?
        } else {
            0
        };
        Ok(usize::try_from(total).unwrap_or(usize::MAX))
    }
}

impl KeyValueStore for LocalStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut rows = self
            .db
            .connection()
            .query("SELECT value FROM storage_entries WHERE key = ?", [key])
            .await?;

        if let Some(row) = rows.next().await? {
            let value: String = row.get(0)?;
            Ok(Some(value))
        } else {
            Ok(None)
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let required = self.bytes_excluding(key).await? + key.len() + value.len();
        check_quota(required, self.quota_bytes)?;

        self.db
            .connection()
            .execute(
                "INSERT OR REPLACE INTO storage_entries (key, value, updated_at) VALUES (?, ?, ?)",
                params![key, value, unix_millis_now()],
            )
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.db
            .connection()
            .execute("DELETE FROM storage_entries WHERE key = ?", [key])
            .await?;
        Ok(())
    }
}

/// In-memory implementation of [`KeyValueStore`]
///
/// Clones share the same entries.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
    quota_bytes: usize,
}

impl MemoryStorage {
    /// Create an empty store with the given quota
    pub fn new(quota_bytes: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(BTreeMap::new())),
            quota_bytes,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|error| Error::Database(error.to_string()))
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new(usize::MAX)
    }
}

impl KeyValueStore for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.lock()?;
        let others = entries
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(existing, stored)| existing.len() + stored.len())
            .sum::<usize>();
        check_quota(others + key.len() + value.len(), self.quota_bytes)?;

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

fn check_quota(required: usize, quota: usize) -> Result<()> {
    if required > quota {
        Err(Error::QuotaExceeded { required, quota })
    } else {
        Ok(())
    }
}
