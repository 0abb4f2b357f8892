//! SQLite implementation of the KeyStore trait.
//!
//! This is the persistent backend. It uses rusqlite with bundled SQLite,
//! wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use permseal_core::{DataKey, KeyId, PermissionKeyRecord};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::KeyStore;

/// SQLite-based key store.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
#[derive(Debug, Clone)]
pub struct SqliteKeyStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteKeyStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file (and parent directories) and runs migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Every record for `permission`, active or retired, oldest first.
    pub async fn records_for(&self, permission: &str) -> Result<Vec<PermissionKeyRecord>> {
        let permission = permission.to_string();
        self.run(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT key_id, permission, key, active, created_at FROM permission_keys
                 WHERE permission = ?1
                 ORDER BY created_at, rowid",
            )?;
            let rows = stmt
                .query_map(params![permission], raw_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows.into_iter().map(record_from_raw).collect()
        })
        .await
    }

    /// Run a blocking closure against the connection on the blocking pool.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| StoreError::Unavailable(format!("mutex poisoned: {}", e)))?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("spawn_blocking failed: {}", e)))?
    }
}

/// Columns as stored, before validation.
struct RawRow {
    key_id: String,
    permission: String,
    key_hex: String,
    active: bool,
    created_at: i64,
}

fn raw_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        key_id: row.get("key_id")?,
        permission: row.get("permission")?,
        key_hex: row.get("key")?,
        active: row.get("active")?,
        created_at: row.get("created_at")?,
    })
}

fn record_from_raw(raw: RawRow) -> Result<PermissionKeyRecord> {
    let key_id: KeyId = raw
        .key_id
        .parse()
        .map_err(|e| StoreError::InvalidData(format!("{}", e)))?;

    let key_bytes = hex::decode(&raw.key_hex).map_err(|e| {
        StoreError::InvalidData(format!("key {} is not valid hex: {}", key_id, e))
    })?;
    let key = DataKey::from_slice(&key_bytes)
        .map_err(|e| StoreError::InvalidData(format!("key {}: {}", key_id, e)))?;

    Ok(PermissionKeyRecord {
        permission: raw.permission,
        key_id,
        key,
        active: raw.active,
        created_at: raw.created_at,
    })
}

#[async_trait]
impl KeyStore for SqliteKeyStore {
    async fn find_active_keys(&self) -> Result<Vec<PermissionKeyRecord>> {
        self.run(|conn| {
            let mut stmt = conn.prepare(
                "SELECT key_id, permission, key, active, created_at FROM permission_keys
                 WHERE active = 1
                 ORDER BY created_at, rowid",
            )?;
            let rows = stmt
                .query_map([], raw_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows.into_iter().map(record_from_raw).collect()
        })
        .await
    }

    async fn mark_inactive(&self, permission: &str) -> Result<()> {
        let permission = permission.to_string();
        self.run(move |conn| {
            let retired = conn.execute(
                "UPDATE permission_keys SET active = 0 WHERE permission = ?1 AND active = 1",
                params![permission],
            )?;
            tracing::trace!(%permission, retired, "marked permission keys inactive");
            Ok(())
        })
        .await
    }

    async fn insert(&self, record: &PermissionKeyRecord) -> Result<()> {
        let record = record.clone();
        self.run(move |conn| {
            let key_id = record.key_id.to_string();

            let existing: Option<String> = conn
                .query_row(
                    "SELECT key_id FROM permission_keys WHERE key_id = ?1",
                    params![key_id],
                    |row| row.get(0),
                )
                .optional()?;
            if existing.is_some() {
                return Err(StoreError::DuplicateKeyId(record.key_id));
            }

            conn.execute(
                "INSERT INTO permission_keys (key_id, permission, key, active, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    key_id,
                    record.permission,
                    hex::encode(record.key.as_bytes()),
                    record.active,
                    record.created_at,
                ],
            )?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(permission: &str) -> PermissionKeyRecord {
        PermissionKeyRecord::new_active(permission, DataKey::generate())
    }

    #[tokio::test]
    async fn test_insert_and_find_active() {
        let store = SqliteKeyStore::open_memory().unwrap();
        let r = record("canViewSkills");

        store.insert(&r).await.unwrap();

        let active = store.find_active_keys().await.unwrap();
        assert_eq!(active, vec![r]);
    }

    #[tokio::test]
    async fn test_mark_inactive_retires_all_active_rows() {
        let store = SqliteKeyStore::open_memory().unwrap();
        let a = record("canViewSkills");
        let b = record("canViewSkills");
        let other = record("canManageTeam");
        store.insert(&a).await.unwrap();
        store.insert(&b).await.unwrap();
        store.insert(&other).await.unwrap();

        store.mark_inactive("canViewSkills").await.unwrap();

        let active = store.find_active_keys().await.unwrap();
        assert_eq!(active, vec![other]);

        let history = store.records_for("canViewSkills").await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|r| !r.active));
        assert_eq!(history[0].key, a.key);
    }

    #[tokio::test]
    async fn test_duplicate_key_id_rejected() {
        let store = SqliteKeyStore::open_memory().unwrap();
        let r = record("canViewSkills");

        store.insert(&r).await.unwrap();
        let err = store.insert(&r).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKeyId(id) if id == r.key_id));
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("keys.db");
        let r = record("canEditOwnSkills");

        {
            let store = SqliteKeyStore::open(&path).unwrap();
            store.insert(&r).await.unwrap();
        }

        let reopened = SqliteKeyStore::open(&path).unwrap();
        let active = reopened.find_active_keys().await.unwrap();
        assert_eq!(active, vec![r]);
    }

    #[tokio::test]
    async fn test_corrupt_key_is_invalid_data() {
        let store = SqliteKeyStore::open_memory().unwrap();
        store
            .run(|conn| {
                conn.execute(
                    "INSERT INTO permission_keys (key_id, permission, key, active, created_at)
                     VALUES ('0b5e6f0c-8d1a-4c6e-9a55-3f7b2f0e9d11', 'canViewSkills', 'abcd', 1, 0)",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let err = store.find_active_keys().await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }
}
