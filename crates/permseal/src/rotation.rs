//! Key creation and rotation.
//!
//! The [`KeyManager`] owns the store handle and the [`KeyCache`]. A data key
//! moves `absent → active → retired` and never back: creating or rotating a
//! key first retires the permission's active rows, then appends the new one.
//! The two store writes are not atomic; a failure between them leaves the
//! permission with no active row, which the next call repairs.

use permseal_core::{DataKey, KeyId, PermissionKeyRecord};
use permseal_store::KeyStore;

use crate::cache::KeyCache;
use crate::error::Result;

/// Lazily creates and rotates per-permission data keys.
#[derive(Debug)]
pub struct KeyManager<S: KeyStore> {
    store: S,
    cache: KeyCache,
}

impl<S: KeyStore> KeyManager<S> {
    /// Bulk-load all active keys from the store into a fresh cache.
    pub async fn load(store: S) -> Result<Self> {
        let records = store.find_active_keys().await?;
        let cache = KeyCache::from_records(records);
        tracing::debug!(permissions = cache.len(), "loaded active permission keys");

        Ok(Self { store, cache })
    }

    /// Use a pre-built cache.
    pub fn with_cache(store: S, cache: KeyCache) -> Self {
        Self { store, cache }
    }

    /// The store backing this manager.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The active key cache.
    pub fn cache(&self) -> &KeyCache {
        &self.cache
    }

    /// The active key for `permission`, creating one on first use.
    ///
    /// A cache hit touches no store. A miss runs mark-inactive then insert; a
    /// store failure aborts the call and leaves the cache untouched.
    pub async fn obtain_or_create_key(&self, permission: &str) -> Result<DataKey> {
        if let Some(key) = self.cache.get(permission) {
            return Ok(key);
        }

        let key = DataKey::generate();
        let key_id = self.activate(permission, &key).await?;
        self.cache.insert(permission, key.clone());
        tracing::debug!(%permission, %key_id, "created data key");

        Ok(key)
    }

    /// Replace the active key for `permission` unconditionally.
    ///
    /// The previous key is retired, not deleted; tokens sealed with it still
    /// open because they carry the key themselves.
    pub async fn rotate_key(&self, permission: &str) -> Result<KeyId> {
        let key = DataKey::generate();
        let key_id = self.activate(permission, &key).await?;
        let replaced = self.cache.insert(permission, key).is_some();
        tracing::info!(%permission, %key_id, replaced, "rotated data key");

        Ok(key_id)
    }

    async fn activate(&self, permission: &str, key: &DataKey) -> Result<KeyId> {
        let record = PermissionKeyRecord::new_active(permission, key.clone());

        self.store.mark_inactive(permission).await?;
        self.store.insert(&record).await?;

        Ok(record.key_id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use permseal_store::MemoryKeyStore;

    use super::*;

    #[tokio::test]
    async fn test_lazy_creation_persists_one_row() {
        let store = Arc::new(MemoryKeyStore::new());
        let manager = KeyManager::load(Arc::clone(&store)).await.unwrap();

        let key = manager.obtain_or_create_key("canViewSkills").await.unwrap();
        let again = manager.obtain_or_create_key("canViewSkills").await.unwrap();

        assert_eq!(key, again);
        let rows = store.records_for("canViewSkills");
        assert_eq!(rows.len(), 1);
        assert!(rows[0].active);
        assert_eq!(rows[0].key, key);
    }

    #[tokio::test]
    async fn test_load_uses_existing_active_key() {
        let store = Arc::new(MemoryKeyStore::new());
        let existing = PermissionKeyRecord::new_active("canManageUsers", DataKey::generate());
        store.insert(&existing).await.unwrap();

        let manager = KeyManager::load(Arc::clone(&store)).await.unwrap();
        let key = manager.obtain_or_create_key("canManageUsers").await.unwrap();

        assert_eq!(key, existing.key);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_rotation_retires_previous_key() {
        let store = Arc::new(MemoryKeyStore::new());
        let manager = KeyManager::load(Arc::clone(&store)).await.unwrap();

        let first = manager.obtain_or_create_key("canViewReports").await.unwrap();
        let new_id = manager.rotate_key("canViewReports").await.unwrap();
        let second = manager.obtain_or_create_key("canViewReports").await.unwrap();

        assert_ne!(first, second);

        let rows = store.records_for("canViewReports");
        assert_eq!(rows.len(), 2);
        assert!(!rows[0].active);
        assert_eq!(rows[0].key, first);
        assert!(rows[1].active);
        assert_eq!(rows[1].key_id, new_id);
        assert_eq!(rows[1].key, second);
    }

    #[tokio::test]
    async fn test_rotate_unseen_permission_creates_key() {
        let store = Arc::new(MemoryKeyStore::new());
        let manager = KeyManager::load(Arc::clone(&store)).await.unwrap();

        manager.rotate_key("canManageSystem").await.unwrap();

        assert!(manager.cache().contains("canManageSystem"));
        assert_eq!(store.find_active_keys().await.unwrap().len(), 1);
    }
}
