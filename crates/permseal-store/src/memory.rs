//! In-memory implementation of the KeyStore trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use permseal_core::PermissionKeyRecord;

use crate::error::{Result, StoreError};
use crate::traits::KeyStore;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    /// Records in insertion order.
    records: RwLock<Vec<PermissionKeyRecord>>,
}

impl MemoryKeyStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record for `permission`, active or retired, in insertion order.
    pub fn records_for(&self, permission: &str) -> Vec<PermissionKeyRecord> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records
            .iter()
            .filter(|r| r.permission == permission)
            .cloned()
            .collect()
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn find_active_keys(&self) -> Result<Vec<PermissionKeyRecord>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.iter().filter(|r| r.active).cloned().collect())
    }

    async fn mark_inactive(&self, permission: &str) -> Result<()> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        for record in records
            .iter_mut()
            .filter(|r| r.active && r.permission == permission)
        {
            record.active = false;
        }
        Ok(())
    }

    async fn insert(&self, record: &PermissionKeyRecord) -> Result<()> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);

        if records.iter().any(|r| r.key_id == record.key_id) {
            return Err(StoreError::DuplicateKeyId(record.key_id));
        }

        records.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use permseal_core::DataKey;

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryKeyStore::new();
        let record = PermissionKeyRecord::new_active("canViewSkills", DataKey::generate());

        store.insert(&record).await.unwrap();

        let active = store.find_active_keys().await.unwrap();
        assert_eq!(active, vec![record]);
    }

    #[tokio::test]
    async fn test_mark_inactive_keeps_rows() {
        let store = MemoryKeyStore::new();
        let old = PermissionKeyRecord::new_active("canViewSkills", DataKey::generate());
        let other = PermissionKeyRecord::new_active("canManageUsers", DataKey::generate());
        store.insert(&old).await.unwrap();
        store.insert(&other).await.unwrap();

        store.mark_inactive("canViewSkills").await.unwrap();

        let active = store.find_active_keys().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].permission, "canManageUsers");

        // Retired, not deleted
        let history = store.records_for("canViewSkills");
        assert_eq!(history.len(), 1);
        assert!(!history[0].active);
    }

    #[tokio::test]
    async fn test_mark_inactive_unknown_permission() {
        let store = MemoryKeyStore::new();
        store.mark_inactive("canViewReports").await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_key_id_rejected() {
        let store = MemoryKeyStore::new();
        let record = PermissionKeyRecord::new_active("canViewSkills", DataKey::generate());

        store.insert(&record).await.unwrap();
        let err = store.insert(&record).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKeyId(id) if id == record.key_id));
    }
}
