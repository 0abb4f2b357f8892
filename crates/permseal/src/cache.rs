//! Process-local cache of each permission's active data key.
//!
//! The cache is populated once from the store at start-up and mutated only by
//! the rotation manager. The lock protects memory, not the create-on-miss
//! sequence: two callers may both miss for the same permission, and the last
//! insert wins.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use permseal_core::{DataKey, PermissionKeyRecord};

/// Permission → active data key.
#[derive(Debug, Default)]
pub struct KeyCache {
    keys: RwLock<HashMap<String, DataKey>>,
}

impl KeyCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cache from active store records.
    ///
    /// If a permission has more than one active record, the most recently
    /// created one wins.
    pub fn from_records(mut records: Vec<PermissionKeyRecord>) -> Self {
        records.sort_by_key(|r| r.created_at);

        let mut keys: HashMap<String, DataKey> = HashMap::with_capacity(records.len());
        for record in records {
            if keys.contains_key(&record.permission) {
                tracing::warn!(
                    permission = %record.permission,
                    key_id = %record.key_id,
                    "multiple active keys for permission; using the most recent"
                );
            }
            keys.insert(record.permission.clone(), record.key.clone());
        }

        Self {
            keys: RwLock::new(keys),
        }
    }

    /// The cached key for `permission`.
    pub fn get(&self, permission: &str) -> Option<DataKey> {
        self.keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(permission)
            .cloned()
    }

    /// Cache `key` as the active key for `permission`, returning the key it
    /// replaced.
    pub fn insert(&self, permission: &str, key: DataKey) -> Option<DataKey> {
        self.keys
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(permission.to_string(), key)
    }

    /// Whether `permission` has a cached key.
    pub fn contains(&self, permission: &str) -> bool {
        self.keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(permission)
    }

    /// Number of cached permissions.
    pub fn len(&self) -> usize {
        self.keys.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached permission names, sorted.
    pub fn permissions(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(permission: &str, created_at: i64) -> PermissionKeyRecord {
        let mut record = PermissionKeyRecord::new_active(permission, DataKey::generate());
        record.created_at = created_at;
        record
    }

    #[test]
    fn test_from_records() {
        let a = record("canViewSkills", 10);
        let b = record("canManageUsers", 20);
        let cache = KeyCache::from_records(vec![a.clone(), b.clone()]);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("canViewSkills"), Some(a.key));
        assert_eq!(cache.get("canManageUsers"), Some(b.key));
        assert_eq!(cache.get("canViewReports"), None);
    }

    #[test]
    fn test_most_recent_active_wins() {
        let newer = record("canViewSkills", 200);
        let older = record("canViewSkills", 100);
        let cache = KeyCache::from_records(vec![newer.clone(), older]);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("canViewSkills"), Some(newer.key));
    }

    #[test]
    fn test_insert_replaces() {
        let cache = KeyCache::new();
        let first = DataKey::generate();
        let second = DataKey::generate();

        assert!(cache.insert("canManageTeam", first.clone()).is_none());
        assert_eq!(cache.insert("canManageTeam", second.clone()), Some(first));
        assert_eq!(cache.get("canManageTeam"), Some(second));
        assert_eq!(cache.permissions(), vec!["canManageTeam".to_string()]);
    }
}
