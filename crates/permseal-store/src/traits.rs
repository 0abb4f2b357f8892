//! KeyStore trait: the abstract interface for data key persistence.

use std::sync::Arc;

use async_trait::async_trait;
use permseal_core::PermissionKeyRecord;

use crate::error::Result;

/// Async interface for permission key persistence.
///
/// # Design Notes
///
/// - Rows are append-only. A key is inserted active and may later be marked
///   inactive; it is never deleted, so old tokens keep their meaning.
/// - The store does not enforce "one active row per permission". The rotation
///   manager retires before inserting, but the two calls are not atomic.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// All records currently marked active, across permissions.
    async fn find_active_keys(&self) -> Result<Vec<PermissionKeyRecord>>;

    /// Mark every active record for `permission` inactive.
    ///
    /// A permission with no active record is not an error.
    async fn mark_inactive(&self, permission: &str) -> Result<()>;

    /// Append a record.
    async fn insert(&self, record: &PermissionKeyRecord) -> Result<()>;
}

#[async_trait]
impl<S: KeyStore + ?Sized> KeyStore for Arc<S> {
    async fn find_active_keys(&self) -> Result<Vec<PermissionKeyRecord>> {
        (**self).find_active_keys().await
    }

    async fn mark_inactive(&self, permission: &str) -> Result<()> {
        (**self).mark_inactive(permission).await
    }

    async fn insert(&self, record: &PermissionKeyRecord) -> Result<()> {
        (**self).insert(record).await
    }
}
