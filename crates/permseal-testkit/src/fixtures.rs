//! Test fixtures and helpers.

use std::sync::Arc;

use permseal::{PermissionService, PermsealConfig, Result};
use permseal_core::KdfParams;
use permseal_store::{KeyStore, MemoryKeyStore};

/// Secret used by [`TestFixture::new`].
pub const TEST_SECRET: &str = "permseal test secret";

/// A fast-KDF configuration plus a shared memory store.
pub struct TestFixture {
    pub config: PermsealConfig,
    pub store: Arc<MemoryKeyStore>,
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    /// Fixture with [`TEST_SECRET`] and an empty store.
    pub fn new() -> Self {
        Self::with_secret(TEST_SECRET)
    }

    /// Fixture with a specific package secret.
    pub fn with_secret(secret: &str) -> Self {
        Self {
            config: PermsealConfig::default()
                .with_secret(secret)
                .with_kdf(KdfParams::fast()),
            store: Arc::new(MemoryKeyStore::new()),
        }
    }

    /// Build a service over the fixture's memory store.
    pub async fn service(&self) -> Result<PermissionService<Arc<MemoryKeyStore>>> {
        PermissionService::new(self.config.clone(), Arc::clone(&self.store)).await
    }

    /// Build a service over a different store with the fixture's config.
    pub async fn service_over<S: KeyStore>(&self, store: S) -> Result<PermissionService<S>> {
        PermissionService::new(self.config.clone(), store).await
    }
}
