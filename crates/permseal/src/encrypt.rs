//! Permission encryption.

use std::sync::Arc;

use permseal_core::{seal_permission, PackageKey, SealedToken};
use permseal_store::KeyStore;

use crate::error::Result;
use crate::rotation::KeyManager;

/// Seals permissions under their data keys and the package key.
#[derive(Debug)]
pub struct Encryptor<S: KeyStore> {
    package_key: Arc<PackageKey>,
    keys: KeyManager<S>,
}

impl<S: KeyStore> Encryptor<S> {
    /// Create an encryptor over a loaded key manager.
    pub fn new(package_key: Arc<PackageKey>, keys: KeyManager<S>) -> Self {
        Self { package_key, keys }
    }

    /// The key manager used to obtain data keys.
    pub fn keys(&self) -> &KeyManager<S> {
        &self.keys
    }

    /// Encrypt one permission into a token.
    ///
    /// Obtains (or lazily creates) the permission's active data key. Any
    /// store failure aborts the call; no token is produced without a
    /// persisted key.
    pub async fn encrypt_permission(&self, permission: &str) -> Result<String> {
        self.seal(permission).await.map(|token| token.encode())
    }

    /// Encrypt into a parsed token rather than its string form.
    pub async fn seal(&self, permission: &str) -> Result<SealedToken> {
        let data_key = self.keys.obtain_or_create_key(permission).await?;
        Ok(seal_permission(&self.package_key, &data_key, permission)?)
    }
}
