//! The permission service: unified API over encryption, decryption,
//! rotation and batching.

use std::sync::Arc;

use permseal_core::{KeyId, PackageKey};
use permseal_store::KeyStore;

use crate::batch::BatchProcessor;
use crate::config::PermsealConfig;
use crate::decrypt::Decryptor;
use crate::encrypt::Encryptor;
use crate::error::{PermsealError, Result};
use crate::rotation::KeyManager;

/// Outcome of [`PermissionService::self_check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfCheckReport {
    /// The permission that was sealed.
    pub original: String,
    /// The token produced.
    pub token: String,
    /// What the token opened to.
    pub decrypted: String,
    /// Whether `decrypted` equals `original`.
    pub valid: bool,
}

/// Encrypts and decrypts permission identifiers.
///
/// Owns the package key, the key manager over `S` and a batch processor.
/// Construct one per process; every method takes `&self`.
pub struct PermissionService<S: KeyStore> {
    encryptor: Encryptor<S>,
    decryptor: Decryptor,
    batch: BatchProcessor,
}

impl<S: KeyStore> PermissionService<S> {
    /// Validate `config`, derive the package key and load active keys from
    /// `store`.
    ///
    /// Fails with [`PermsealError::Configuration`] when the package secret is
    /// missing or empty, and with [`PermsealError::KeyStore`] when the initial
    /// load fails.
    pub async fn new(config: PermsealConfig, store: S) -> Result<Self> {
        // Key material is checked by `derive_package_key`.
        config.validate_batch()?;

        let batch = BatchProcessor::new(config.batch_group_size);
        let package_key = tokio::task::spawn_blocking(move || config.derive_package_key())
            .await
            .map_err(|e| PermsealError::Internal(format!("key derivation task failed: {}", e)))??;

        let keys = KeyManager::load(store).await?;
        tracing::info!(
            cached_permissions = keys.cache().len(),
            group_size = batch.group_size(),
            "permission service ready"
        );

        Ok(Self::from_parts(Arc::new(package_key), keys, batch))
    }

    /// Assemble a service from an already derived key and a loaded manager.
    pub fn from_parts(package_key: Arc<PackageKey>, keys: KeyManager<S>, batch: BatchProcessor) -> Self {
        Self {
            encryptor: Encryptor::new(Arc::clone(&package_key), keys),
            decryptor: Decryptor::new(package_key),
            batch,
        }
    }

    /// A decryptor sharing this service's package key.
    pub fn decryptor(&self) -> Decryptor {
        self.decryptor.clone()
    }

    /// The key manager.
    pub fn key_manager(&self) -> &KeyManager<S> {
        self.encryptor.keys()
    }

    /// The store.
    pub fn store(&self) -> &S {
        self.encryptor.keys().store()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Single items
    // ─────────────────────────────────────────────────────────────────────────

    /// Encrypt one permission.
    pub async fn encrypt_permission(&self, permission: &str) -> Result<String> {
        self.encryptor.encrypt_permission(permission).await
    }

    /// Decrypt one token.
    pub async fn decrypt_permission(&self, token: &str) -> Result<String> {
        self.decryptor.decrypt_permission(token).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Batches
    // ─────────────────────────────────────────────────────────────────────────

    /// Encrypt a list of permissions, preserving order.
    ///
    /// Aborts on the first failing item.
    pub async fn encrypt_permissions(&self, permissions: &[impl AsRef<str>]) -> Result<Vec<String>> {
        self.batch.encrypt_all(&self.encryptor, permissions).await
    }

    /// Decrypt a list of tokens, preserving order.
    ///
    /// Tokens that fail to open are logged and left out of the result.
    pub async fn decrypt_permissions(&self, tokens: &[impl AsRef<str>]) -> Vec<String> {
        self.batch.decrypt_all(&self.decryptor, tokens).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Maintenance
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the active data key for `permission`.
    pub async fn rotate_key(&self, permission: &str) -> Result<KeyId> {
        self.encryptor.keys().rotate_key(permission).await
    }

    /// Seal and reopen `permission`, reporting whether the round trip held.
    pub async fn self_check(&self, permission: &str) -> Result<SelfCheckReport> {
        let original = permission.to_string();
        let token = self.encrypt_permission(&original).await?;
        let decrypted = self.decrypt_permission(&token).await?;
        let valid = decrypted == original;

        if !valid {
            tracing::error!(%original, %decrypted, "self check round trip mismatch");
        }

        Ok(SelfCheckReport {
            original,
            token,
            decrypted,
            valid,
        })
    }
}

impl<S: KeyStore> std::fmt::Debug for PermissionService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionService")
            .field("cached_permissions", &self.key_manager().cache().len())
            .field("batch", &self.batch)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use permseal_core::KdfParams;
    use permseal_store::MemoryKeyStore;

    use super::*;

    fn config() -> PermsealConfig {
        PermsealConfig::default()
            .with_secret("unit-test secret")
            .with_kdf(KdfParams::fast())
    }

    #[tokio::test]
    async fn test_self_check() {
        let service = PermissionService::new(config(), MemoryKeyStore::new())
            .await
            .unwrap();

        let report = service.self_check("canViewSkills").await.unwrap();
        assert!(report.valid);
        assert_eq!(report.original, "canViewSkills");
        assert_eq!(report.decrypted, "canViewSkills");
        assert_eq!(report.token.split('.').count(), 3);
    }

    #[tokio::test]
    async fn test_zero_batch_width_fails_construction() {
        let err = PermissionService::new(config().with_batch_group_size(0), MemoryKeyStore::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PermsealError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_missing_secret_fails_construction() {
        let config = PermsealConfig::default().with_kdf(KdfParams::fast());
        let err = PermissionService::new(config, MemoryKeyStore::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PermsealError::Configuration(_)));
    }
}
