//! Permission decryption.
//!
//! Decryption needs only the package key: the data key travels inside the
//! token. It never reads the key store, so tokens sealed under retired keys
//! keep opening.

use std::sync::Arc;

use permseal_core::{open_permission, PackageKey, SealedToken};

use crate::config::PermsealConfig;
use crate::error::Result;

/// Opens tokens produced by [`crate::Encryptor`].
///
/// Cheap to clone; clones share the package key.
#[derive(Debug, Clone)]
pub struct Decryptor {
    package_key: Arc<PackageKey>,
}

impl Decryptor {
    /// Create a decryptor for `package_key`.
    pub fn new(package_key: Arc<PackageKey>) -> Self {
        Self { package_key }
    }

    /// Derive the package key from `config` and build a decryptor.
    pub fn from_config(config: &PermsealConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(config.derive_package_key()?)))
    }

    /// Open a token and return the permission it carries.
    ///
    /// Malformed tokens fail with [`crate::PermsealError::MalformedToken`];
    /// a tag that does not verify on either layer fails with
    /// [`crate::PermsealError::AuthenticationFailure`].
    pub fn decrypt(&self, token: &str) -> Result<String> {
        let token = SealedToken::parse(token)?;
        Ok(open_permission(&self.package_key, &token)?)
    }

    /// Async form of [`Decryptor::decrypt`].
    pub async fn decrypt_permission(&self, token: &str) -> Result<String> {
        self.decrypt(token)
    }
}
