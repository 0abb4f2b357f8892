//! Service configuration.
//!
//! The only operator input is the package secret, read once at start-up. A
//! missing or empty secret is a fatal configuration error; there is no built-in
//! fallback secret.

use std::fmt;

use permseal_core::{derive_package_key, KdfParams, PackageKey};
use zeroize::Zeroizing;

use crate::error::{PermsealError, Result};

/// Environment variable holding the package secret.
pub const PACKAGE_SECRET_ENV: &str = "PERMISSION_PACKAGE_SECRET";

/// Items processed concurrently per batch group.
pub const DEFAULT_BATCH_GROUP_SIZE: usize = 5;

/// Configuration for the permission service.
#[derive(Clone)]
pub struct PermsealConfig {
    package_secret: Option<Zeroizing<String>>,
    /// Argon2id parameters for the package key.
    pub kdf: KdfParams,
    /// Items dispatched concurrently per batch group.
    pub batch_group_size: usize,
}

impl Default for PermsealConfig {
    fn default() -> Self {
        Self {
            package_secret: None,
            kdf: KdfParams::default(),
            batch_group_size: DEFAULT_BATCH_GROUP_SIZE,
        }
    }
}

impl PermsealConfig {
    /// Default configuration with the secret taken from
    /// [`PACKAGE_SECRET_ENV`], if set.
    pub fn from_env() -> Self {
        let secret = std::env::var(PACKAGE_SECRET_ENV).ok();
        Self {
            package_secret: secret.map(Zeroizing::new),
            ..Self::default()
        }
    }

    /// Set the package secret.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.package_secret = Some(Zeroizing::new(secret.into()));
        self
    }

    /// Set the KDF parameters.
    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    /// Set the batch group size.
    pub fn with_batch_group_size(mut self, size: usize) -> Self {
        self.batch_group_size = size;
        self
    }

    /// The configured package secret, if any.
    pub fn package_secret(&self) -> Option<&str> {
        self.package_secret.as_ref().map(|s| s.as_str())
    }

    /// Reject configurations the service cannot start with.
    pub fn validate(&self) -> Result<()> {
        self.validate_key_material()?;
        self.validate_batch()
    }

    /// Check the secret and KDF parameters, the inputs to
    /// [`PermsealConfig::derive_package_key`].
    pub fn validate_key_material(&self) -> Result<()> {
        match self.package_secret() {
            None => {
                return Err(PermsealError::Configuration(format!(
                    "package secret not set (expected {})",
                    PACKAGE_SECRET_ENV
                )))
            }
            Some(s) if s.is_empty() => {
                return Err(PermsealError::Configuration(format!(
                    "package secret is empty ({})",
                    PACKAGE_SECRET_ENV
                )))
            }
            Some(_) => {}
        }

        self.kdf.validate()?;
        Ok(())
    }

    /// Check the batch settings.
    pub fn validate_batch(&self) -> Result<()> {
        if self.batch_group_size == 0 {
            return Err(PermsealError::Configuration(
                "batch group size must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Check the key material, then derive the package key. This runs
    /// Argon2id and is slow.
    pub fn derive_package_key(&self) -> Result<PackageKey> {
        self.validate_key_material()?;
        let secret = self.package_secret().unwrap_or_default();
        Ok(derive_package_key(secret.as_bytes(), &self.kdf)?)
    }
}

impl fmt::Debug for PermsealConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermsealConfig")
            .field("package_secret", &self.package_secret.as_ref().map(|_| "<redacted>"))
            .field("kdf", &self.kdf)
            .field("batch_group_size", &self.batch_group_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_secret_is_fatal() {
        let err = PermsealConfig::default().validate().unwrap_err();
        assert!(matches!(err, PermsealError::Configuration(_)));
    }

    #[test]
    fn test_empty_secret_is_fatal() {
        let err = PermsealConfig::default()
            .with_secret("")
            .validate()
            .unwrap_err();
        assert!(matches!(err, PermsealError::Configuration(_)));
    }

    #[test]
    fn test_zero_group_size_rejected() {
        let config = PermsealConfig::default()
            .with_secret("s3cret")
            .with_batch_group_size(0);
        assert!(matches!(config.validate(), Err(PermsealError::Configuration(_))));
    }

    #[test]
    fn test_batch_width_does_not_block_key_derivation() {
        let config = PermsealConfig::default()
            .with_secret("s3cret")
            .with_kdf(KdfParams::fast())
            .with_batch_group_size(0);

        assert!(config.validate_key_material().is_ok());
        assert!(config.derive_package_key().is_ok());
        assert!(config.validate_batch().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = PermsealConfig::default();
        assert_eq!(config.batch_group_size, 5);
        assert_eq!(config.kdf, KdfParams::default());
    }

    #[test]
    fn test_derivation_is_stable() {
        let config = PermsealConfig::default()
            .with_secret("operator secret")
            .with_kdf(KdfParams::fast());

        let a = config.derive_package_key().unwrap();
        let b = config.clone().derive_package_key().unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = PermsealConfig::default().with_secret("hunter2");
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
