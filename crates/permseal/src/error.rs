//! Error types for the permission service.

use permseal_core::{CoreError, Layer};
use permseal_store::StoreError;
use thiserror::Error;

/// Errors that can occur during permission encryption and decryption.
#[derive(Debug, Error)]
pub enum PermsealError {
    /// Master secret missing or empty, or KDF parameters rejected.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Store unreachable or a write failed during key creation or rotation.
    #[error("key store error: {0}")]
    KeyStore(#[from] StoreError),

    /// Token or envelope does not have the expected shape.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// An authentication tag did not verify: tampering, or the wrong key.
    #[error("authentication failed on {layer} layer")]
    AuthenticationFailure { layer: Layer },

    /// One item of a batch failed.
    #[error("batch item {index} failed: {source}")]
    BatchItem {
        index: usize,
        source: Box<PermsealError>,
    },

    /// Unexpected failure inside a primitive.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PermsealError {
    /// Whether a platform boundary should answer with access denied.
    pub fn is_access_denied(&self) -> bool {
        match self {
            PermsealError::MalformedToken(_) | PermsealError::AuthenticationFailure { .. } => true,
            PermsealError::BatchItem { source, .. } => source.is_access_denied(),
            _ => false,
        }
    }

    /// Whether the caller may retry (store failures).
    pub fn is_retryable(&self) -> bool {
        match self {
            PermsealError::KeyStore(_) => true,
            PermsealError::BatchItem { source, .. } => source.is_retryable(),
            _ => false,
        }
    }
}

impl From<CoreError> for PermsealError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MalformedToken(msg) => PermsealError::MalformedToken(msg),
            CoreError::Authentication { layer } => PermsealError::AuthenticationFailure { layer },
            CoreError::KeyDerivation(msg) => PermsealError::Configuration(msg),
            other => PermsealError::Internal(other.to_string()),
        }
    }
}

/// Result type for permission service operations.
pub type Result<T> = std::result::Result<T, PermsealError>;
