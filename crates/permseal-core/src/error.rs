//! Error types for core primitives.

use thiserror::Error;

use crate::crypto::Layer;

/// Errors that can occur in pure key, envelope, and token operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Token or envelope does not have the expected shape.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// An authentication tag did not verify.
    #[error("authentication failed on {layer} layer")]
    Authentication { layer: Layer },

    /// The AEAD refused to encrypt.
    #[error("encryption error: {0}")]
    Encryption(String),

    /// Package key derivation failed.
    #[error("key derivation error: {0}")]
    KeyDerivation(String),

    /// Key material of the wrong size.
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Key identifier is not a valid UUID.
    #[error("invalid key id: {0}")]
    InvalidKeyId(String),

    /// Name outside the permission catalogue.
    #[error("unknown permission: {0}")]
    UnknownPermission(String),

    /// Envelope serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl CoreError {
    /// Whether this error means the token was tampered with or opened with the
    /// wrong key.
    pub fn is_authentication(&self) -> bool {
        matches!(self, CoreError::Authentication { .. })
    }

    /// Whether this error means the token could not be parsed.
    pub fn is_malformed(&self) -> bool {
        matches!(self, CoreError::MalformedToken(_))
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
