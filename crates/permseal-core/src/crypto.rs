//! Symmetric key material and ChaCha20-Poly1305 with detached tags.
//!
//! Both layers of a token use the same AEAD. They differ only in which key
//! seals them, so the key types carry the [`Layer`] they belong to and report
//! tag failures against it.

use std::fmt;

use chacha20poly1305::{
    aead::{AeadInPlace, KeyInit},
    ChaCha20Poly1305, Key, Nonce, Tag,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CoreError, Result};

/// Length of every symmetric key in bytes.
pub const KEY_LEN: usize = 32;

/// Length of a ChaCha20-Poly1305 nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Length of a Poly1305 authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Which encryption layer of a token an operation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// Sealed with the package key; wraps the envelope.
    Outer,
    /// Sealed with the data key; wraps the permission.
    Inner,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Outer => f.write_str("outer"),
            Layer::Inner => f.write_str("inner"),
        }
    }
}

/// A 96-bit nonce for ChaCha20-Poly1305.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AeadNonce([u8; NONCE_LEN]);

impl AeadNonce {
    /// Generate a new random nonce.
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; NONCE_LEN]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, rejecting anything but 12 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; NONCE_LEN] = bytes.try_into().map_err(|_| {
            CoreError::MalformedToken(format!(
                "nonce must be {} bytes, got {}",
                NONCE_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.0
    }
}

/// A 128-bit Poly1305 authentication tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthTag([u8; TAG_LEN]);

impl AuthTag {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; TAG_LEN]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, rejecting anything but 16 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; TAG_LEN] = bytes.try_into().map_err(|_| {
            CoreError::MalformedToken(format!(
                "tag must be {} bytes, got {}",
                TAG_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; TAG_LEN] {
        &self.0
    }
}

/// Output of one AEAD sealing: nonce, ciphertext, and detached tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub nonce: AeadNonce,
    pub ciphertext: Vec<u8>,
    pub tag: AuthTag,
}

/// A per-permission 256-bit data key. Seals the inner layer.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct DataKey([u8; KEY_LEN]);

impl DataKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, rejecting anything but 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        key_from_slice(bytes).map(Self)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Seal plaintext under a fresh random nonce.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Sealed> {
        seal_detached(&self.0, plaintext)
    }

    /// Open an inner-layer box.
    pub fn open(&self, sealed: &Sealed) -> Result<Vec<u8>> {
        open_detached(&self.0, sealed, Layer::Inner)
    }
}

impl fmt::Debug for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DataKey(..)")
    }
}

/// The process-wide 256-bit package key. Seals the outer layer.
///
/// Never persisted; see [`crate::derive_package_key`].
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PackageKey([u8; KEY_LEN]);

impl PackageKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Seal plaintext under a fresh random nonce.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Sealed> {
        seal_detached(&self.0, plaintext)
    }

    /// Open an outer-layer box.
    pub fn open(&self, sealed: &Sealed) -> Result<Vec<u8>> {
        open_detached(&self.0, sealed, Layer::Outer)
    }
}

impl fmt::Debug for PackageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PackageKey(..)")
    }
}

fn key_from_slice(bytes: &[u8]) -> Result<[u8; KEY_LEN]> {
    bytes.try_into().map_err(|_| CoreError::InvalidKeyLength {
        expected: KEY_LEN,
        actual: bytes.len(),
    })
}

fn seal_detached(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<Sealed> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
    let nonce = AeadNonce::generate();

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(nonce.as_bytes()), b"", &mut buffer)
        .map_err(|e| CoreError::Encryption(e.to_string()))?;

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(tag.as_slice());

    Ok(Sealed {
        nonce,
        ciphertext: buffer,
        tag: AuthTag(tag_bytes),
    })
}

fn open_detached(key: &[u8; KEY_LEN], sealed: &Sealed, layer: Layer) -> Result<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));

    let mut buffer = sealed.ciphertext.clone();
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(sealed.nonce.as_bytes()),
            b"",
            &mut buffer,
            Tag::from_slice(sealed.tag.as_bytes()),
        )
        .map_err(|_| CoreError::Authentication { layer })?;

    Ok(buffer)
}
