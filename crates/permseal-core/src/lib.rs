//! # Permseal Core
//!
//! Pure primitives for permission envelope encryption: the permission
//! catalogue, symmetric keys, the package-key derivation, the inner
//! envelope and the dot-separated token codec.
//!
//! This crate contains no I/O and no storage. It is pure computation over
//! key material and byte strings.
//!
//! ## Encryption Model
//!
//! A permission is sealed twice with ChaCha20-Poly1305:
//!
//! 1. **Inner layer**: the permission bytes are sealed with a per-permission
//!    [`DataKey`].
//! 2. **Outer layer**: the data key, inner nonce, inner ciphertext and inner tag
//!    are packed into an [`Envelope`], serialized, and sealed with the
//!    process-wide [`PackageKey`].
//!
//! The result is a [`SealedToken`], rendered as `nonce.tag.ciphertext` with
//! each segment base64 encoded. Because the data key travels inside the token,
//! opening a token only needs the package key.
//!
//! ## Key Types
//!
//! - [`Permission`] - The platform's permission catalogue
//! - [`DataKey`] / [`PackageKey`] - 256-bit symmetric keys, zeroized on drop
//! - [`KdfParams`] - Argon2id parameters for [`derive_package_key`]
//! - [`PermissionKeyRecord`] - A persisted data key row

pub mod crypto;
pub mod envelope;
pub mod error;
pub mod kdf;
pub mod permission;
pub mod seal;
pub mod token;
pub mod types;

pub use crypto::{AeadNonce, AuthTag, DataKey, Layer, PackageKey, Sealed, KEY_LEN, NONCE_LEN, TAG_LEN};
pub use envelope::Envelope;
pub use error::{CoreError, Result};
pub use kdf::{derive_package_key, KdfParams, DEFAULT_SALT};
pub use permission::Permission;
pub use seal::{open_permission, seal_permission};
pub use token::SealedToken;
pub use types::{now_millis, KeyId, PermissionKeyRecord};
