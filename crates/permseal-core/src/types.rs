//! Key identifiers and persisted key records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::DataKey;
use crate::error::CoreError;

/// Random, unique identifier of one data key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyId(Uuid);

impl KeyId {
    /// Generate a new random key ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for KeyId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| CoreError::InvalidKeyId(format!("{}: {}", s, e)))
    }
}

/// One row of the permission key store.
///
/// A record is inserted active and only ever transitions to inactive. Retired
/// rows are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionKeyRecord {
    /// The permission this key seals.
    pub permission: String,
    /// Unique key identifier.
    pub key_id: KeyId,
    /// Raw key material.
    pub key: DataKey,
    /// Whether this is the permission's current key.
    pub active: bool,
    /// Creation time (Unix ms).
    pub created_at: i64,
}

impl PermissionKeyRecord {
    /// A fresh active record for `permission`.
    pub fn new_active(permission: impl Into<String>, key: DataKey) -> Self {
        Self {
            permission: permission.into(),
            key_id: KeyId::generate(),
            key,
            active: true,
            created_at: now_millis(),
        }
    }
}

/// Get current time in milliseconds.
pub fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
