//! Package key derivation.
//!
//! The package key is derived from an operator secret with Argon2id and a fixed
//! salt. Derivation is deterministic: the same secret and parameters always give
//! the same key, so every process started with the same secret can open every
//! token ever issued under it.

use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::Zeroizing;

use crate::crypto::{PackageKey, KEY_LEN};
use crate::error::{CoreError, Result};

/// Fixed salt for package key derivation.
pub const DEFAULT_SALT: &[u8] = b"permseal::package-key::v1";

const MIN_SALT_LEN: usize = 8;

// m=65536 (64 MiB), t=3, p=4
const DEFAULT_MEMORY_KIB: u32 = 65536;
const DEFAULT_ITERATIONS: u32 = 3;
const DEFAULT_PARALLELISM: u32 = 4;

/// Argon2id cost parameters and salt.
///
/// Changing any field changes the derived key, which makes every previously
/// issued token unreadable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
    /// Salt, at least 8 bytes.
    pub salt: Vec<u8>,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_MEMORY_KIB,
            iterations: DEFAULT_ITERATIONS,
            parallelism: DEFAULT_PARALLELISM,
            salt: DEFAULT_SALT.to_vec(),
        }
    }
}

impl KdfParams {
    /// Cheap parameters for tests. Not for production secrets.
    pub fn fast() -> Self {
        Self {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
            salt: DEFAULT_SALT.to_vec(),
        }
    }

    fn argon2(&self) -> Result<Argon2<'static>> {
        let params = Params::new(
            self.memory_kib,
            self.iterations,
            self.parallelism,
            Some(KEY_LEN),
        )
        .map_err(|e| CoreError::KeyDerivation(format!("invalid Argon2 params: {}", e)))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Check that the parameters are accepted by Argon2id.
    pub fn validate(&self) -> Result<()> {
        if self.salt.len() < MIN_SALT_LEN {
            return Err(CoreError::KeyDerivation(format!(
                "salt must be at least {} bytes",
                MIN_SALT_LEN
            )));
        }
        self.argon2().map(|_| ())
    }
}

/// Derive the package key from an operator secret.
///
/// This is deliberately slow. Call it once per process and keep the result.
pub fn derive_package_key(secret: &[u8], params: &KdfParams) -> Result<PackageKey> {
    if secret.is_empty() {
        return Err(CoreError::KeyDerivation("secret must not be empty".into()));
    }
    params.validate()?;

    let mut derived = Zeroizing::new([0u8; KEY_LEN]);
    params
        .argon2()?
        .hash_password_into(secret, &params.salt, &mut *derived)
        .map_err(|e| CoreError::KeyDerivation(format!("Argon2id hash failed: {}", e)))?;

    Ok(PackageKey::from_bytes(*derived))
}
