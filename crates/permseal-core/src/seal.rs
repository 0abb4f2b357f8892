//! Two-layer sealing of a single permission.
//!
//! ```text
//! permission --(data key)--> inner box --> Envelope --(package key)--> token
//! ```

use crate::crypto::{DataKey, PackageKey};
use crate::envelope::Envelope;
use crate::error::{CoreError, Result};
use crate::token::SealedToken;

/// Seal a permission under its data key, then wrap the result under the
/// package key.
pub fn seal_permission(
    package_key: &PackageKey,
    data_key: &DataKey,
    permission: &str,
) -> Result<SealedToken> {
    let inner = data_key.seal(permission.as_bytes())?;
    let envelope = Envelope::new(data_key, &inner);
    let outer = package_key.seal(&envelope.to_bytes()?)?;

    Ok(SealedToken::new(outer))
}

/// Open both layers of a token and return the permission.
///
/// Only the package key is needed: the data key is recovered from the
/// envelope. Either tag failing yields [`CoreError::Authentication`].
pub fn open_permission(package_key: &PackageKey, token: &SealedToken) -> Result<String> {
    let envelope_bytes = package_key.open(token.outer())?;
    let envelope = Envelope::from_bytes(&envelope_bytes)?;

    let data_key = envelope.data_key()?;
    let plaintext = data_key.open(&envelope.inner()?)?;

    String::from_utf8(plaintext)
        .map_err(|_| CoreError::MalformedToken("permission is not valid UTF-8".into()))
}
