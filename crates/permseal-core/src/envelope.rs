//! The inner-layer envelope carried inside the outer ciphertext.
//!
//! The envelope holds everything needed to open the inner layer: the data key
//! itself plus the inner nonce, ciphertext, and tag. It is serialized as a JSON
//! object with exactly four base64 string fields:
//!
//! ```json
//! {"dataKey":"...","nonce":"...","ciphertext":"...","tag":"..."}
//! ```
//!
//! Unknown fields are rejected so that the schema cannot drift silently.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::{AeadNonce, AuthTag, DataKey, Sealed};
use crate::error::{CoreError, Result};

/// Inner-layer material for one permission.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Envelope {
    #[serde(with = "b64")]
    data_key: Vec<u8>,
    #[serde(with = "b64")]
    nonce: Vec<u8>,
    #[serde(with = "b64")]
    ciphertext: Vec<u8>,
    #[serde(with = "b64")]
    tag: Vec<u8>,
}

impl Envelope {
    /// Pack a data key and the inner box it sealed.
    pub fn new(data_key: &DataKey, inner: &Sealed) -> Self {
        Self {
            data_key: data_key.as_bytes().to_vec(),
            nonce: inner.nonce.as_bytes().to_vec(),
            ciphertext: inner.ciphertext.clone(),
            tag: inner.tag.as_bytes().to_vec(),
        }
    }

    /// Serialize to JSON bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| CoreError::Serialization(e.to_string()))
    }

    /// Deserialize from JSON bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| CoreError::MalformedToken(format!("invalid envelope: {}", e)))
    }

    /// The data key that sealed the inner layer.
    pub fn data_key(&self) -> Result<DataKey> {
        DataKey::from_slice(&self.data_key).map_err(|_| {
            CoreError::MalformedToken(format!(
                "envelope data key must be 32 bytes, got {}",
                self.data_key.len()
            ))
        })
    }

    /// The inner box, with nonce and tag lengths checked.
    pub fn inner(&self) -> Result<Sealed> {
        Ok(Sealed {
            nonce: AeadNonce::from_slice(&self.nonce)?,
            ciphertext: self.ciphertext.clone(),
            tag: AuthTag::from_slice(&self.tag)?,
        })
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("data_key", &"..")
            .field("nonce_len", &self.nonce.len())
            .field("ciphertext_len", &self.ciphertext.len())
            .field("tag_len", &self.tag.len())
            .finish()
    }
}

mod b64 {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_serialization() {
        let key = DataKey::generate();
        let inner = key.seal(b"canViewReports").unwrap();
        let envelope = Envelope::new(&key, &inner);

        let bytes = envelope.to_bytes().unwrap();
        let recovered = Envelope::from_bytes(&bytes).unwrap();

        assert_eq!(envelope, recovered);
        assert_eq!(recovered.data_key().unwrap(), key);
        assert_eq!(recovered.inner().unwrap(), inner);
    }

    #[test]
    fn test_wire_field_names() {
        let key = DataKey::from_bytes([1u8; 32]);
        let inner = key.seal(b"x").unwrap();
        let json: serde_json::Value =
            serde_json::from_slice(&Envelope::new(&key, &inner).to_bytes().unwrap()).unwrap();

        let mut fields: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        fields.sort();
        assert_eq!(fields, vec!["ciphertext", "dataKey", "nonce", "tag"]);
        assert_eq!(json["dataKey"], "AQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQE=");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let json = br#"{"dataKey":"","nonce":"","ciphertext":"","tag":"","extra":""}"#;
        assert!(Envelope::from_bytes(json).unwrap_err().is_malformed());
    }

    #[test]
    fn test_missing_field_rejected() {
        let json = br#"{"dataKey":"","nonce":"","ciphertext":""}"#;
        assert!(Envelope::from_bytes(json).unwrap_err().is_malformed());
    }

    #[test]
    fn test_bad_lengths_are_malformed() {
        let json = br#"{"dataKey":"AAAA","nonce":"AAAA","ciphertext":"","tag":"AAAA"}"#;
        let envelope = Envelope::from_bytes(json).unwrap();

        assert!(envelope.data_key().unwrap_err().is_malformed());
        assert!(envelope.inner().unwrap_err().is_malformed());
    }

    #[test]
    fn test_debug_hides_key() {
        let key = DataKey::from_bytes([9u8; 32]);
        let inner = key.seal(b"x").unwrap();
        let debug = format!("{:?}", Envelope::new(&key, &inner));
        assert!(!debug.contains("9, 9"));
    }
}
