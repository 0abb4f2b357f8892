//! Token codec: `nonce.tag.ciphertext`, each segment standard base64.
//!
//! Parsing separates two kinds of bad input. A token without the right shape
//! (segment count, alphabet, segment lengths) is malformed. A token with the
//! right shape that is not the canonical encoding of a 12-byte nonce and a
//! 16-byte tag can only be an altered token, and fails as an outer-layer
//! authentication error, the same as any other single-character change.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::crypto::{AeadNonce, AuthTag, Layer, Sealed};
use crate::error::{CoreError, Result};

const SEPARATOR: char = '.';
const SEGMENTS: usize = 3;

/// Encoded length of a 12-byte nonce.
const NONCE_CHARS: usize = 16;
/// Encoded length of a 16-byte tag, padding included.
const TAG_CHARS: usize = 24;

/// A parsed encrypted token: the outer-layer box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedToken(Sealed);

impl SealedToken {
    /// Wrap an outer-layer box.
    pub fn new(outer: Sealed) -> Self {
        Self(outer)
    }

    /// The outer-layer box.
    pub fn outer(&self) -> &Sealed {
        &self.0
    }

    /// Parse a token string.
    ///
    /// Fails with [`CoreError::MalformedToken`] unless there are exactly three
    /// segments of base64 characters, the nonce is 16 characters, the tag 24
    /// and the ciphertext non-empty. A well-shaped token whose segments are not
    /// canonical encodings fails with [`CoreError::Authentication`] on the
    /// outer layer.
    pub fn parse(token: &str) -> Result<Self> {
        let segments: Vec<&str> = token.split(SEPARATOR).collect();
        if segments.len() != SEGMENTS {
            return Err(CoreError::MalformedToken(format!(
                "expected {} segments, found {}",
                SEGMENTS,
                segments.len()
            )));
        }

        check_shape(segments[0], "nonce", Some(NONCE_CHARS))?;
        check_shape(segments[1], "tag", Some(TAG_CHARS))?;
        check_shape(segments[2], "ciphertext", None)?;

        let nonce = decode_segment(segments[0])?;
        let tag = decode_segment(segments[1])?;
        let ciphertext = decode_segment(segments[2])?;

        Ok(Self(Sealed {
            nonce: AeadNonce::from_slice(&nonce).map_err(|_| altered())?,
            ciphertext,
            tag: AuthTag::from_slice(&tag).map_err(|_| altered())?,
        }))
    }

    /// Render as `nonce.tag.ciphertext`.
    pub fn encode(&self) -> String {
        let outer = &self.0;
        let mut out = String::with_capacity(
            NONCE_CHARS + TAG_CHARS + 2 + (outer.ciphertext.len() + 2) / 3 * 4,
        );
        out.push_str(&STANDARD.encode(outer.nonce.as_bytes()));
        out.push(SEPARATOR);
        out.push_str(&STANDARD.encode(outer.tag.as_bytes()));
        out.push(SEPARATOR);
        out.push_str(&STANDARD.encode(&outer.ciphertext));
        out
    }
}

fn check_shape(segment: &str, name: &str, expected_chars: Option<usize>) -> Result<()> {
    if let Some(bad) = segment.chars().find(|c| !is_base64_char(*c)) {
        return Err(CoreError::MalformedToken(format!(
            "invalid character {:?} in {}",
            bad, name
        )));
    }
    if segment.is_empty() || segment.len() % 4 != 0 {
        return Err(CoreError::MalformedToken(format!(
            "{} has invalid base64 length {}",
            name,
            segment.len()
        )));
    }
    match expected_chars {
        Some(expected) if segment.len() != expected => Err(CoreError::MalformedToken(format!(
            "{} must be {} characters, found {}",
            name,
            expected,
            segment.len()
        ))),
        _ => Ok(()),
    }
}

fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=')
}

/// Decode a segment that already has the right shape. Non-canonical trailing
/// bits or misplaced padding mean the token was altered.
fn decode_segment(segment: &str) -> Result<Vec<u8>> {
    STANDARD.decode(segment).map_err(|_| altered())
}

fn altered() -> CoreError {
    CoreError::Authentication {
        layer: Layer::Outer,
    }
}

impl FromStr for SealedToken {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for SealedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{NONCE_LEN, TAG_LEN};

    fn sample() -> SealedToken {
        SealedToken::new(Sealed {
            nonce: AeadNonce::from_bytes([0x11; NONCE_LEN]),
            ciphertext: b"ciphertext bytes".to_vec(),
            tag: AuthTag::from_bytes([0x22; TAG_LEN]),
        })
    }

    #[test]
    fn test_encode_parse() {
        let token = sample();
        let encoded = token.encode();

        assert_eq!(encoded.split('.').count(), 3);
        assert_eq!(SealedToken::parse(&encoded).unwrap(), token);
    }

    #[test]
    fn test_segment_lengths() {
        let encoded = sample().encode();
        let parts: Vec<&str> = encoded.split('.').collect();

        // 12 bytes -> 16 chars, 16 bytes -> 24 chars
        assert_eq!(parts[0].len(), 16);
        assert_eq!(parts[1].len(), 24);
    }

    #[test]
    fn test_wrong_segment_count() {
        for bad in ["not-a-token", "a.b", "a.b.c.d", ""] {
            let err = SealedToken::parse(bad).unwrap_err();
            assert!(err.is_malformed(), "{bad:?} gave {err:?}");
        }
    }

    #[test]
    fn test_invalid_base64() {
        let encoded = sample().encode();
        let broken = encoded.replacen('.', ".!", 1);
        assert!(SealedToken::parse(&broken).unwrap_err().is_malformed());
    }

    #[test]
    fn test_short_nonce_rejected() {
        let err = SealedToken::parse("AAAA.AAAAAAAAAAAAAAAAAAAAAA==.AAAA").unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_empty_ciphertext_rejected() {
        let err = SealedToken::parse("AAAAAAAAAAAAAAAA.AAAAAAAAAAAAAAAAAAAAAA==.").unwrap_err();
        assert!(err.is_malformed());
    }

    fn replace_at(encoded: &str, index: usize, replacement: char) -> String {
        encoded
            .char_indices()
            .map(|(i, c)| if i == index { replacement } else { c })
            .collect()
    }

    #[test]
    fn test_non_canonical_segments_are_altered() {
        // Tag [0x22; 16] encodes as "IiIiIiIiIiIiIiIiIiIiIg==".
        let encoded = sample().encode();
        let tag_start = encoded.find('.').unwrap() + 1;
        assert_eq!(&encoded[tag_start..tag_start + 24], "IiIiIiIiIiIiIiIiIiIiIg==");

        // Non-zero trailing bits in the last symbol.
        let trailing = replace_at(&encoded, tag_start + 21, 'h');
        // First padding character replaced: decodes to 17 bytes.
        let long_tag = replace_at(&encoded, tag_start + 22, 'A');
        // Second padding character replaced: padding in the middle.
        let split_pad = replace_at(&encoded, tag_start + 23, 'A');

        for forged in [trailing, long_tag, split_pad] {
            let err = SealedToken::parse(&forged).unwrap_err();
            assert!(
                matches!(err, CoreError::Authentication { layer: Layer::Outer }),
                "{forged:?} gave {err:?}"
            );
        }
    }
}
