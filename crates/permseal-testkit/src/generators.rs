//! Proptest generators for property-based testing.

use proptest::prelude::*;

use permseal_core::{DataKey, PackageKey, Permission, KEY_LEN};

/// A permission from the catalogue.
pub fn permission() -> impl Strategy<Value = Permission> {
    prop::sample::select(Permission::ALL.to_vec())
}

/// An arbitrary identifier, which may or may not be in the catalogue.
pub fn identifier() -> impl Strategy<Value = String> {
    prop_oneof![
        permission().prop_map(|p| p.to_string()),
        "can[A-Z][A-Za-z]{0,24}",
        "\\PC{0,64}",
    ]
}

/// A random data key.
pub fn data_key() -> impl Strategy<Value = DataKey> {
    any::<[u8; KEY_LEN]>().prop_map(DataKey::from_bytes)
}

/// A random package key.
pub fn package_key() -> impl Strategy<Value = PackageKey> {
    any::<[u8; KEY_LEN]>().prop_map(PackageKey::from_bytes)
}

/// A list of identifiers for batch tests.
pub fn identifiers(max_len: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(identifier(), 0..=max_len)
}

/// The standard base64 alphabet, without padding.
pub const BASE64_ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// A character from [`BASE64_ALPHABET`].
pub fn base64_char() -> impl Strategy<Value = char> {
    prop::sample::select(BASE64_ALPHABET.chars().collect::<Vec<_>>())
}
