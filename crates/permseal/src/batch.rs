//! Bounded-width batch processing.
//!
//! Items are split into consecutive groups. The items of one group run
//! concurrently on the calling task; the next group starts only when every
//! item of the current one has finished. Output order always matches input
//! order.

use futures::future::join_all;
use permseal_store::KeyStore;

use crate::config::DEFAULT_BATCH_GROUP_SIZE;
use crate::decrypt::Decryptor;
use crate::encrypt::Encryptor;
use crate::error::{PermsealError, Result};

/// Runs encryption and decryption over lists in fixed-width groups.
#[derive(Debug, Clone, Copy)]
pub struct BatchProcessor {
    group_size: usize,
}

impl Default for BatchProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_GROUP_SIZE)
    }
}

impl BatchProcessor {
    /// Create a processor with the given group width. A width of zero is
    /// treated as one.
    pub fn new(group_size: usize) -> Self {
        Self {
            group_size: group_size.max(1),
        }
    }

    /// Items per group.
    pub fn group_size(&self) -> usize {
        self.group_size
    }

    /// Encrypt every permission, in order.
    ///
    /// The first failing item aborts the batch with
    /// [`PermsealError::BatchItem`]; later groups are not started.
    pub async fn encrypt_all<S: KeyStore>(
        &self,
        encryptor: &Encryptor<S>,
        permissions: &[impl AsRef<str>],
    ) -> Result<Vec<String>> {
        let mut tokens = Vec::with_capacity(permissions.len());

        for (group, chunk) in permissions.chunks(self.group_size).enumerate() {
            let base = group * self.group_size;
            let results = join_all(chunk.iter().map(|p| encryptor.encrypt_permission(p.as_ref()))).await;

            for (offset, result) in results.into_iter().enumerate() {
                match result {
                    Ok(token) => tokens.push(token),
                    Err(err) => {
                        return Err(PermsealError::BatchItem {
                            index: base + offset,
                            source: Box::new(err),
                        })
                    }
                }
            }
        }

        Ok(tokens)
    }

    /// Decrypt every token, in order.
    ///
    /// Failures are isolated: a token that does not open is logged and
    /// dropped, and the survivors keep their relative order.
    pub async fn decrypt_all(&self, decryptor: &Decryptor, tokens: &[impl AsRef<str>]) -> Vec<String> {
        let mut slots: Vec<Option<String>> = Vec::with_capacity(tokens.len());

        for (group, chunk) in tokens.chunks(self.group_size).enumerate() {
            let base = group * self.group_size;
            let results = join_all(chunk.iter().map(|t| decryptor.decrypt_permission(t.as_ref()))).await;

            for (offset, result) in results.into_iter().enumerate() {
                match result {
                    Ok(permission) => slots.push(Some(permission)),
                    Err(err) => {
                        let err = PermsealError::BatchItem {
                            index: base + offset,
                            source: Box::new(err),
                        };
                        tracing::warn!(error = %err, "failed to decrypt batch item");
                        slots.push(None);
                    }
                }
            }
        }

        slots.into_iter().flatten().collect()
    }
}
