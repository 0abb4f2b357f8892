//! # Permseal
//!
//! Envelope encryption for permission identifiers.
//!
//! Each permission is sealed under its own rotating data key, and the data
//! key is wrapped together with the inner ciphertext under a process-wide
//! package key derived from an operator secret. The resulting token is
//! self-contained: opening it needs the package key and nothing else.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use permseal::{PermissionService, PermsealConfig};
//! use permseal::store::MemoryKeyStore;
//!
//! # async fn example() -> permseal::Result<()> {
//! let config = PermsealConfig::from_env();
//! let service = PermissionService::new(config, MemoryKeyStore::new()).await?;
//!
//! let token = service.encrypt_permission("canViewSkills").await?;
//! assert_eq!(service.decrypt_permission(&token).await?, "canViewSkills");
//!
//! service.rotate_key("canViewSkills").await?;
//! // Tokens sealed before the rotation still open.
//! assert_eq!(service.decrypt_permission(&token).await?, "canViewSkills");
//! # Ok(())
//! # }
//! ```
//!
//! ## Crates
//!
//! - [`core`] - keys, the envelope and the token codec
//! - [`store`] - the [`store::KeyStore`] trait with memory and SQLite backends

pub mod batch;
pub mod cache;
pub mod config;
pub mod decrypt;
pub mod encrypt;
pub mod error;
pub mod rotation;
pub mod service;

pub use batch::BatchProcessor;
pub use cache::KeyCache;
pub use config::{PermsealConfig, DEFAULT_BATCH_GROUP_SIZE, PACKAGE_SECRET_ENV};
pub use decrypt::Decryptor;
pub use encrypt::Encryptor;
pub use error::{PermsealError, Result};
pub use rotation::KeyManager;
pub use service::{PermissionService, SelfCheckReport};

pub use permseal_core as core;
pub use permseal_store as store;
