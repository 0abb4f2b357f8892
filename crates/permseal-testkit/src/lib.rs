//! # Permseal Testkit
//!
//! Testing utilities for permseal.
//!
//! ## Overview
//!
//! - **Fixtures**: a fast-KDF configuration and an in-memory store, ready to
//!   build a [`permseal::PermissionService`]
//! - **Stores**: [`KeyStore`](permseal_store::KeyStore) wrappers that count
//!   calls, inject failures or yield between steps
//! - **Generators**: proptest strategies for permissions and keys
//!
//! ## Test Fixtures
//!
//! ```rust
//! use permseal_testkit::fixtures::TestFixture;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let fixture = TestFixture::new();
//! let service = fixture.service().await.unwrap();
//!
//! let token = service.encrypt_permission("canViewSkills").await.unwrap();
//! assert_eq!(fixture.store.len(), 1);
//! # let _ = token;
//! # }
//! ```

pub mod fixtures;
pub mod generators;
pub mod stores;

pub use fixtures::TestFixture;
pub use stores::{CountingStore, FailingStore, YieldingStore};
