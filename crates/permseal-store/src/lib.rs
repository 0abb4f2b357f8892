//! # Permseal Store
//!
//! Persistence for per-permission data keys. Provides the [`KeyStore`] trait
//! with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The store is a collaborator of the rotation manager. It only needs three
//! operations: bulk-load the active keys, retire a permission's active key,
//! and append a new key row. Decryption never touches the store.
//!
//! ## Key Types
//!
//! - [`KeyStore`] - The async trait for all storage operations
//! - [`SqliteKeyStore`] - SQLite-based persistent storage
//! - [`MemoryKeyStore`] - In-memory storage for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use permseal_store::{KeyStore, SqliteKeyStore};
//!
//! async fn example() {
//!     // Open a SQLite database
//!     let store = SqliteKeyStore::open("permission-keys.db").unwrap();
//!
//!     // Or use an in-memory database for testing
//!     let store = SqliteKeyStore::open_memory().unwrap();
//!
//!     let active = store.find_active_keys().await.unwrap();
//!     assert!(active.is_empty());
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Append-only keys**: rows are never deleted; retiring only clears `active`
//! - **No transactions across calls**: `mark_inactive` followed by `insert` is
//!   two independent writes

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryKeyStore;
pub use sqlite::SqliteKeyStore;
pub use traits::KeyStore;
