//! Durable key-value storage for the storefront cart.
//!
//! Provides a small, string-valued storage contract modelled on browser
//! local storage, two backends, and a typed wrapper with automatic JSON
//! serialization.
//!
//! # Example
//!
//! ```rust
//! use cart_kv::{JsonStore, MemoryStore};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Snapshot {
//!     total_quantity: i64,
//! }
//!
//! let mut store = JsonStore::new(MemoryStore::new());
//!
//! // Store a value
//! store.set("cart", &Snapshot { total_quantity: 2 }).unwrap();
//!
//! // Retrieve a value
//! let snapshot: Option<Snapshot> = store.get("cart").unwrap();
//! assert_eq!(snapshot.map(|s| s.total_quantity), Some(2));
//!
//! // Delete a value
//! store.delete("cart").unwrap();
//! ```

mod error;
mod file;
mod kv;
mod memory;

pub use error::StorageError;
pub use file::FileStore;
pub use kv::{JsonStore, KeyValueStore};
pub use memory::{MemoryStore, DEFAULT_QUOTA_BYTES};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{FileStore, JsonStore, KeyValueStore, MemoryStore, StorageError};
}
