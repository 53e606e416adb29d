//! Client-side shopping cart state for storefronts.
//!
//! This crate keeps a cart of product lines with a running quantity counter
//! and a derived monetary total, and persists it in a durable key-value store
//! so it survives page reloads:
//!
//! - **Cart**: line items, the pure [`CartState`] transitions, and the
//!   persistent [`CartStore`]
//! - **Actions**: the serializable [`CartAction`] form of add / remove / delete
//! - **Persistence**: single-record storage with legacy three-key migration
//!
//! # Example
//!
//! ```rust
//! use cart_kv::MemoryStore;
//! use cart_store::prelude::*;
//!
//! let mut cart = CartStore::open(MemoryStore::new());
//! cart.add_item(NewItem::new(1u64, "A", 10.0)).unwrap();
//! cart.add_item(NewItem::new(1u64, "A", 10.0)).unwrap();
//! cart.remove_item(&ItemId::from(1u64)).unwrap();
//!
//! assert_eq!(cart.total_quantity(), 1);
//! assert_eq!(cart.total_amount(), Money::new(1000));
//! ```

pub mod action;
pub mod cart;
pub mod config;
pub mod error;
pub mod ids;
pub mod money;
pub mod persist;

pub use action::CartAction;
pub use cart::{CartState, CartStore, LineItem, NewItem, PriceInput, MAX_QUANTITY_PER_ITEM};
pub use config::StoreConfig;
pub use error::CartError;
pub use ids::ItemId;
pub use money::Money;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::action::CartAction;
    pub use crate::cart::{CartState, CartStore, LineItem, NewItem, PriceInput};
    pub use crate::config::StoreConfig;
    pub use crate::error::CartError;
    pub use crate::ids::ItemId;
    pub use crate::money::Money;
}
