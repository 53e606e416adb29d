//! Shopping cart module.
//!
//! Contains the line item types, the cart state machine and the store that
//! persists it.

mod item;
mod state;
mod store;

pub use item::{LineItem, NewItem, PriceInput};
pub use state::{CartState, MAX_QUANTITY_PER_ITEM};
pub use store::CartStore;
