//! Cart error types.

use cart_kv::StorageError;
use thiserror::Error;

use crate::ids::ItemId;

/// Errors that can occur in cart operations.
///
/// Every variant is recoverable: a rejected operation leaves the cart as it
/// was before the call.
#[derive(Error, Debug)]
pub enum CartError {
    /// Item not in cart.
    #[error("Item not in cart: {0}")]
    ItemNotFound(ItemId),

    /// Price is not a finite, non-negative number.
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    /// Quantity outside the valid range.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
