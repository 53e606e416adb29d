//! Cart actions as dispatched by the UI.

use serde::{Deserialize, Serialize};

use crate::cart::NewItem;
use crate::error::CartError;
use crate::ids::ItemId;

/// One of the three cart transitions, in serializable form.
///
/// Encoded the way storefront front-ends dispatch them:
/// `{"type": "cart/addItem", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum CartAction {
    /// Add one unit of a product.
    #[serde(rename = "cart/addItem")]
    AddItem(NewItem),
    /// Remove one unit of a product.
    #[serde(rename = "cart/removeItem")]
    RemoveItem(ItemId),
    /// Remove a product line entirely.
    #[serde(rename = "cart/deleteItem")]
    DeleteItem(ItemId),
}

impl CartAction {
    /// Parse an action from its JSON form.
    pub fn from_json(raw: &str) -> Result<Self, CartError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// The action's type tag.
    pub fn kind(&self) -> &'static str {
        match self {
            CartAction::AddItem(_) => "cart/addItem",
            CartAction::RemoveItem(_) => "cart/removeItem",
            CartAction::DeleteItem(_) => "cart/deleteItem",
        }
    }

    /// Id of the product the action targets.
    pub fn item_id(&self) -> &ItemId {
        match self {
            CartAction::AddItem(item) => &item.id,
            CartAction::RemoveItem(id) | CartAction::DeleteItem(id) => id,
        }
    }
}
