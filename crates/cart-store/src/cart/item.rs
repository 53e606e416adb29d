//! Line item and add-payload types.

use crate::error::CartError;
use crate::ids::ItemId;
use crate::money::Money;
use serde::{Deserialize, Deserializer, Serialize};

/// A product line in the cart.
///
/// Field names on the wire follow the storage format storefronts already
/// hold: `id`, `title`, `img`, `price`, `quantity`, `totalPrice`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    /// Product identifier, unique within a cart.
    pub id: ItemId,
    /// Product title (denormalized for display).
    #[serde(default)]
    pub title: String,
    /// Product image URL.
    #[serde(rename = "img", default)]
    pub image: String,
    /// Unit price recorded when the line was created.
    #[serde(rename = "price", deserialize_with = "lenient_money")]
    pub unit_price: Money,
    /// Quantity, at least 1 for a line held in a cart.
    pub quantity: i64,
    /// Running line subtotal.
    ///
    /// Maintained incrementally by add and remove, so it can differ from
    /// `unit_price * quantity` when a product was re-added at another price.
    #[serde(rename = "totalPrice", deserialize_with = "lenient_money")]
    pub line_total: Money,
}

impl LineItem {
    /// Create a line holding a single unit.
    pub fn new(
        id: ItemId,
        title: impl Into<String>,
        image: impl Into<String>,
        unit_price: Money,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            image: image.into(),
            unit_price,
            quantity: 1,
            line_total: unit_price,
        }
    }

    /// `unit_price * quantity`, or `None` on overflow.
    pub fn subtotal(&self) -> Option<Money> {
        self.unit_price.checked_mul(self.quantity)
    }

    /// Whether the running line total no longer matches the unit subtotal.
    pub fn has_drifted(&self) -> bool {
        self.subtotal() != Some(self.line_total)
    }
}

/// A price as supplied by the UI: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

impl PriceInput {
    /// Validate and convert to [`Money`].
    ///
    /// Rejects non-numeric text, non-finite values and negative amounts.
    pub fn to_money(&self) -> Result<Money, CartError> {
        let amount = match self {
            PriceInput::Number(n) => *n,
            PriceInput::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| CartError::InvalidPrice(format!("{s:?} is not a number")))?,
        };
        if amount < 0.0 {
            return Err(CartError::InvalidPrice(format!("{amount} is negative")));
        }
        Money::from_decimal(amount)
            .ok_or_else(|| CartError::InvalidPrice(format!("{amount} is out of range")))
    }
}

impl From<f64> for PriceInput {
    fn from(n: f64) -> Self {
        PriceInput::Number(n)
    }
}

impl From<Money> for PriceInput {
    fn from(m: Money) -> Self {
        PriceInput::Number(m.to_decimal())
    }
}

impl From<&str> for PriceInput {
    fn from(s: &str) -> Self {
        PriceInput::Text(s.to_string())
    }
}

/// Payload of an add action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    /// Product identifier.
    pub id: ItemId,
    /// Product title.
    #[serde(default)]
    pub title: String,
    /// Product image URL.
    #[serde(rename = "img", default)]
    pub image: String,
    /// Unit price being added.
    pub price: PriceInput,
}

impl NewItem {
    /// Create an add payload.
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>, price: impl Into<PriceInput>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image: String::new(),
            price: price.into(),
        }
    }

    /// Set the image URL.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }
}

/// Older storefront builds stored prices exactly as the UI sent them,
/// sometimes as strings.
fn lenient_money<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
    PriceInput::deserialize(deserializer)?
        .to_money()
        .map_err(serde::de::Error::custom)
}
