//! Cart state and its transitions.

use std::collections::HashSet;

use crate::cart::{LineItem, NewItem};
use crate::error::CartError;
use crate::ids::ItemId;
use crate::money::Money;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Maximum quantity allowed per line item.
pub const MAX_QUANTITY_PER_ITEM: i64 = 9999;

/// Snapshot of a cart.
///
/// `total_quantity` is an event counter: +1 per add, -1 per remove, minus the
/// line quantity per delete. `total_amount` is always recomputed from the
/// lines as `sum(unit_price * quantity)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    /// Lines in insertion order.
    #[serde(rename = "cartItems", default)]
    pub items: Vec<LineItem>,
    /// Cart-wide quantity counter.
    #[serde(default)]
    pub total_quantity: i64,
    /// Derived monetary total.
    #[serde(default)]
    pub total_amount: Money,
}

impl CartState {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `item`.
    ///
    /// An existing line gains one unit and accumulates the *incoming* price
    /// into its line total; its stored unit price is kept.
    pub fn add_item(&mut self, item: &NewItem) -> Result<(), CartError> {
        let price = item.price.to_money()?;

        let mut next = self.clone();
        next.total_quantity = next
            .total_quantity
            .checked_add(1)
            .ok_or(CartError::Overflow)?;

        if let Some(line) = next.items.iter_mut().find(|l| l.id == item.id) {
            let quantity = line.quantity.checked_add(1).ok_or(CartError::Overflow)?;
            if quantity > MAX_QUANTITY_PER_ITEM {
                return Err(CartError::QuantityExceedsLimit(
                    quantity,
                    MAX_QUANTITY_PER_ITEM,
                ));
            }
            if price != line.unit_price {
                debug!(
                    id = %line.id,
                    stored = %line.unit_price,
                    incoming = %price,
                    "price drift on re-add"
                );
            }
            line.quantity = quantity;
            line.line_total = line
                .line_total
                .checked_add(&price)
                .ok_or(CartError::Overflow)?;
        } else {
            next.items.push(LineItem::new(
                item.id.clone(),
                item.title.clone(),
                item.image.clone(),
                price,
            ));
        }

        next.total_amount = next.compute_total()?;
        *self = next;
        Ok(())
    }

    /// Remove one unit of the line `id`, dropping the line at its last unit.
    pub fn remove_item(&mut self, id: &ItemId) -> Result<(), CartError> {
        let index = self
            .position(id)
            .ok_or_else(|| CartError::ItemNotFound(id.clone()))?;

        let mut next = self.clone();
        next.total_quantity = decrement_counter(next.total_quantity, 1);

        let line = &mut next.items[index];
        if line.quantity <= 1 {
            next.items.remove(index);
        } else {
            line.quantity -= 1;
            line.line_total = line
                .line_total
                .checked_sub(&line.unit_price)
                .ok_or(CartError::Overflow)?;
        }

        next.total_amount = next.compute_total()?;
        *self = next;
        Ok(())
    }

    /// Remove the line `id` with all its units.
    pub fn delete_item(&mut self, id: &ItemId) -> Result<(), CartError> {
        let index = self
            .position(id)
            .ok_or_else(|| CartError::ItemNotFound(id.clone()))?;

        let mut next = self.clone();
        let removed = next.items.remove(index);
        next.total_quantity = decrement_counter(next.total_quantity, removed.quantity);
        next.total_amount = next.compute_total()?;
        *self = next;
        Ok(())
    }

    /// Recompute the total as `sum(unit_price * quantity)` over all lines.
    pub fn compute_total(&self) -> Result<Money, CartError> {
        let subtotals = self
            .items
            .iter()
            .map(|line| line.subtotal().ok_or(CartError::Overflow))
            .collect::<Result<Vec<_>, _>>()?;
        Money::try_sum(subtotals).ok_or(CartError::Overflow)
    }

    /// Repair a state read from storage.
    ///
    /// Drops lines with a quantity below 1, folds repeated ids into their
    /// first line and caps each line at [`MAX_QUANTITY_PER_ITEM`]. The
    /// counter is then reset to the surviving quantities and the total is
    /// recomputed. Every repair is logged.
    pub fn normalize(&mut self) -> Result<(), CartError> {
        let mut lines: Vec<LineItem> = Vec::with_capacity(self.items.len());
        for line in self.items.drain(..) {
            if line.quantity < 1 {
                let err = CartError::InvalidQuantity(line.quantity);
                warn!(id = %line.id, error = %err, "dropping stored line");
                continue;
            }
            match lines.iter_mut().find(|l| l.id == line.id) {
                Some(first) => {
                    warn!(id = %line.id, "folding duplicate stored line");
                    first.quantity = first
                        .quantity
                        .checked_add(line.quantity)
                        .ok_or(CartError::Overflow)?;
                    first.line_total = first
                        .line_total
                        .checked_add(&line.line_total)
                        .ok_or(CartError::Overflow)?;
                }
                None => lines.push(line),
            }
        }
        for line in &mut lines {
            if line.quantity > MAX_QUANTITY_PER_ITEM {
                let err = CartError::QuantityExceedsLimit(line.quantity, MAX_QUANTITY_PER_ITEM);
                warn!(id = %line.id, error = %err, "capping stored line quantity");
                line.quantity = MAX_QUANTITY_PER_ITEM;
                line.line_total = line.subtotal().ok_or(CartError::Overflow)?;
            }
        }
        self.items = lines;

        let quantity = self.item_count();
        if self.total_quantity != quantity {
            warn!(
                stored = self.total_quantity,
                computed = quantity,
                "reset stored quantity counter"
            );
            self.total_quantity = quantity;
        }

        let total = self.compute_total()?;
        if total != self.total_amount {
            warn!(stored = %self.total_amount, computed = %total, "recomputed stored total");
            self.total_amount = total;
        }
        Ok(())
    }

    /// Whether the total matches the lines and every id is unique.
    pub fn is_consistent(&self) -> bool {
        let mut seen = HashSet::new();
        self.items.iter().all(|l| seen.insert(&l.id))
            && self.compute_total().ok() == Some(self.total_amount)
    }

    /// Get a line by id.
    pub fn get_item(&self, id: &ItemId) -> Option<&LineItem> {
        self.items.iter().find(|l| &l.id == id)
    }

    /// Get total unit count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|l| l.quantity).sum()
    }

    /// Get number of distinct lines.
    pub fn unique_item_count(&self) -> usize {
        self.items.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|l| &l.id == id)
    }
}

/// Decrease the quantity counter, clamping at zero.
fn decrement_counter(current: i64, by: i64) -> i64 {
    let next = current.saturating_sub(by);
    if next < 0 {
        let err = CartError::InvalidQuantity(next);
        warn!(error = %err, "quantity counter clamped to zero");
        return 0;
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(state: &mut CartState, id: u64, price: f64) {
        state
            .add_item(&NewItem::new(id, format!("Item {id}"), price))
            .unwrap();
    }

    fn line(state: &CartState, id: u64) -> &LineItem {
        state.get_item(&ItemId::from(id)).unwrap()
    }

    #[test]
    fn test_add_new_line() {
        let mut state = CartState::new();
        add(&mut state, 1, 10.0);

        assert_eq!(state.items.len(), 1);
        assert_eq!(line(&state, 1).quantity, 1);
        assert_eq!(line(&state, 1).line_total, Money::new(1000));
        assert_eq!(state.total_quantity, 1);
        assert_eq!(state.total_amount, Money::new(1000));
    }

    #[test]
    fn test_add_same_item_increases_quantity() {
        let mut state = CartState::new();
        add(&mut state, 1, 10.0);
        add(&mut state, 1, 10.0);

        assert_eq!(state.unique_item_count(), 1);
        assert_eq!(line(&state, 1).quantity, 2);
        assert_eq!(line(&state, 1).line_total, Money::new(2000));
        assert_eq!(state.total_quantity, 2);
        assert_eq!(state.total_amount, Money::new(2000));
    }

    #[test]
    fn test_readd_at_new_price_accumulates_incoming_price() {
        let mut state = CartState::new();
        add(&mut state, 1, 10.0);
        add(&mut state, 1, 12.0);

        let l = line(&state, 1);
        assert_eq!(l.unit_price, Money::new(1000));
        assert_eq!(l.line_total, Money::new(2200));
        assert!(l.has_drifted());
        // The cart total only trusts the stored unit price.
        assert_eq!(state.total_amount, Money::new(2000));
        assert!(state.is_consistent());
    }

    #[test]
    fn test_insertion_order_kept() {
        let mut state = CartState::new();
        add(&mut state, 3, 1.0);
        add(&mut state, 1, 1.0);
        add(&mut state, 3, 1.0);
        let ids: Vec<&str> = state.items.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1"]);
    }

    #[test]
    fn test_invalid_price_rejected_without_change() {
        let mut state = CartState::new();
        add(&mut state, 1, 10.0);
        let before = state.clone();

        let err = state.add_item(&NewItem::new(2u64, "B", "free")).unwrap_err();
        assert!(matches!(err, CartError::InvalidPrice(_)));
        let err = state.add_item(&NewItem::new(1u64, "A", -3.0)).unwrap_err();
        assert!(matches!(err, CartError::InvalidPrice(_)));
        assert_eq!(state, before);
    }

    #[test]
    fn test_quantity_limit() {
        let mut state = CartState::new();
        add(&mut state, 1, 1.0);
        state.items[0].quantity = MAX_QUANTITY_PER_ITEM;
        let before = state.clone();

        let err = state.add_item(&NewItem::new(1u64, "A", 1.0)).unwrap_err();
        assert!(matches!(err, CartError::QuantityExceedsLimit(10000, MAX_QUANTITY_PER_ITEM)));
        assert_eq!(state, before);
    }

    #[test]
    fn test_remove_decrements_then_drops() {
        let mut state = CartState::new();
        add(&mut state, 1, 10.0);
        add(&mut state, 1, 10.0);

        state.remove_item(&ItemId::from(1u64)).unwrap();
        assert_eq!(line(&state, 1).quantity, 1);
        assert_eq!(line(&state, 1).line_total, Money::new(1000));
        assert_eq!(state.total_quantity, 1);
        assert_eq!(state.total_amount, Money::new(1000));

        state.remove_item(&ItemId::from(1u64)).unwrap();
        assert!(state.is_empty());
        assert_eq!(state.total_quantity, 0);
        assert_eq!(state.total_amount, Money::zero());
    }

    #[test]
    fn test_remove_subtracts_stored_unit_price() {
        let mut state = CartState::new();
        add(&mut state, 1, 10.0);
        add(&mut state, 1, 12.0);

        state.remove_item(&ItemId::from(1u64)).unwrap();
        assert_eq!(line(&state, 1).line_total, Money::new(1200));
    }

    #[test]
    fn test_remove_missing_is_guarded() {
        let mut state = CartState::new();
        add(&mut state, 1, 10.0);
        let before = state.clone();

        let err = state.remove_item(&ItemId::from(9u64)).unwrap_err();
        assert!(matches!(err, CartError::ItemNotFound(id) if id.as_str() == "9"));
        assert_eq!(state, before);
    }

    #[test]
    fn test_delete_removes_all_units() {
        let mut state = CartState::new();
        add(&mut state, 1, 10.0);
        add(&mut state, 1, 10.0);
        add(&mut state, 2, 5.0);

        state.delete_item(&ItemId::from(1u64)).unwrap();
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.total_quantity, 1);
        assert_eq!(state.total_amount, Money::new(500));
    }

    #[test]
    fn test_delete_missing_twice_leaves_state() {
        let mut state = CartState::new();
        add(&mut state, 2, 5.0);
        let before = state.clone();

        for _ in 0..2 {
            assert!(matches!(
                state.delete_item(&ItemId::from(1u64)),
                Err(CartError::ItemNotFound(_))
            ));
        }
        assert_eq!(state, before);
    }

    #[test]
    fn test_counter_clamped_at_zero() {
        let mut state = CartState::new();
        add(&mut state, 1, 10.0);
        add(&mut state, 1, 10.0);
        state.total_quantity = 1;

        state.delete_item(&ItemId::from(1u64)).unwrap();
        assert_eq!(state.total_quantity, 0);
    }

    #[test]
    fn test_normalize_repairs_stored_state() {
        let mut state = CartState {
            items: vec![
                LineItem::new(ItemId::from("a"), "A", "", Money::new(100)),
                LineItem {
                    quantity: 0,
                    ..LineItem::new(ItemId::from("b"), "B", "", Money::new(200))
                },
                LineItem::new(ItemId::from("a"), "A", "", Money::new(100)),
            ],
            total_quantity: -4,
            total_amount: Money::new(99_999),
        };

        state.normalize().unwrap();
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.items[0].quantity, 2);
        assert_eq!(state.items[0].line_total, Money::new(200));
        assert_eq!(state.total_quantity, 2);
        assert_eq!(state.total_amount, Money::new(200));
        assert!(state.is_consistent());
    }

    #[test]
    fn test_normalize_caps_line_quantity() {
        let mut state = CartState {
            items: vec![
                LineItem {
                    quantity: MAX_QUANTITY_PER_ITEM - 1,
                    ..LineItem::new(ItemId::from("a"), "A", "", Money::new(100))
                },
                LineItem {
                    quantity: 5,
                    ..LineItem::new(ItemId::from("a"), "A", "", Money::new(100))
                },
            ],
            total_quantity: MAX_QUANTITY_PER_ITEM + 4,
            total_amount: Money::zero(),
        };

        state.normalize().unwrap();
        assert_eq!(state.items[0].quantity, MAX_QUANTITY_PER_ITEM);
        assert_eq!(state.items[0].line_total, Money::new(100 * MAX_QUANTITY_PER_ITEM));
        assert_eq!(state.total_quantity, MAX_QUANTITY_PER_ITEM);
        assert!(state.is_consistent());

        state.remove_item(&ItemId::from("a")).unwrap();
        state.add_item(&NewItem::new("a", "A", 1.0)).unwrap();
        assert_eq!(state.items[0].quantity, MAX_QUANTITY_PER_ITEM);
    }

    #[test]
    fn test_normalize_resets_counter_to_lines() {
        let mut state = CartState {
            items: vec![LineItem::new(ItemId::from("a"), "A", "", Money::new(100))],
            total_quantity: 7,
            total_amount: Money::new(100),
        };
        state.normalize().unwrap();
        assert_eq!(state.total_quantity, 1);

        let mut empty = CartState {
            total_quantity: 3,
            ..CartState::default()
        };
        empty.normalize().unwrap();
        assert_eq!(empty.total_quantity, 0);
    }

    #[test]
    fn test_snapshot_shape() {
        let mut state = CartState::new();
        add(&mut state, 1, 10.0);
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["totalAmount"], 10);
        assert_eq!(value["totalQuantity"], 1);
        assert_eq!(value["cartItems"][0]["id"], "1");
    }

    #[test]
    fn test_total_invariant_over_mixed_sequence() {
        let mut state = CartState::new();
        let prices = [3.99, 0.5, 12.0, 7.25];
        for step in 0..40u64 {
            let id = step % 4;
            match step % 5 {
                0 | 1 | 2 => add(&mut state, id, prices[id as usize]),
                3 => {
                    let _ = state.remove_item(&ItemId::from(id));
                }
                _ => {
                    let _ = state.delete_item(&ItemId::from(id));
                }
            }
            assert!(state.is_consistent(), "inconsistent after step {step}");
            assert_eq!(state.total_quantity, state.item_count());
        }
    }
}
