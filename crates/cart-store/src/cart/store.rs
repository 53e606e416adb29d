//! Persistent cart store.

use cart_kv::{JsonStore, KeyValueStore, StorageError};
use tracing::{debug, warn};

use crate::action::CartAction;
use crate::cart::{CartState, LineItem, NewItem};
use crate::config::StoreConfig;
use crate::error::CartError;
use crate::ids::ItemId;
use crate::money::Money;
use crate::persist::{self, LoadSource};

/// Cart state bound to the storage it is persisted in.
///
/// Created once per session with [`CartStore::open`], which reads whatever
/// the previous session left behind. Every successful operation writes the
/// full state back as one record. A failed write is logged and leaves the
/// in-memory cart updated; the store stays dirty until a later write or
/// [`CartStore::flush`] succeeds.
///
/// # Example
///
/// ```rust
/// use cart_kv::MemoryStore;
/// use cart_store::{CartStore, Money, NewItem};
///
/// let mut cart = CartStore::open(MemoryStore::new());
/// cart.add_item(NewItem::new(1u64, "Rust Programming Book", 49.99)).unwrap();
/// assert_eq!(cart.total_amount(), Money::new(4999));
/// ```
pub struct CartStore<S: KeyValueStore> {
    state: CartState,
    storage: JsonStore<S>,
    config: StoreConfig,
    dirty: bool,
    legacy_pending: bool,
    updated_at: Option<i64>,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Open the cart persisted in `storage` with the default configuration.
    pub fn open(storage: S) -> Self {
        Self::open_with(storage, StoreConfig::default())
    }

    /// Open the cart persisted in `storage`.
    pub fn open_with(storage: S, config: StoreConfig) -> Self {
        let storage = JsonStore::new(storage);
        let loaded = persist::load(&storage, &config);
        Self {
            state: loaded.state,
            storage,
            config,
            dirty: false,
            legacy_pending: loaded.source == LoadSource::Legacy,
            updated_at: loaded.updated_at,
        }
    }

    /// Add one unit of a product.
    pub fn add_item(&mut self, item: NewItem) -> Result<(), CartError> {
        if let Err(e) = self.state.add_item(&item) {
            warn!(id = %item.id, error = %e, "add rejected");
            return Err(e);
        }
        debug!(
            id = %item.id,
            total_quantity = self.state.total_quantity,
            total_amount = %self.state.total_amount,
            "item added"
        );
        self.persist();
        Ok(())
    }

    /// Remove one unit of a product.
    ///
    /// An unknown id is a no-op reported as [`CartError::ItemNotFound`].
    pub fn remove_item(&mut self, id: &ItemId) -> Result<(), CartError> {
        if let Err(e) = self.state.remove_item(id) {
            warn!(id = %id, error = %e, "remove ignored");
            return Err(e);
        }
        debug!(
            id = %id,
            total_quantity = self.state.total_quantity,
            total_amount = %self.state.total_amount,
            "item removed"
        );
        self.persist();
        Ok(())
    }

    /// Remove a product line with all its units.
    ///
    /// An unknown id is a no-op reported as [`CartError::ItemNotFound`].
    pub fn delete_item(&mut self, id: &ItemId) -> Result<(), CartError> {
        if let Err(e) = self.state.delete_item(id) {
            warn!(id = %id, error = %e, "delete ignored");
            return Err(e);
        }
        debug!(
            id = %id,
            total_quantity = self.state.total_quantity,
            total_amount = %self.state.total_amount,
            "item deleted"
        );
        self.persist();
        Ok(())
    }

    /// Apply an action sent by the UI.
    pub fn dispatch(&mut self, action: CartAction) -> Result<(), CartError> {
        match action {
            CartAction::AddItem(item) => self.add_item(item),
            CartAction::RemoveItem(id) => self.remove_item(&id),
            CartAction::DeleteItem(id) => self.delete_item(&id),
        }
    }

    /// Retry the last failed write.
    pub fn flush(&mut self) -> Result<(), CartError> {
        if !self.dirty {
            return Ok(());
        }
        self.write()?;
        self.dirty = false;
        Ok(())
    }

    /// Current state.
    pub fn state(&self) -> &CartState {
        &self.state
    }

    /// Owned copy of the current state.
    pub fn snapshot(&self) -> CartState {
        self.state.clone()
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.state.items
    }

    /// Get a line by id.
    pub fn get_item(&self, id: &ItemId) -> Option<&LineItem> {
        self.state.get_item(id)
    }

    /// Derived monetary total.
    pub fn total_amount(&self) -> Money {
        self.state.total_amount
    }

    /// Quantity counter.
    pub fn total_quantity(&self) -> i64 {
        self.state.total_quantity
    }

    /// Sum of line quantities.
    pub fn item_count(&self) -> i64 {
        self.state.item_count()
    }

    /// Number of distinct lines.
    pub fn unique_item_count(&self) -> usize {
        self.state.unique_item_count()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Whether the last write failed.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Unix timestamp of the last successful write, this session or before.
    pub fn updated_at(&self) -> Option<i64> {
        self.updated_at
    }

    /// Active configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Borrow the underlying storage.
    pub fn storage(&self) -> &S {
        self.storage.inner()
    }

    /// Mutably borrow the underlying storage.
    pub fn storage_mut(&mut self) -> &mut S {
        self.storage.inner_mut()
    }

    /// Unwrap into the underlying storage.
    pub fn into_storage(self) -> S {
        self.storage.into_inner()
    }

    fn persist(&mut self) {
        match self.write() {
            Ok(()) => self.dirty = false,
            Err(e) => {
                warn!(
                    key = %self.config.record_key(),
                    error = %e,
                    "failed to persist cart, keeping in-memory state"
                );
                self.dirty = true;
            }
        }
    }

    fn write(&mut self) -> Result<(), StorageError> {
        let now = current_timestamp();
        persist::save(&mut self.storage, &self.config, &self.state, now)?;
        self.updated_at = Some(now);

        if self.legacy_pending {
            match persist::clear_legacy(&mut self.storage) {
                Ok(()) => {
                    debug!("migrated legacy cart keys");
                    self.legacy_pending = false;
                }
                Err(e) => warn!(error = %e, "failed to remove legacy cart keys"),
            }
        }
        Ok(())
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cart_kv::MemoryStore;

    fn id(n: u64) -> ItemId {
        ItemId::from(n)
    }

    #[test]
    fn test_open_empty() {
        let cart = CartStore::open(MemoryStore::new());
        assert!(cart.is_empty());
        assert_eq!(cart.total_quantity(), 0);
        assert_eq!(cart.total_amount(), Money::zero());
        assert!(cart.updated_at().is_none());
    }

    #[test]
    fn test_every_operation_persists() {
        let mut cart = CartStore::open(MemoryStore::new());
        cart.add_item(NewItem::new(1u64, "A", 10.0)).unwrap();
        assert!(cart.storage().exists("cart").unwrap());
        assert!(cart.updated_at().is_some());

        cart.delete_item(&id(1)).unwrap();
        let reopened = CartStore::open(cart.into_storage());
        assert!(reopened.is_empty());
        assert_eq!(reopened.total_quantity(), 0);
    }

    #[test]
    fn test_rejected_operations_do_not_write() {
        let mut cart = CartStore::open(MemoryStore::new());
        assert!(matches!(
            cart.remove_item(&id(1)),
            Err(CartError::ItemNotFound(_))
        ));
        assert!(matches!(
            cart.add_item(NewItem::new(1u64, "A", "abc")),
            Err(CartError::InvalidPrice(_))
        ));
        assert!(cart.storage().is_empty());
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let mut cart = CartStore::open(MemoryStore::with_quota(16));
        cart.add_item(NewItem::new(1u64, "A", 10.0)).unwrap();

        assert_eq!(cart.total_quantity(), 1);
        assert_eq!(cart.total_amount(), Money::new(1000));
        assert!(cart.is_dirty());
        assert!(cart.storage().is_empty());
    }

    #[test]
    fn test_flush_after_storage_recovers() {
        let mut cart = CartStore::open(MemoryStore::new());
        cart.storage_mut().set_disabled(true);
        cart.add_item(NewItem::new(1u64, "A", 10.0)).unwrap();
        assert!(cart.is_dirty());
        assert!(matches!(
            cart.flush(),
            Err(CartError::Storage(StorageError::Disabled))
        ));

        cart.storage_mut().set_disabled(false);
        cart.flush().unwrap();
        assert!(!cart.is_dirty());

        let reopened = CartStore::open(cart.into_storage());
        assert_eq!(reopened.total_quantity(), 1);
    }

    #[test]
    fn test_flush_when_clean_is_noop() {
        let mut cart = CartStore::open(MemoryStore::disabled());
        cart.flush().unwrap();
    }

    #[test]
    fn test_dispatch_actions() {
        let mut cart = CartStore::open(MemoryStore::new());
        let actions = [
            r#"{"type":"cart/addItem","payload":{"id":1,"title":"A","img":"a.png","price":10}}"#,
            r#"{"type":"cart/addItem","payload":{"id":2,"title":"B","img":"b.png","price":"5"}}"#,
            r#"{"type":"cart/removeItem","payload":1}"#,
        ];
        for raw in actions {
            cart.dispatch(CartAction::from_json(raw).unwrap()).unwrap();
        }

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.get_item(&id(2)).map(|l| l.image.as_str()), Some("b.png"));
        assert_eq!(cart.total_amount(), Money::new(500));

        cart.dispatch(CartAction::DeleteItem(id(2))).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_namespaced_record_key() {
        let config = StoreConfig::default().with_namespace("shop");
        let mut cart = CartStore::open_with(MemoryStore::new(), config);
        cart.add_item(NewItem::new(1u64, "A", 1.0)).unwrap();
        assert_eq!(cart.storage().keys().unwrap(), vec!["shop:cart"]);
    }

    #[test]
    fn test_legacy_keys_migrated_on_first_write() {
        let mut raw = MemoryStore::new();
        raw.set(
            "cartItems",
            r#"[{"id":1,"title":"A","img":"","price":10,"quantity":1,"totalPrice":10}]"#,
        )
        .unwrap();
        raw.set("totalAmount", "10").unwrap();
        raw.set("totalQuantity", "1").unwrap();

        let mut cart = CartStore::open(raw);
        assert_eq!(cart.total_quantity(), 1);
        // Reading alone does not rewrite storage.
        assert_eq!(cart.storage().len(), 3);

        cart.add_item(NewItem::new(1u64, "A", 10.0)).unwrap();
        assert_eq!(cart.storage().keys().unwrap(), vec!["cart"]);

        let reopened = CartStore::open(cart.into_storage());
        assert_eq!(reopened.get_item(&id(1)).map(|l| l.quantity), Some(2));
        assert_eq!(reopened.total_amount(), Money::new(2000));
    }
}
