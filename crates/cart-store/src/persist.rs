//! Persisted cart record and loading from storage.
//!
//! The cart is written as one record under one key so a crash can never
//! leave its parts disagreeing. Storage written by older storefront builds
//! kept three separate keys; those are still read, and removed once a
//! record has been written.

use cart_kv::{JsonStore, KeyValueStore, StorageError};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::cart::{CartState, LineItem};
use crate::config::StoreConfig;
use crate::money::Money;

/// Version written into every record.
pub const RECORD_VERSION: u32 = 1;

/// Legacy key holding the line array.
pub const LEGACY_ITEMS_KEY: &str = "cartItems";
/// Legacy key holding the total amount.
pub const LEGACY_AMOUNT_KEY: &str = "totalAmount";
/// Legacy key holding the quantity counter.
pub const LEGACY_QUANTITY_KEY: &str = "totalQuantity";

/// A cart record as read from storage.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRecord {
    /// Format version.
    pub version: u32,
    /// The cart itself.
    #[serde(flatten)]
    pub state: CartState,
    /// Unix timestamp of the write.
    #[serde(default)]
    pub updated_at: i64,
}

/// Borrowed form of [`CartRecord`] used for writing.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordRef<'a> {
    version: u32,
    #[serde(flatten)]
    state: &'a CartState,
    updated_at: i64,
}

/// Which layout a state was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// The single-key record.
    Record,
    /// The three legacy keys.
    Legacy,
    /// Nothing usable was stored.
    Empty,
}

/// Result of reading a cart from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub state: CartState,
    pub source: LoadSource,
    pub updated_at: Option<i64>,
}

impl Loaded {
    fn empty() -> Self {
        Self {
            state: CartState::default(),
            source: LoadSource::Empty,
            updated_at: None,
        }
    }
}

/// Read the cart, falling back to defaults for anything missing or corrupt.
///
/// Never fails: storage problems are logged and yield an empty cart.
pub fn load<S: KeyValueStore>(store: &JsonStore<S>, config: &StoreConfig) -> Loaded {
    let key = config.record_key();
    let mut loaded = match store.get::<CartRecord>(&key) {
        Ok(Some(record)) => {
            if record.version > RECORD_VERSION {
                warn!(
                    key = %key,
                    version = record.version,
                    "cart record is newer than this build understands"
                );
            }
            Loaded {
                state: record.state,
                source: LoadSource::Record,
                updated_at: Some(record.updated_at),
            }
        }
        Ok(None) if config.read_legacy_keys => load_legacy(store),
        Ok(None) => Loaded::empty(),
        Err(e) => {
            warn!(key = %key, error = %e, "unreadable cart record, starting empty");
            Loaded::empty()
        }
    };

    if let Err(e) = loaded.state.normalize() {
        warn!(error = %e, "stored cart cannot be repaired, starting empty");
        return Loaded::empty();
    }
    debug!(
        source = ?loaded.source,
        lines = loaded.state.items.len(),
        total_quantity = loaded.state.total_quantity,
        "loaded cart"
    );
    loaded
}

fn load_legacy<S: KeyValueStore>(store: &JsonStore<S>) -> Loaded {
    let items = read_legacy_items(store);
    let total_amount: Option<Money> = read_lenient(store, LEGACY_AMOUNT_KEY);
    let total_quantity: Option<i64> = read_lenient(store, LEGACY_QUANTITY_KEY);

    if items.is_none() && total_amount.is_none() && total_quantity.is_none() {
        return Loaded::empty();
    }
    Loaded {
        state: CartState {
            items: items.unwrap_or_default(),
            total_quantity: total_quantity.unwrap_or_default(),
            total_amount: total_amount.unwrap_or_default(),
        },
        source: LoadSource::Legacy,
        updated_at: None,
    }
}

/// Read the legacy line array one line at a time so a single bad line
/// does not take the rest of the cart with it.
fn read_legacy_items<S: KeyValueStore>(store: &JsonStore<S>) -> Option<Vec<LineItem>> {
    let raw: Vec<Value> = read_lenient(store, LEGACY_ITEMS_KEY)?;
    Some(
        raw.into_iter()
            .enumerate()
            .filter_map(|(index, value)| read_legacy_line(index, value))
            .collect(),
    )
}

fn read_legacy_line(index: usize, mut value: Value) -> Option<LineItem> {
    // A running total that went NaN was written out as null.
    let missing_total = match value.as_object_mut() {
        Some(fields) if fields.get("totalPrice").map_or(true, Value::is_null) => {
            fields.insert("totalPrice".to_string(), Value::from(0));
            true
        }
        _ => false,
    };

    let mut line: LineItem = match serde_json::from_value(value) {
        Ok(line) => line,
        Err(e) => {
            warn!(index, error = %e, "dropping unreadable legacy cart line");
            return None;
        }
    };
    if missing_total {
        match line.subtotal() {
            Some(total) => {
                warn!(id = %line.id, "rebuilt missing legacy line total");
                line.line_total = total;
            }
            None => {
                warn!(id = %line.id, "dropping legacy cart line with overflowing total");
                return None;
            }
        }
    }
    Some(line)
}

fn read_lenient<S: KeyValueStore, T: DeserializeOwned>(store: &JsonStore<S>, key: &str) -> Option<T> {
    store.get(key).unwrap_or_else(|e| {
        warn!(key, error = %e, "unreadable legacy cart key, using default");
        None
    })
}

/// Write `state` as one record.
pub fn save<S: KeyValueStore>(
    store: &mut JsonStore<S>,
    config: &StoreConfig,
    state: &CartState,
    updated_at: i64,
) -> Result<(), StorageError> {
    let record = RecordRef {
        version: RECORD_VERSION,
        state,
        updated_at,
    };
    store.set(&config.record_key(), &record)
}

/// Remove the legacy keys.
pub fn clear_legacy<S: KeyValueStore>(store: &mut JsonStore<S>) -> Result<(), StorageError> {
    for key in [LEGACY_ITEMS_KEY, LEGACY_AMOUNT_KEY, LEGACY_QUANTITY_KEY] {
        store.delete(key)?;
    }
    Ok(())
}
