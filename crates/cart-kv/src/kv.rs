//! Key-value store abstraction with automatic JSON serialization.

use crate::StorageError;
use serde::{de::DeserializeOwned, Serialize};

/// A durable, string-valued key-value store.
///
/// Mirrors the browser `localStorage` contract: keys and values are strings,
/// every `set` replaces the previous value wholesale.
pub trait KeyValueStore {
    /// Get the raw value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    fn delete(&mut self, key: &str) -> Result<(), StorageError>;

    /// List all keys, in unspecified order.
    fn keys(&self) -> Result<Vec<String>, StorageError>;

    /// Check if a key exists.
    fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key)?.is_some())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).delete(key)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        (**self).keys()
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).delete(key)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        (**self).keys()
    }
}

/// Type-safe wrapper over a [`KeyValueStore`].
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`.
///
/// # Example
///
/// ```rust
/// use cart_kv::{JsonStore, MemoryStore};
///
/// let mut store = JsonStore::new(MemoryStore::new());
/// store.set("totalQuantity", &3).unwrap();
/// let qty: Option<i64> = store.get("totalQuantity").unwrap();
/// assert_eq!(qty, Some(3));
/// ```
#[derive(Debug, Default)]
pub struct JsonStore<S> {
    inner: S,
}

impl<S: KeyValueStore> JsonStore<S> {
    /// Wrap a raw store.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Get a value from the store.
    ///
    /// Returns `None` if the key doesn't exist or holds JSON `null`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.inner.get(key)? {
            Some(raw) => {
                let value: Option<T> = serde_json::from_str(&raw)?;
                Ok(value)
            }
            None => Ok(None),
        }
    }

    /// Set a value in the store.
    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)?;
        self.inner.set(key, &raw)
    }

    /// Delete a value from the store.
    pub fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        self.inner.delete(key)
    }

    /// Check if a key exists in the store.
    pub fn exists(&self, key: &str) -> Result<bool, StorageError> {
        self.inner.exists(key)
    }

    /// Get all keys in the store.
    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.inner.keys()
    }

    /// Borrow the raw store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Mutably borrow the raw store.
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Unwrap into the raw store.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

/// Helper to build storage keys with namespacing.
///
/// # Example
///
/// ```rust
/// let key = cart_kv::storage_key!("shop", "cart");
/// assert_eq!(key, "shop:cart");
/// ```
#[macro_export]
macro_rules! storage_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Line {
        id: String,
        quantity: i64,
    }

    #[test]
    fn test_json_store_get_missing() {
        let store = JsonStore::new(MemoryStore::new());
        let value: Option<Line> = store.get("nope").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_json_store_null_is_absent() {
        let mut raw = MemoryStore::new();
        raw.set("cartItems", "null").unwrap();
        let store = JsonStore::new(raw);
        let value: Option<Vec<Line>> = store.get("cartItems").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_json_store_set_writes_json_text() {
        let mut store = JsonStore::new(MemoryStore::new());
        let lines = vec![Line {
            id: "1".into(),
            quantity: 2,
        }];
        store.set("cartItems", &lines).unwrap();

        assert_eq!(
            store.inner().get("cartItems").unwrap().as_deref(),
            Some(r#"[{"id":"1","quantity":2}]"#)
        );
        let back: Option<Vec<Line>> = store.get("cartItems").unwrap();
        assert_eq!(back, Some(lines));
    }

    #[test]
    fn test_json_store_corrupt_value_is_error() {
        let mut raw = MemoryStore::new();
        raw.set("totalAmount", "{not json").unwrap();
        let store = JsonStore::new(raw);
        let result: Result<Option<f64>, _> = store.get("totalAmount");
        assert!(matches!(result, Err(StorageError::Serialize(_))));
    }

    #[test]
    fn test_store_through_mut_ref() {
        let mut raw = MemoryStore::new();
        {
            let mut store = JsonStore::new(&mut raw);
            store.set("k", &1).unwrap();
        }
        assert!(raw.exists("k").unwrap());
    }

    #[test]
    fn test_storage_key_macro() {
        assert_eq!(storage_key!("shop", "cart"), "shop:cart");
        assert_eq!(storage_key!("a", "b", 3), "a:b:3");
    }
}
