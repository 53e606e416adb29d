//! Store configuration.

use cart_kv::storage_key;
use serde::{Deserialize, Serialize};

/// Where and how a [`CartStore`](crate::CartStore) persists its record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Key holding the cart record.
    #[serde(default = "default_key")]
    pub key: String,

    /// Optional prefix, giving `<namespace>:<key>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Fall back to the three-key legacy layout when no record exists.
    #[serde(default = "default_true")]
    pub read_legacy_keys: bool,
}

fn default_key() -> String {
    "cart".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            key: default_key(),
            namespace: None,
            read_legacy_keys: true,
        }
    }
}

impl StoreConfig {
    /// Set the record key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Set the key namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Ignore the legacy layout.
    pub fn without_legacy_keys(mut self) -> Self {
        self.read_legacy_keys = false;
        self
    }

    /// Fully qualified key of the cart record.
    pub fn record_key(&self) -> String {
        match &self.namespace {
            Some(ns) => storage_key!(ns.as_str(), self.key),
            None => self.key.clone(),
        }
    }
}
