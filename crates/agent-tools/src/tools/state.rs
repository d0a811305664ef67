use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::errors::JsonValidationError;
use crate::value::{deep_copy_with_validation, AnyValue};

/// Key/value state shared between an agent and the tools it runs.
///
/// Values are validated and copied on the way in, and copied on the way out, so a caller can
/// never hold a live reference into the store. Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct AgentState {
    values: Arc<RwLock<BTreeMap<String, Value>>>,
}

impl AgentState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Store a value under `key`. Fails, leaving the previous value in place, when the value
    /// has no JSON form; the error path is rooted at the key.
    pub fn set<K, V>(&self, key: K, value: V) -> Result<(), JsonValidationError>
    where
        K: Into<String>,
        V: Into<AnyValue>,
    {
        let key = key.into();
        let copied = deep_copy_with_validation(&value.into(), &key)?;
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, copied);
        Ok(())
    }

    pub fn delete(&self, key: &str) -> Option<Value> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    pub fn clear(&self) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Keys in sorted order
    pub fn keys(&self) -> Vec<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    pub fn get_all(&self) -> BTreeMap<String, Value> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
