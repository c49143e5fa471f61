//! Program store
//!
//! The store is the mutable global state a generative program threads
//! through its execution. Every run gets its own clone, and every recorded
//! choice keeps a snapshot of the store as it was at that choice.

use std::collections::BTreeMap;

use fugue::ChoiceValue;

/// Key-value state visible to a running program
#[derive(Clone, Debug, Default)]
pub struct Store {
    values: BTreeMap<String, ChoiceValue>,
}

impl Store {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion
    pub fn with(mut self, key: impl Into<String>, value: ChoiceValue) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Look up a value
    pub fn get(&self, key: &str) -> Option<&ChoiceValue> {
        self.values.get(key)
    }

    /// Set a value, returning the previous one
    pub fn set(&mut self, key: impl Into<String>, value: ChoiceValue) -> Option<ChoiceValue> {
        self.values.insert(key.into(), value)
    }

    /// Remove a value
    pub fn remove(&mut self, key: &str) -> Option<ChoiceValue> {
        self.values.remove(key)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ChoiceValue)> {
        self.values.iter()
    }
}
