//! Named real-valued parameters
//!
//! Guide parameters and gradients share this representation: a table from
//! parameter name to value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Table of named parameters (or of gradients with respect to them)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Params {
    values: BTreeMap<String, f64>,
}

impl Params {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Look up a parameter
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Set a parameter
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// Look up a parameter, registering `init` when absent
    pub fn get_or_init(&mut self, name: &str, init: f64) -> f64 {
        *self.values.entry(name.to_string()).or_insert(init)
    }

    /// Element-wise `self += other`; names missing from `self` are added
    pub fn add_eq(&mut self, other: &Params) {
        for (name, value) in &other.values {
            *self.values.entry(name.clone()).or_insert(0.0) += value;
        }
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.values.iter()
    }
}
