//! Estimator configuration

use serde::{Deserialize, Serialize};

use crate::error::{DreamError, DreamResult};

/// Options recognized by the dream estimator
///
/// Missing fields take their defaults when deserializing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DreamOptions {
    /// Number of independent fantasy runs per optimization step
    pub samples: usize,
}

impl Default for DreamOptions {
    fn default() -> Self {
        Self { samples: 1 }
    }
}

impl DreamOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of fantasy runs per step
    pub fn samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    /// Check that the options are usable
    pub fn validate(&self) -> DreamResult<()> {
        if self.samples < 1 {
            return Err(DreamError::Configuration(
                "samples must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse options from JSON, filling in defaults, and validate them
    pub fn from_json(json: &str) -> DreamResult<Self> {
        let options: Self = serde_json::from_str(json)
            .map_err(|e| DreamError::Configuration(format!("failed to parse options: {e}")))?;
        options.validate()?;
        Ok(options)
    }
}
