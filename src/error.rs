//! Error types for fugue-dream
//!
//! Every structural assumption the fantasy estimator makes about a model
//! has its own variant, so a failing run names the assumption it broke.

use thiserror::Error;

/// Address type used in error reports
pub type AddressName = String;

/// Error type for fantasy sampling and the surrounding runtime
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DreamError {
    /// A bulk-data construct was entered while another one was active
    #[error("nested mapData is not supported by the dream estimator (at {address})")]
    NestedMapData { address: AddressName },

    /// `observe` was called with no enclosing bulk-data construct
    #[error("observe can only be used within mapData with the dream estimator (at {address})")]
    ObserveOutsideMapData { address: AddressName },

    /// A single-valued datum was observed more than once
    #[error("expected only a single observe per data point (at {address})")]
    MultipleObservations { address: AddressName },

    /// A single-valued datum finished without any observation
    #[error("data point {index} was never observed")]
    MissingObservation { index: usize },

    /// No guide distribution could be resolved for a global latent
    #[error("no guide distribution for address {address}")]
    MissingGuide { address: AddressName },

    /// Invalid estimator configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Distribution constructed with invalid parameters
    #[error("Invalid distribution: {0}")]
    InvalidDistribution(String),

    /// Failure raised by model code
    #[error("Program error: {0}")]
    Program(String),

    /// The active-handler slot returned a handler of an unexpected type
    #[error("Handler mismatch: expected {expected}, got {actual}")]
    HandlerMismatch {
        expected: &'static str,
        actual: &'static str,
    },
}

impl DreamError {
    /// Returns true for errors caused by a model violating the estimator's
    /// structural assumptions
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::NestedMapData { .. }
                | Self::ObserveOutsideMapData { .. }
                | Self::MultipleObservations { .. }
                | Self::MissingObservation { .. }
                | Self::MissingGuide { .. }
        )
    }
}

/// Result type alias for dream operations
pub type DreamResult<T> = Result<T, DreamError>;
