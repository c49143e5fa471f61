//! Gradient estimators for guide optimization
//!
//! An optimizer calls an [`Estimator`] once per step and applies the
//! returned gradient to its parameters.

use fugue::Address;
use serde::{Deserialize, Serialize};

use crate::error::DreamResult;
use crate::params::Params;
use crate::runtime::env::Env;
use crate::runtime::program::Program;
use crate::runtime::store::Store;

pub mod dream;

/// State an optimizer carries between steps
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizerState {
    /// Current parameter values
    pub params: Params,
}

/// Result of one estimation step
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Estimate {
    /// Gradient with respect to the guide parameters
    pub gradient: Params,
    /// Objective value at the current parameters
    pub objective: f64,
}

/// Per-step gradient estimator
pub trait Estimator {
    /// Estimate the gradient and objective for optimization step `step`
    fn estimate(
        &self,
        env: &mut Env,
        program: &dyn Program,
        store: &Store,
        address: &Address,
        state: &OptimizerState,
        step: usize,
    ) -> DreamResult<Estimate>;
}

pub mod prelude {
    pub use super::dream::prelude::*;
    pub use super::{Estimate, Estimator, OptimizerState};
}
