//! Dream estimator
//!
//! The sleep-phase estimator for guide optimization: every optimization
//! step runs the model forward `samples` times with a fresh
//! [`FantasyCoroutine`] and hands each fantasy record to the gradient
//! stage.
//!
//! The gradient stage is not implemented. Each record is logged and
//! contributes an empty gradient and a zero objective, so a step returns
//! `(empty, 0.0)` after running every fantasy.

use fugue::Address;
use tracing::{debug, trace};

use super::config::DreamOptions;
use super::coroutine::FantasyCoroutine;
use super::record::Record;
use crate::error::DreamResult;
use crate::inference::{Estimate, Estimator, OptimizerState};
use crate::params::Params;
use crate::runtime::env::Env;
use crate::runtime::program::Program;
use crate::runtime::store::Store;

/// Wake-sleep "dream" estimator
#[derive(Clone, Debug, Default)]
pub struct DreamEstimator {
    options: DreamOptions,
}

impl DreamEstimator {
    /// Create an estimator; fails on invalid options
    pub fn new(options: DreamOptions) -> DreamResult<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Options in use
    pub fn options(&self) -> &DreamOptions {
        &self.options
    }

    /// Run `samples` fantasies and return their records
    pub fn fantasize(
        &self,
        env: &mut Env,
        program: &dyn Program,
        store: &Store,
        address: &Address,
    ) -> DreamResult<Vec<Record>> {
        let mut records = Vec::with_capacity(self.options.samples);
        for _ in 0..self.options.samples {
            records.push(FantasyCoroutine::new().run(env, program, store, address)?);
        }
        Ok(records)
    }
}

impl Estimator for DreamEstimator {
    fn estimate(
        &self,
        env: &mut Env,
        program: &dyn Program,
        store: &Store,
        address: &Address,
        state: &OptimizerState,
        step: usize,
    ) -> DreamResult<Estimate> {
        let mut gradient = Params::new();
        let mut objective = 0.0;

        for sample in 0..self.options.samples {
            let record = FantasyCoroutine::new().run(env, program, store, address)?;
            debug!(
                step,
                sample,
                choices = record.trace.len(),
                data = record.len(),
                "fantasy record"
            );
            trace!(record = ?record, "fantasy record contents");

            let (g, objective_i) = record_gradient(&record, state);
            gradient.add_eq(&g);
            objective += objective_i;
        }

        Ok(Estimate {
            gradient,
            objective,
        })
    }
}

/// Gradient and objective contributed by one fantasy record
///
/// Not implemented: returns an empty gradient and a zero objective.
fn record_gradient(_record: &Record, _state: &OptimizerState) -> (Params, f64) {
    (Params::new(), 0.0)
}
