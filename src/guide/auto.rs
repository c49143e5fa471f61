//! Mean-field auto-guide
//!
//! When a latent has no explicit guide, an auto-guide builds one whose
//! family matches the support of the prior and whose parameters live in a
//! parameter table, keyed by the choice address:
//!
//! - real support: `Normal(mu, exp(log_sigma))` with `{address}.mu` and
//!   `{address}.log_sigma`
//! - boolean support: `Bernoulli(sigmoid(logit))` with `{address}.logit`
//! - `k` categories: `Categorical(softmax(logits))` with
//!   `{address}.logit#0` .. `{address}.logit#{k-1}`
//!
//! Bounded real supports get no auto-guide. Parameters are registered at
//! zero the first time an address is seen.

use std::sync::Arc;

use fugue::Address;

use super::resolver::{ExplicitGuides, GuideResolver};
use crate::distributions::builtin::{Bernoulli, Categorical, Normal};
use crate::distributions::traits::{Distribution, Support};
use crate::error::DreamResult;
use crate::params::Params;
use crate::runtime::coroutine::SampleOptions;
use crate::runtime::store::Store;

/// Resolver that falls back to a parameterized mean-field guide
#[derive(Clone, Debug, Default)]
pub struct AutoGuide {
    explicit: ExplicitGuides,
    params: Params,
}

impl AutoGuide {
    /// Create an auto-guide with no parameters registered yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `explicit` before falling back to the auto-guide
    pub fn with_explicit(mut self, explicit: ExplicitGuides) -> Self {
        self.explicit = explicit;
        self
    }

    /// Start from existing parameter values
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    fn build(
        &mut self,
        support: Support,
        address: &Address,
    ) -> DreamResult<Option<Arc<dyn Distribution>>> {
        let prefix = &address.0;
        let guide: Arc<dyn Distribution> = match support {
            Support::Real => {
                let mu = self.params.get_or_init(&format!("{prefix}.mu"), 0.0);
                let log_sigma = self.params.get_or_init(&format!("{prefix}.log_sigma"), 0.0);
                Arc::new(Normal::new(mu, log_sigma.exp())?)
            }
            Support::Boolean => {
                let logit = self.params.get_or_init(&format!("{prefix}.logit"), 0.0);
                Arc::new(Bernoulli::new(sigmoid(logit))?)
            }
            Support::Discrete { categories } => {
                let logits: Vec<f64> = (0..categories)
                    .map(|i| self.params.get_or_init(&format!("{prefix}.logit#{i}"), 0.0))
                    .collect();
                Arc::new(Categorical::new(softmax(&logits))?)
            }
            Support::Interval { .. } => return Ok(None),
        };
        Ok(Some(guide))
    }
}

impl GuideResolver for AutoGuide {
    fn resolve(
        &mut self,
        dist: &dyn Distribution,
        options: &SampleOptions,
        _store: &Store,
        address: &Address,
    ) -> DreamResult<Option<Arc<dyn Distribution>>> {
        if let Some(guide) = self.explicit.lookup(options, address) {
            return Ok(Some(guide));
        }
        if options.no_auto_guide {
            return Ok(None);
        }
        self.build(dist.support(), address)
    }

    fn params(&self) -> Option<&Params> {
        Some(&self.params)
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}
