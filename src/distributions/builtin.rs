//! Built-in distribution families

use std::f64::consts::PI;

use fugue::ChoiceValue;
use rand::{Rng, RngCore};
use rand::distributions::WeightedIndex;
use rand_distr::{Distribution as _, StandardNormal};
use serde::{Deserialize, Serialize};

use super::traits::{value_as_f64, Distribution, Support};
use crate::error::{DreamError, DreamResult};

/// Gaussian distribution
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Normal {
    mu: f64,
    sigma: f64,
}

impl Normal {
    /// Create a normal distribution; `sigma` must be finite and positive
    pub fn new(mu: f64, sigma: f64) -> DreamResult<Self> {
        if !mu.is_finite() || !sigma.is_finite() || sigma <= 0.0 {
            return Err(DreamError::InvalidDistribution(format!(
                "normal requires finite mu and positive sigma, got mu={mu}, sigma={sigma}"
            )));
        }
        Ok(Self { mu, sigma })
    }

    /// Standard normal N(0, 1)
    pub fn standard() -> Self {
        Self { mu: 0.0, sigma: 1.0 }
    }

    /// Mean
    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// Standard deviation
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl Distribution for Normal {
    fn name(&self) -> &'static str {
        "normal"
    }

    fn sample(&self, rng: &mut dyn RngCore) -> ChoiceValue {
        let z: f64 = StandardNormal.sample(rng);
        ChoiceValue::F64(self.mu + self.sigma * z)
    }

    fn log_prob(&self, value: &ChoiceValue) -> f64 {
        match value {
            ChoiceValue::F64(x) => {
                let z = (x - self.mu) / self.sigma;
                -0.5 * (2.0 * PI).ln() - self.sigma.ln() - 0.5 * z * z
            }
            _ => f64::NEG_INFINITY,
        }
    }

    fn support(&self) -> Support {
        Support::Real
    }
}

/// Bernoulli distribution over booleans
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bernoulli {
    p: f64,
}

impl Bernoulli {
    /// Create a Bernoulli distribution with success probability `p`
    pub fn new(p: f64) -> DreamResult<Self> {
        if !(0.0..=1.0).contains(&p) {
            return Err(DreamError::InvalidDistribution(format!(
                "bernoulli requires p in [0, 1], got {p}"
            )));
        }
        Ok(Self { p })
    }

    /// Success probability
    pub fn p(&self) -> f64 {
        self.p
    }
}

impl Distribution for Bernoulli {
    fn name(&self) -> &'static str {
        "bernoulli"
    }

    fn sample(&self, rng: &mut dyn RngCore) -> ChoiceValue {
        ChoiceValue::Bool(rng.gen_bool(self.p))
    }

    fn log_prob(&self, value: &ChoiceValue) -> f64 {
        match value {
            ChoiceValue::Bool(true) => self.p.ln(),
            ChoiceValue::Bool(false) => (1.0 - self.p).ln(),
            _ => f64::NEG_INFINITY,
        }
    }

    fn support(&self) -> Support {
        Support::Boolean
    }
}

/// Continuous uniform distribution on `[low, high)`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Uniform {
    low: f64,
    high: f64,
}

impl Uniform {
    /// Create a uniform distribution; requires `low < high` with a finite width
    pub fn new(low: f64, high: f64) -> DreamResult<Self> {
        if !low.is_finite() || !high.is_finite() || low >= high || !(high - low).is_finite() {
            return Err(DreamError::InvalidDistribution(format!(
                "uniform requires finite low < high, got [{low}, {high})"
            )));
        }
        Ok(Self { low, high })
    }
}

impl Distribution for Uniform {
    fn name(&self) -> &'static str {
        "uniform"
    }

    fn sample(&self, rng: &mut dyn RngCore) -> ChoiceValue {
        ChoiceValue::F64(rng.gen_range(self.low..self.high))
    }

    fn log_prob(&self, value: &ChoiceValue) -> f64 {
        match value {
            ChoiceValue::F64(x) if *x >= self.low && *x < self.high => {
                -(self.high - self.low).ln()
            }
            _ => f64::NEG_INFINITY,
        }
    }

    fn support(&self) -> Support {
        Support::Interval {
            low: self.low,
            high: self.high,
        }
    }
}

/// Categorical distribution over indices `0..weights.len()`
///
/// Weights need not be normalized.
#[derive(Clone, Debug)]
pub struct Categorical {
    probs: Vec<f64>,
    index: WeightedIndex<f64>,
}

impl Categorical {
    /// Create a categorical distribution from finite, non-negative weights
    pub fn new(weights: Vec<f64>) -> DreamResult<Self> {
        if let Some(w) = weights.iter().find(|w| !w.is_finite()) {
            return Err(DreamError::InvalidDistribution(format!(
                "categorical weights must be finite, got {w}"
            )));
        }
        if !weights.iter().sum::<f64>().is_finite() {
            return Err(DreamError::InvalidDistribution(
                "categorical total weight overflows".to_string(),
            ));
        }
        let index = WeightedIndex::new(&weights)
            .map_err(|e| DreamError::InvalidDistribution(format!("categorical: {e}")))?;
        let total: f64 = weights.iter().sum();
        let probs = weights.iter().map(|w| w / total).collect();
        Ok(Self { probs, index })
    }

    /// Normalized category probabilities
    pub fn probs(&self) -> &[f64] {
        &self.probs
    }
}

impl Distribution for Categorical {
    fn name(&self) -> &'static str {
        "categorical"
    }

    fn sample(&self, rng: &mut dyn RngCore) -> ChoiceValue {
        ChoiceValue::Usize(self.index.sample(rng))
    }

    fn log_prob(&self, value: &ChoiceValue) -> f64 {
        match value {
            ChoiceValue::Usize(i) => self
                .probs
                .get(*i)
                .map(|p| p.ln())
                .unwrap_or(f64::NEG_INFINITY),
            _ => f64::NEG_INFINITY,
        }
    }

    fn support(&self) -> Support {
        Support::Discrete {
            categories: self.probs.len(),
        }
    }
}

/// Point mass at a single real value
///
/// Handy as an explicit guide in tests and for pinning latents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    value: f64,
}

impl Delta {
    /// Create a point mass at `value`
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl Distribution for Delta {
    fn name(&self) -> &'static str {
        "delta"
    }

    fn sample(&self, _rng: &mut dyn RngCore) -> ChoiceValue {
        ChoiceValue::F64(self.value)
    }

    fn log_prob(&self, value: &ChoiceValue) -> f64 {
        match value_as_f64(value) {
            Some(x) if x == self.value => 0.0,
            _ => f64::NEG_INFINITY,
        }
    }

    fn support(&self) -> Support {
        Support::Real
    }
}
