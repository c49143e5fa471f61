//! Core distribution trait
//!
//! Distributions produce Fugue `ChoiceValue`s so that latent samples,
//! fantasized observations and data all share one value type.

use std::fmt;

use fugue::ChoiceValue;
use rand::RngCore;

/// Support of a distribution, used to pick a matching auto-guide family
#[derive(Clone, Debug, PartialEq)]
pub enum Support {
    /// The whole real line
    Real,
    /// A bounded real interval `[low, high)`
    Interval { low: f64, high: f64 },
    /// `true` / `false`
    Boolean,
    /// Category indices `0..categories`
    Discrete { categories: usize },
}

/// A distribution that can be sampled and scored
///
/// Implementations must be cheap to share: the trace keeps an
/// `Arc<dyn Distribution>` for every recorded choice.
pub trait Distribution: fmt::Debug + Send + Sync {
    /// Short family name, e.g. "normal"
    fn name(&self) -> &'static str;

    /// Draw a value
    fn sample(&self, rng: &mut dyn RngCore) -> ChoiceValue;

    /// Log-density (or log-mass) of `value`; `-inf` when the value is
    /// outside the support or of the wrong type
    fn log_prob(&self, value: &ChoiceValue) -> f64;

    /// Support of the distribution
    fn support(&self) -> Support;
}

/// Read a choice value as a real number
pub fn value_as_f64(value: &ChoiceValue) -> Option<f64> {
    match value {
        ChoiceValue::F64(v) => Some(*v),
        ChoiceValue::Usize(n) => Some(*n as f64),
        ChoiceValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}
