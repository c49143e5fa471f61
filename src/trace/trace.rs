//! Ordered choice log
//!
//! Unlike `fugue::Trace`, which is keyed by address, this trace keeps the
//! choices of one execution in the order the program made them. Program
//! order is what the fantasy estimator relies on when it pairs latent
//! choices with the observations that follow them.

use std::sync::Arc;

use fugue::{Address, ChoiceValue};

use crate::distributions::traits::Distribution;
use crate::runtime::coroutine::SampleOptions;
use crate::runtime::store::Store;

/// Which primitive produced a choice
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChoiceKind {
    /// A latent random choice (`sample`)
    Latent,
    /// A fantasized observation (`observe`)
    Observation,
}

/// One recorded random choice
#[derive(Clone, Debug)]
pub struct Choice {
    /// Address of the choice
    pub address: Address,
    /// Value that was drawn
    pub value: ChoiceValue,
    /// Distribution the program supplied at this choice
    pub distribution: Arc<dyn Distribution>,
    /// Snapshot of the store when the choice was made
    pub store: Store,
    /// Options passed with the primitive, if any
    pub options: Option<SampleOptions>,
    /// Primitive that produced the choice
    pub kind: ChoiceKind,
    /// Log-density of `value` under `distribution`
    pub log_prob: f64,
}

/// Append-only, ordered log of the random choices of one execution
#[derive(Clone, Debug, Default)]
pub struct Trace {
    choices: Vec<Choice>,
}

impl Trace {
    /// Create an empty trace
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a choice
    pub fn add_choice(
        &mut self,
        distribution: Arc<dyn Distribution>,
        value: ChoiceValue,
        address: Address,
        store: Store,
        kind: ChoiceKind,
        options: Option<SampleOptions>,
    ) {
        let log_prob = distribution.log_prob(&value);
        self.choices.push(Choice {
            address,
            value,
            distribution,
            store,
            options,
            kind,
            log_prob,
        });
    }

    /// All choices in program order
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    /// Iterate choices in program order
    pub fn iter(&self) -> std::slice::Iter<'_, Choice> {
        self.choices.iter()
    }

    /// Number of recorded choices
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// Most recent choice recorded at `address`
    pub fn get(&self, address: &Address) -> Option<&Choice> {
        self.choices.iter().rev().find(|c| &c.address == address)
    }

    /// Latent choices in program order
    pub fn latents(&self) -> impl Iterator<Item = &Choice> {
        self.choices.iter().filter(|c| c.kind == ChoiceKind::Latent)
    }

    /// Fantasized observations in program order
    pub fn observations(&self) -> impl Iterator<Item = &Choice> {
        self.choices
            .iter()
            .filter(|c| c.kind == ChoiceKind::Observation)
    }

    /// Sum of the log-densities of every recorded choice
    pub fn log_prob(&self) -> f64 {
        self.choices.iter().map(|c| c.log_prob).sum()
    }

    /// Export as an address-keyed Fugue trace
    ///
    /// Later choices at a repeated address overwrite earlier ones.
    pub fn to_fugue_trace(&self) -> fugue::Trace {
        let mut trace = fugue::Trace::default();
        for choice in &self.choices {
            trace.insert_choice(choice.address.clone(), choice.value.clone(), choice.log_prob);
        }
        trace
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a Choice;
    type IntoIter = std::slice::Iter<'a, Choice>;

    fn into_iter(self) -> Self::IntoIter {
        self.choices.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::builtin::{Bernoulli, Normal};
    use approx::assert_relative_eq;
    use fugue::addr;

    fn sample_trace() -> Trace {
        let mut trace = Trace::new();
        trace.add_choice(
            Arc::new(Normal::standard()),
            ChoiceValue::F64(0.0),
            addr!("mu"),
            Store::new(),
            ChoiceKind::Latent,
            Some(SampleOptions::default()),
        );
        trace.add_choice(
            Arc::new(Bernoulli::new(0.5).unwrap()),
            ChoiceValue::Bool(true),
            addr!("obs", 0),
            Store::new(),
            ChoiceKind::Observation,
            None,
        );
        trace
    }

    #[test]
    fn test_choices_keep_program_order() {
        let trace = sample_trace();
        assert_eq!(trace.len(), 2);
        assert_eq!(trace.choices()[0].address, addr!("mu"));
        assert_eq!(trace.choices()[1].address, addr!("obs", 0));
        assert_eq!(trace.latents().count(), 1);
        assert_eq!(trace.observations().count(), 1);
    }

    #[test]
    fn test_log_prob_is_recorded() {
        let trace = sample_trace();
        let expected = Normal::standard().log_prob(&ChoiceValue::F64(0.0)) + 0.5f64.ln();
        assert_relative_eq!(trace.log_prob(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_to_fugue_trace() {
        let trace = sample_trace();
        let exported = trace.to_fugue_trace();
        assert_eq!(exported.choices.len(), 2);
        let mu = exported.choices.get(&addr!("mu")).unwrap();
        assert!(matches!(mu.value, ChoiceValue::F64(v) if v == 0.0));
    }

    #[test]
    fn test_get_returns_latest() {
        let mut trace = sample_trace();
        trace.add_choice(
            Arc::new(Normal::standard()),
            ChoiceValue::F64(1.0),
            addr!("mu"),
            Store::new(),
            ChoiceKind::Latent,
            None,
        );
        let latest = trace.get(&addr!("mu")).unwrap();
        assert!(matches!(latest.value, ChoiceValue::F64(v) if v == 1.0));
        assert!(trace.get(&addr!("missing")).is_none());
    }
}
