//! Fantasy coroutine
//!
//! Runs a generative program forward once to hallucinate a dataset.
//! Latents outside the bulk-data construct are drawn from their guide,
//! latents inside it from the model, and every `observe` draws a fresh
//! value from its distribution instead of conditioning on the data.
//!
//! The model must satisfy these structural assumptions:
//!
//! 1. It contains exactly one bulk-data construct (`map_data`), and it is
//!    not nested.
//! 2. Either every data element is observed exactly once in its
//!    callback, or every data element is itself an array whose elements
//!    are observed in order. The shape of the first element decides which
//!    scheme applies to the whole collection.
//!
//! For example, with `data = [x, y]` the callback observes one value per
//! datum; with `data = [[x1, y1], [x2, y2]]` it observes `arr[0]` and then
//! `arr[1]`.
//!
//! `factor` statements are accepted and ignored.

use std::any::Any;
use std::sync::Arc;

use fugue::{Address, ChoiceValue};
use tracing::trace;

use crate::distributions::traits::Distribution;
use crate::error::{DreamError, DreamResult};
use crate::inference::dream::record::Record;
use crate::runtime::coroutine::{Context, Coroutine, DataSelection, SampleOptions};
use crate::runtime::datum::Datum;
use crate::runtime::env::Env;
use crate::runtime::program::Program;
use crate::runtime::store::Store;
use crate::trace::trace::ChoiceKind;

/// Effect handler for a single fantasy run
#[derive(Debug, Default)]
pub struct FantasyCoroutine {
    record: Record,
    inside_map_data: bool,
    obs_arr: bool,
    obs: Vec<ChoiceValue>,
}

impl FantasyCoroutine {
    /// Create a coroutine with an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `program` once and return what it fantasized
    ///
    /// The coroutine is the active handler for the duration of the run;
    /// the caller's handler is back in place when this returns, also on
    /// error.
    pub fn run(
        self,
        env: &mut Env,
        program: &dyn Program,
        store: &Store,
        address: &Address,
    ) -> DreamResult<Record> {
        let finished = env.run_with(self, store.clone(), |env| program.run(env, address))?;
        Ok(finished.record)
    }

    /// Record collected so far
    pub fn record(&self) -> &Record {
        &self.record
    }
}

impl Coroutine for FantasyCoroutine {
    fn name(&self) -> &'static str {
        "dream"
    }

    fn sample(
        &mut self,
        ctx: &mut Context<'_>,
        dist: Arc<dyn Distribution>,
        address: &Address,
        options: &SampleOptions,
    ) -> DreamResult<ChoiceValue> {
        let value = if self.inside_map_data {
            // local latents come from the model
            dist.sample(&mut *ctx.rng)
        } else {
            let guide = ctx
                .guides
                .resolve(dist.as_ref(), options, ctx.store, address)?
                .ok_or_else(|| DreamError::MissingGuide {
                    address: address.0.clone(),
                })?;
            guide.sample(&mut *ctx.rng)
        };

        trace!(
            address = address.0.as_str(),
            local = self.inside_map_data,
            value = ?value,
            "fantasy sample"
        );
        self.record.trace.add_choice(
            dist,
            value.clone(),
            address.clone(),
            ctx.store.clone(),
            ChoiceKind::Latent,
            Some(options.clone()),
        );
        Ok(value)
    }

    fn observe(
        &mut self,
        ctx: &mut Context<'_>,
        dist: Arc<dyn Distribution>,
        address: &Address,
        _value: Option<ChoiceValue>,
    ) -> DreamResult<ChoiceValue> {
        if !self.inside_map_data {
            return Err(DreamError::ObserveOutsideMapData {
                address: address.0.clone(),
            });
        }
        if !self.obs_arr && !self.obs.is_empty() {
            return Err(DreamError::MultipleObservations {
                address: address.0.clone(),
            });
        }

        let value = dist.sample(&mut *ctx.rng);
        trace!(address = address.0.as_str(), value = ?value, "fantasy observation");
        self.record.trace.add_choice(
            dist,
            value.clone(),
            address.clone(),
            ctx.store.clone(),
            ChoiceKind::Observation,
            None,
        );
        self.obs.push(value.clone());
        Ok(value)
    }

    fn factor(&mut self, _ctx: &mut Context<'_>, _address: &Address, _score: f64) -> DreamResult<()> {
        Ok(())
    }

    fn map_data_fetch(
        &mut self,
        _ctx: &mut Context<'_>,
        data: &[Datum],
        _batch_size: Option<usize>,
        address: &Address,
    ) -> DreamResult<DataSelection> {
        if self.inside_map_data {
            return Err(DreamError::NestedMapData {
                address: address.0.clone(),
            });
        }
        self.inside_map_data = true;
        self.obs_arr = data.first().map(Datum::is_array).unwrap_or(false);

        // sub-sampling is not supported: always fantasize the whole dataset
        Ok(DataSelection::All)
    }

    fn map_data_enter(&mut self) {
        self.obs.clear();
    }

    fn map_data_leave(&mut self) -> DreamResult<()> {
        let observations = std::mem::take(&mut self.obs);
        let datum = if self.obs_arr {
            Datum::Multiple(observations)
        } else {
            let value = observations
                .into_iter()
                .next()
                .ok_or(DreamError::MissingObservation {
                    index: self.record.data.len(),
                })?;
            Datum::Single(value)
        };
        self.record.data.push(datum);
        Ok(())
    }

    fn map_data_final(&mut self, _address: &Address) {
        self.inside_map_data = false;
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::builtin::{Delta, Normal};
    use crate::guide::resolver::ExplicitGuides;
    use fugue::addr;

    fn observe_each(env: &mut Env, data: &[Datum]) -> DreamResult<()> {
        env.map_data(data, None, &addr!("data"), |env, _datum, address| {
            env.observe(address.clone(), Normal::new(0.0, 1.0)?, None)?;
            Ok(())
        })
    }

    #[test]
    fn test_observe_outside_map_data_fails() {
        let mut env = Env::seeded(0);
        let program = |env: &mut Env, _address: &Address| -> DreamResult<()> {
            env.observe(addr!("y"), Normal::standard(), None)?;
            Ok(())
        };
        let err = FantasyCoroutine::new()
            .run(&mut env, &program, &Store::new(), &addr!("root"))
            .unwrap_err();
        assert!(matches!(err, DreamError::ObserveOutsideMapData { .. }));
        assert_eq!(env.active_coroutine(), "forward");
    }

    #[test]
    fn test_global_latent_without_guide_fails() {
        let mut env = Env::seeded(0);
        let program = |env: &mut Env, _address: &Address| -> DreamResult<()> {
            env.sample(addr!("mu"), Normal::standard())?;
            Ok(())
        };
        let err = FantasyCoroutine::new()
            .run(&mut env, &program, &Store::new(), &addr!("root"))
            .unwrap_err();
        assert_eq!(
            err,
            DreamError::MissingGuide {
                address: "mu".to_string()
            }
        );
        assert!(err.to_string().contains("mu"));
    }

    #[test]
    fn test_global_latent_uses_guide_local_latent_uses_model() {
        let guides = ExplicitGuides::new().register(addr!("global"), Delta::new(7.0));
        let mut env = Env::seeded(0).with_guides(guides);
        let data: Vec<Datum> = vec![Datum::from(0.0)];
        let program = |env: &mut Env, _address: &Address| -> DreamResult<()> {
            env.sample(addr!("global"), Delta::new(-1.0))?;
            env.map_data(&data, None, &addr!("data"), |env, _datum, address| {
                env.sample(Address(format!("{}/local", address.0)), Delta::new(3.0))?;
                env.observe(address.clone(), Normal::standard(), None)?;
                Ok(())
            })
        };
        let record = FantasyCoroutine::new()
            .run(&mut env, &program, &Store::new(), &addr!("root"))
            .unwrap();

        let values: Vec<&ChoiceValue> = record.trace.iter().map(|c| &c.value).collect();
        assert!(matches!(values[0], ChoiceValue::F64(v) if *v == 7.0));
        assert!(matches!(values[1], ChoiceValue::F64(v) if *v == 3.0));
        assert_eq!(record.trace.choices()[2].kind, ChoiceKind::Observation);
    }

    #[test]
    fn test_multiple_observations_for_single_datum_fail() {
        let mut env = Env::seeded(0);
        let data = vec![Datum::from(1.0), Datum::from(2.0)];
        let program = |env: &mut Env, _address: &Address| -> DreamResult<()> {
            env.map_data(&data, None, &addr!("data"), |env, _datum, address| {
                env.observe(address.clone(), Normal::standard(), None)?;
                env.observe(address.clone(), Normal::standard(), None)?;
                Ok(())
            })
        };
        let err = FantasyCoroutine::new()
            .run(&mut env, &program, &Store::new(), &addr!("root"))
            .unwrap_err();
        assert!(matches!(err, DreamError::MultipleObservations { .. }));
    }

    #[test]
    fn test_unobserved_single_datum_fails() {
        let mut env = Env::seeded(0);
        let data = vec![Datum::from(1.0)];
        let program = |env: &mut Env, _address: &Address| -> DreamResult<()> {
            env.map_data(&data, None, &addr!("data"), |_env, _datum, _address| Ok(()))
        };
        let err = FantasyCoroutine::new()
            .run(&mut env, &program, &Store::new(), &addr!("root"))
            .unwrap_err();
        assert_eq!(err, DreamError::MissingObservation { index: 0 });
    }

    #[test]
    fn test_handled_map_data_failure_allows_next_construct() {
        let mut env = Env::seeded(0);
        let data = vec![Datum::from(1.0), Datum::from(2.0)];
        let program = |env: &mut Env, _address: &Address| -> DreamResult<()> {
            let first = env.map_data(&data, None, &addr!("a"), |_env, _datum, _address| {
                Err(DreamError::Program("x".to_string()))
            });
            assert_eq!(first, Err(DreamError::Program("x".to_string())));
            env.map_data(&data, None, &addr!("b"), |env, _datum, address| {
                env.observe(address.clone(), Normal::standard(), None)?;
                Ok(())
            })
        };
        let record = FantasyCoroutine::new()
            .run(&mut env, &program, &Store::new(), &addr!("root"))
            .unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record.trace.choices()[0].address.0, "b/0");
    }

    #[test]
    fn test_empty_data_yields_empty_record() {
        let mut env = Env::seeded(0);
        let data: Vec<Datum> = Vec::new();
        let program = |env: &mut Env, _address: &Address| -> DreamResult<()> {
            observe_each(env, &data)
        };
        let record = FantasyCoroutine::new()
            .run(&mut env, &program, &Store::new(), &addr!("root"))
            .unwrap();
        assert!(record.is_empty());
        assert!(record.trace.is_empty());
    }

    #[test]
    fn test_batch_size_is_ignored() {
        let mut env = Env::seeded(0);
        let data: Vec<Datum> = (0..6).map(|i| Datum::from(i as f64)).collect();
        let program = |env: &mut Env, _address: &Address| -> DreamResult<()> {
            env.map_data(&data, Some(2), &addr!("data"), |env, _datum, address| {
                env.observe(address.clone(), Normal::standard(), None)?;
                Ok(())
            })
        };
        let record = FantasyCoroutine::new()
            .run(&mut env, &program, &Store::new(), &addr!("root"))
            .unwrap();
        assert_eq!(record.len(), 6);
    }

    #[test]
    fn test_factor_is_ignored() {
        let mut env = Env::seeded(0);
        let data = vec![Datum::from(0.5)];
        let program = |env: &mut Env, _address: &Address| -> DreamResult<()> {
            env.factor(addr!("penalty"), -100.0)?;
            observe_each(env, &data)
        };
        let record = FantasyCoroutine::new()
            .run(&mut env, &program, &Store::new(), &addr!("root"))
            .unwrap();
        assert_eq!(record.len(), 1);
        assert_eq!(record.trace.len(), 1);
    }

    #[test]
    fn test_choices_snapshot_the_store() {
        let mut env = Env::seeded(0);
        let data = vec![Datum::from(0.0), Datum::from(1.0)];
        let program = |env: &mut Env, _address: &Address| -> DreamResult<()> {
            env.map_data(&data, None, &addr!("data"), |env, _datum, address| {
                let seen = env.store().len();
                env.store_mut()
                    .set(format!("seen{seen}"), ChoiceValue::Usize(seen));
                env.observe(address.clone(), Normal::standard(), None)?;
                Ok(())
            })
        };
        let record = FantasyCoroutine::new()
            .run(&mut env, &program, &Store::new(), &addr!("root"))
            .unwrap();
        assert_eq!(record.trace.choices()[0].store.len(), 1);
        assert_eq!(record.trace.choices()[1].store.len(), 2);
        // the caller's store is untouched
        assert!(env.store().is_empty());
    }
}
