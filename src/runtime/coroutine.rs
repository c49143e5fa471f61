//! Effect handler interface
//!
//! A coroutine intercepts the probabilistic primitives of a running
//! program. The host environment keeps exactly one coroutine active and
//! routes every `sample`, `observe` and `factor`, plus the bulk-data
//! iteration protocol, to it.

use std::any::Any;
use std::sync::Arc;

use fugue::{Address, ChoiceValue};
use rand::seq::index;
use rand::RngCore;

use crate::distributions::traits::Distribution;
use crate::error::DreamResult;
use crate::guide::resolver::GuideResolver;
use crate::runtime::datum::Datum;
use crate::runtime::store::Store;

/// Options attached to a `sample` call
#[derive(Clone, Debug, Default)]
pub struct SampleOptions {
    /// Explicit guide distribution for this choice
    pub guide: Option<Arc<dyn Distribution>>,
    /// Do not fall back to an automatically constructed guide
    pub no_auto_guide: bool,
}

impl SampleOptions {
    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an explicit guide
    pub fn guide<D: Distribution + 'static>(mut self, guide: D) -> Self {
        self.guide = Some(Arc::new(guide));
        self
    }

    /// Disable the automatic guide fallback
    pub fn no_auto_guide(mut self) -> Self {
        self.no_auto_guide = true;
        self
    }
}

/// Which elements of a data collection the host should iterate
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataSelection {
    /// Iterate the whole collection in order
    All,
    /// Iterate only these indices, in this order
    Indices(Vec<usize>),
}

/// Host resources lent to a coroutine for the duration of one primitive
pub struct Context<'a> {
    /// Random source of the host
    pub rng: &'a mut dyn RngCore,
    /// Store of the running program
    pub store: &'a Store,
    /// Guide resolution for latent choices
    pub guides: &'a mut dyn GuideResolver,
}

/// Capability interface of an effect handler
pub trait Coroutine: Any {
    /// Short name used in diagnostics
    fn name(&self) -> &'static str;

    /// Resolve a latent random choice
    fn sample(
        &mut self,
        ctx: &mut Context<'_>,
        dist: Arc<dyn Distribution>,
        address: &Address,
        options: &SampleOptions,
    ) -> DreamResult<ChoiceValue>;

    /// Resolve an observation; `value` is the observed datum, if any
    fn observe(
        &mut self,
        ctx: &mut Context<'_>,
        dist: Arc<dyn Distribution>,
        address: &Address,
        value: Option<ChoiceValue>,
    ) -> DreamResult<ChoiceValue>;

    /// Add `score` to the log-weight of the execution
    fn factor(&mut self, ctx: &mut Context<'_>, address: &Address, score: f64) -> DreamResult<()>;

    /// Entry of a bulk-data construct; decides which data to visit
    fn map_data_fetch(
        &mut self,
        ctx: &mut Context<'_>,
        data: &[Datum],
        batch_size: Option<usize>,
        address: &Address,
    ) -> DreamResult<DataSelection>;

    /// Called before each visited datum
    fn map_data_enter(&mut self) {}

    /// Called after each visited datum
    fn map_data_leave(&mut self) -> DreamResult<()> {
        Ok(())
    }

    /// Exit of a bulk-data construct
    fn map_data_final(&mut self, _address: &Address) {}

    /// Recover the concrete handler once it leaves the active slot
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// Top-level handler: runs a program forward from its prior
///
/// Observations return the observed value when one is given and are drawn
/// otherwise. `factor` is ignored. Bulk-data honours `batch_size` by
/// visiting a uniformly drawn subset of the data.
#[derive(Clone, Debug, Default)]
pub struct ForwardSampler;

impl ForwardSampler {
    /// Create a forward sampler
    pub fn new() -> Self {
        Self
    }
}

impl Coroutine for ForwardSampler {
    fn name(&self) -> &'static str {
        "forward"
    }

    fn sample(
        &mut self,
        ctx: &mut Context<'_>,
        dist: Arc<dyn Distribution>,
        _address: &Address,
        _options: &SampleOptions,
    ) -> DreamResult<ChoiceValue> {
        Ok(dist.sample(&mut *ctx.rng))
    }

    fn observe(
        &mut self,
        ctx: &mut Context<'_>,
        dist: Arc<dyn Distribution>,
        _address: &Address,
        value: Option<ChoiceValue>,
    ) -> DreamResult<ChoiceValue> {
        Ok(value.unwrap_or_else(|| dist.sample(&mut *ctx.rng)))
    }

    fn factor(&mut self, _ctx: &mut Context<'_>, _address: &Address, _score: f64) -> DreamResult<()> {
        Ok(())
    }

    fn map_data_fetch(
        &mut self,
        ctx: &mut Context<'_>,
        data: &[Datum],
        batch_size: Option<usize>,
        _address: &Address,
    ) -> DreamResult<DataSelection> {
        match batch_size {
            Some(size) if size < data.len() => {
                let mut indices = index::sample(&mut *ctx.rng, data.len(), size).into_vec();
                indices.sort_unstable();
                Ok(DataSelection::Indices(indices))
            }
            _ => Ok(DataSelection::All),
        }
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}
