//! Host environment
//!
//! `Env` stands in for the host interpreter. It owns the active-handler
//! slot together with the store, random source and guide resolver, routes
//! every primitive to the active coroutine, and drives the bulk-data
//! iteration protocol.
//!
//! Installing a coroutine is scoped: the previous handler and store are
//! put back when the scope ends, whether the program finished, returned an
//! error, or unwound.

use std::any::type_name;
use std::sync::Arc;

use fugue::{Address, ChoiceValue};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::distributions::traits::Distribution;
use crate::error::{DreamError, DreamResult};
use crate::guide::resolver::{ExplicitGuides, GuideResolver};
use crate::runtime::coroutine::{Context, Coroutine, DataSelection, ForwardSampler, SampleOptions};
use crate::runtime::datum::Datum;
use crate::runtime::store::Store;

/// Execution environment of generative programs
pub struct Env {
    coroutine: Box<dyn Coroutine>,
    store: Store,
    rng: StdRng,
    guides: Box<dyn GuideResolver>,
}

impl Env {
    /// Create an environment with a forward sampler as the active handler
    /// and explicit guides only
    pub fn new(rng: StdRng) -> Self {
        Self {
            coroutine: Box::new(ForwardSampler::new()),
            store: Store::new(),
            rng,
            guides: Box::new(ExplicitGuides::new()),
        }
    }

    /// Create an environment with a seeded random source
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Replace the guide resolver
    pub fn with_guides<G: GuideResolver + 'static>(mut self, guides: G) -> Self {
        self.guides = Box::new(guides);
        self
    }

    /// Replace the top-level store
    pub fn with_store(mut self, store: Store) -> Self {
        self.store = store;
        self
    }

    /// Name of the coroutine currently in the active-handler slot
    pub fn active_coroutine(&self) -> &'static str {
        self.coroutine.name()
    }

    /// Store of the running program
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Mutable store of the running program
    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    /// Guide resolver
    pub fn guides(&self) -> &dyn GuideResolver {
        self.guides.as_ref()
    }

    fn split(&mut self) -> (&mut Box<dyn Coroutine>, Context<'_>) {
        (
            &mut self.coroutine,
            Context {
                rng: &mut self.rng,
                store: &self.store,
                guides: self.guides.as_mut(),
            },
        )
    }

    /// Draw a latent choice with default options
    pub fn sample<D: Distribution + 'static>(
        &mut self,
        address: Address,
        dist: D,
    ) -> DreamResult<ChoiceValue> {
        self.sample_with(address, Arc::new(dist), SampleOptions::default())
    }

    /// Draw a latent choice
    pub fn sample_with(
        &mut self,
        address: Address,
        dist: Arc<dyn Distribution>,
        options: SampleOptions,
    ) -> DreamResult<ChoiceValue> {
        let (coroutine, mut ctx) = self.split();
        coroutine.sample(&mut ctx, dist, &address, &options)
    }

    /// Observe `value` (or nothing) under `dist`
    pub fn observe<D: Distribution + 'static>(
        &mut self,
        address: Address,
        dist: D,
        value: Option<ChoiceValue>,
    ) -> DreamResult<ChoiceValue> {
        let (coroutine, mut ctx) = self.split();
        coroutine.observe(&mut ctx, Arc::new(dist), &address, value)
    }

    /// Add `score` to the log-weight of the execution
    pub fn factor(&mut self, address: Address, score: f64) -> DreamResult<()> {
        let (coroutine, mut ctx) = self.split();
        coroutine.factor(&mut ctx, &address, score)
    }

    /// Bulk-data construct: run `body` once per selected datum
    ///
    /// The active coroutine is told when the construct starts
    /// (`map_data_fetch`), around every datum (`map_data_enter` /
    /// `map_data_leave`) and when it ends (`map_data_final`). Each datum
    /// gets the child address `"{address}/{index}"`.
    pub fn map_data<F>(
        &mut self,
        data: &[Datum],
        batch_size: Option<usize>,
        address: &Address,
        mut body: F,
    ) -> DreamResult<()>
    where
        F: FnMut(&mut Env, &Datum, &Address) -> DreamResult<()>,
    {
        let selection = {
            let (coroutine, mut ctx) = self.split();
            coroutine.map_data_fetch(&mut ctx, data, batch_size, address)?
        };
        let indices: Vec<usize> = match selection {
            DataSelection::All => (0..data.len()).collect(),
            DataSelection::Indices(indices) => indices,
        };

        let visited = self.visit_elements(data, indices, address, &mut body);
        // the construct is closed even when an element failed
        self.coroutine.map_data_final(address);
        visited
    }

    fn visit_elements<F>(
        &mut self,
        data: &[Datum],
        indices: Vec<usize>,
        address: &Address,
        body: &mut F,
    ) -> DreamResult<()>
    where
        F: FnMut(&mut Env, &Datum, &Address) -> DreamResult<()>,
    {
        for index in indices {
            let datum = data.get(index).ok_or_else(|| {
                DreamError::Program(format!(
                    "data index {index} out of range for {} elements",
                    data.len()
                ))
            })?;
            let child = Address(format!("{}/{}", address.0, index));
            self.coroutine.map_data_enter();
            body(self, datum, &child)?;
            self.coroutine.map_data_leave()?;
        }
        Ok(())
    }

    /// Run `body` with `coroutine` installed and `store` as the program store
    ///
    /// The previous handler and store are restored on every exit path.
    /// On success the coroutine is handed back.
    pub fn run_with<C, F>(&mut self, coroutine: C, store: Store, body: F) -> DreamResult<C>
    where
        C: Coroutine,
        F: FnOnce(&mut Env) -> DreamResult<()>,
    {
        let mut scope = HandlerScope::enter(self, Box::new(coroutine), store);
        let result = body(scope.env());
        let installed = scope.release();
        result?;

        let installed = installed.ok_or(DreamError::HandlerMismatch {
            expected: type_name::<C>(),
            actual: "nothing",
        })?;
        let actual = installed.name();
        installed
            .into_any()
            .downcast::<C>()
            .map(|c| *c)
            .map_err(|_| DreamError::HandlerMismatch {
                expected: type_name::<C>(),
                actual,
            })
    }
}

/// Saves the active handler on entry and puts it back when released or
/// dropped
struct HandlerScope<'e> {
    env: &'e mut Env,
    saved: Option<(Box<dyn Coroutine>, Store)>,
}

impl<'e> HandlerScope<'e> {
    fn enter(env: &'e mut Env, coroutine: Box<dyn Coroutine>, store: Store) -> Self {
        let previous = std::mem::replace(&mut env.coroutine, coroutine);
        let previous_store = std::mem::replace(&mut env.store, store);
        debug!(
            installed = env.coroutine.name(),
            saved = previous.name(),
            "installed coroutine"
        );
        Self {
            env,
            saved: Some((previous, previous_store)),
        }
    }

    fn env(&mut self) -> &mut Env {
        &mut *self.env
    }

    /// Restore the saved handler; returns the coroutine that was installed
    fn release(&mut self) -> Option<Box<dyn Coroutine>> {
        let (previous, previous_store) = self.saved.take()?;
        self.env.store = previous_store;
        let installed = std::mem::replace(&mut self.env.coroutine, previous);
        debug!(
            released = installed.name(),
            restored = self.env.coroutine.name(),
            "restored coroutine"
        );
        Some(installed)
    }
}

impl Drop for HandlerScope<'_> {
    fn drop(&mut self) {
        self.release();
    }
}
