//! Guide resolution
//!
//! A guide resolver maps a latent choice (its prior, options and address)
//! to the guide distribution that should be sampled in its place.

use std::collections::HashMap;
use std::sync::Arc;

use fugue::Address;

use crate::distributions::traits::Distribution;
use crate::error::DreamResult;
use crate::params::Params;
use crate::runtime::coroutine::SampleOptions;
use crate::runtime::store::Store;

/// Supplies guide distributions for latent choices
pub trait GuideResolver {
    /// Guide for the choice at `address`, or `None` when there is none
    fn resolve(
        &mut self,
        dist: &dyn Distribution,
        options: &SampleOptions,
        store: &Store,
        address: &Address,
    ) -> DreamResult<Option<Arc<dyn Distribution>>>;

    /// Parameters backing the guides, if the resolver has any
    fn params(&self) -> Option<&Params> {
        None
    }
}

/// Resolver that only knows explicitly given guides
///
/// The guide attached to the `sample` call wins; otherwise a guide
/// registered for the address is used.
#[derive(Clone, Debug, Default)]
pub struct ExplicitGuides {
    registered: HashMap<Address, Arc<dyn Distribution>>,
}

impl ExplicitGuides {
    /// Create a resolver with no registered guides
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the guide for `address`
    pub fn register<D: Distribution + 'static>(mut self, address: Address, guide: D) -> Self {
        self.registered.insert(address, Arc::new(guide));
        self
    }

    /// Number of registered guides
    pub fn len(&self) -> usize {
        self.registered.len()
    }

    /// Whether no guide is registered
    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    pub(crate) fn lookup(
        &self,
        options: &SampleOptions,
        address: &Address,
    ) -> Option<Arc<dyn Distribution>> {
        options
            .guide
            .clone()
            .or_else(|| self.registered.get(address).cloned())
    }
}

impl GuideResolver for ExplicitGuides {
    fn resolve(
        &mut self,
        _dist: &dyn Distribution,
        options: &SampleOptions,
        _store: &Store,
        address: &Address,
    ) -> DreamResult<Option<Arc<dyn Distribution>>> {
        Ok(self.lookup(options, address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::builtin::{Delta, Normal};
    use fugue::{addr, ChoiceValue};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn draw(guide: &Arc<dyn Distribution>) -> f64 {
        let mut rng = StdRng::seed_from_u64(0);
        match guide.sample(&mut rng) {
            ChoiceValue::F64(v) => v,
            other => panic!("unexpected value {:?}", other),
        }
    }

    #[test]
    fn test_no_guide_resolves_to_none() {
        let mut guides = ExplicitGuides::new();
        let resolved = guides
            .resolve(&Normal::standard(), &SampleOptions::new(), &Store::new(), &addr!("z"))
            .unwrap();
        assert!(resolved.is_none());
    }

    #[test]
    fn test_registered_guide() {
        let mut guides = ExplicitGuides::new().register(addr!("z"), Delta::new(1.0));
        let resolved = guides
            .resolve(&Normal::standard(), &SampleOptions::new(), &Store::new(), &addr!("z"))
            .unwrap()
            .unwrap();
        assert_eq!(draw(&resolved), 1.0);
    }

    #[test]
    fn test_option_guide_takes_precedence() {
        let mut guides = ExplicitGuides::new().register(addr!("z"), Delta::new(1.0));
        let options = SampleOptions::new().guide(Delta::new(5.0));
        let resolved = guides
            .resolve(&Normal::standard(), &options, &Store::new(), &addr!("z"))
            .unwrap()
            .unwrap();
        assert_eq!(draw(&resolved), 5.0);
    }
}
