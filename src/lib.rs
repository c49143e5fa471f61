//! # fugue-dream
//!
//! Wake-sleep "dream" fantasy sampling for amortized, guide-based
//! probabilistic inference.
//!
//! A fantasy run executes a generative program forward. Global latents are
//! drawn from their guide, latents inside the bulk-data construct are drawn
//! from the model, and observations are drawn from their distributions
//! rather than conditioned on. Each run yields a [`Record`](inference::dream::record::Record):
//! the ordered choice trace plus the fantasized dataset, which can be used
//! to train a recognition model.
//!
//! ## Core Concepts
//!
//! - **Coroutines as effect handlers**: the environment keeps exactly one
//!   active [`Coroutine`](runtime::coroutine::Coroutine) and routes every
//!   primitive to it
//! - **Scoped handler installation**: a fantasy run always hands the slot
//!   back to the caller's handler, on success and on failure
//! - **Ordered traces**: choices are kept in program order and can be
//!   exported to a `fugue::Trace`
//!
//! ## Quick Start
//!
//! ```no_run
//! use fugue::addr;
//! use fugue_dream::prelude::*;
//!
//! let data: Vec<Datum> = vec![1.2.into(), 0.7.into()];
//! let model = |env: &mut Env, _a: &Address| -> DreamResult<()> {
//!     let mu = env.sample(addr!("mu"), Normal::new(0.0, 1.0)?)?;
//!     let mu = value_as_f64(&mu).unwrap_or(0.0);
//!     env.map_data(&data, None, &addr!("data"), |env, _datum, a| {
//!         env.observe(a.clone(), Normal::new(mu, 1.0)?, None)?;
//!         Ok(())
//!     })
//! };
//!
//! let mut env = Env::seeded(42).with_guides(AutoGuide::new());
//! let estimator = DreamEstimator::new(DreamOptions::new().samples(10))?;
//! let records = estimator.fantasize(&mut env, &model, &Store::new(), &addr!("root"))?;
//! assert_eq!(records.len(), 10);
//! # Ok::<(), DreamError>(())
//! ```

pub mod distributions;
pub mod error;
pub mod guide;
pub mod inference;
pub mod params;
pub mod runtime;
pub mod trace;

pub use fugue::{Address, ChoiceValue};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::distributions::prelude::*;
    pub use crate::error::*;
    pub use crate::guide::prelude::*;
    pub use crate::inference::prelude::*;
    pub use crate::params::*;
    pub use crate::runtime::prelude::*;
    pub use crate::trace::prelude::*;
    pub use fugue::{Address, ChoiceValue};
}
