//! Dream (sleep-phase) fantasy estimation
//!
//! Fantasy runs draw global latents from the guide, local latents and
//! observations from the model, and record the resulting synthetic
//! dataset alongside the choice trace.

pub mod config;
pub mod coroutine;
pub mod estimator;
pub mod record;

pub mod prelude {
    pub use super::config::*;
    pub use super::coroutine::*;
    pub use super::estimator::*;
    pub use super::record::*;
}
