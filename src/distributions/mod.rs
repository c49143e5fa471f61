//! Distributions
//!
//! A small set of distribution families used by models, guides and the
//! fantasy coroutine. All of them sample and score Fugue `ChoiceValue`s.

pub mod builtin;
pub mod traits;

pub mod prelude {
    pub use super::builtin::*;
    pub use super::traits::*;
}
