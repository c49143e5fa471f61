//! Guide distributions
//!
//! Guides are the recognition-model distributions sampled in place of a
//! latent's prior outside the bulk-data construct.

pub mod auto;
pub mod resolver;

pub mod prelude {
    pub use super::auto::*;
    pub use super::resolver::*;
}
