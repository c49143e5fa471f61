//! Program runtime
//!
//! This module provides the host side of effect handling: the environment
//! that owns the active-handler slot, the coroutine interface handlers
//! implement, program stores and data elements.

pub mod coroutine;
pub mod datum;
pub mod env;
pub mod program;
pub mod store;

pub mod prelude {
    pub use super::coroutine::*;
    pub use super::datum::*;
    pub use super::env::*;
    pub use super::program::*;
    pub use super::store::*;
}
