//! Choice recording
//!
//! This module provides the ordered trace that records every random choice
//! of one program execution.

pub mod trace;

pub mod prelude {
    pub use super::trace::*;
}
