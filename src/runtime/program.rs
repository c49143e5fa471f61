//! Generative programs

use fugue::Address;

use crate::error::DreamResult;
use crate::runtime::env::Env;

/// A generative program run by the host environment
///
/// The program performs its probabilistic primitives through `env`; each
/// primitive returns once the active coroutine has resolved it. The store
/// is reachable through `env.store()` and `env.store_mut()`.
pub trait Program {
    /// Execute the program at base address `address`
    fn run(&self, env: &mut Env, address: &Address) -> DreamResult<()>;
}

impl<F> Program for F
where
    F: Fn(&mut Env, &Address) -> DreamResult<()>,
{
    fn run(&self, env: &mut Env, address: &Address) -> DreamResult<()> {
        self(env, address)
    }
}
