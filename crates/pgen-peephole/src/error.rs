//! Crate-boundary error type for `pgen-peephole`.
//!
//! Almost every unsoundness condition the optimizer can hit is a bailout
//! that returns the input unchanged — this type exists only for
//! the one case that is not representable as "give back the input": the
//! folded-tuple constant would need an index past what `LOAD_CONST`'s
//! `u32` argument can encode. `fold_tuple_on_constants`'s `UINT_MAX` guard
//! is the original's analog.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptimizeError {
    #[error("constants table would exceed the maximum representable LOAD_CONST index")]
    ConstantsOverflow,
}
