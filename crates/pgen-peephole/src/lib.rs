//! A standalone peephole optimizer for the wordcode format defined here,
//! line-for-line grounded on CPython's `Python/peephole.c` (`PyCode_Optimize`).

pub mod blocks;
pub mod consts;
pub mod error;
pub mod optimize;
pub mod wordcode;

pub use consts::Const;
pub use error::OptimizeError;
pub use optimize::{optimize, Bytecode, LineEntry, MAX_UNITS};
