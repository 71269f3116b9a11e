//! Crate-boundary error type for `pgen-core`.
//!
//! Grounded on `plotnik-lib::compile::error::CompileError` (plain enum,
//! `Display` derived rather than hand-rolled, `std::error::Error` via
//! `thiserror`'s blanket impl).

use thiserror::Error;

use crate::token::Kind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("label index {0} out of range")]
    LabelOutOfRange(u32),
    #[error("state index {0} out of range")]
    StateOutOfRange(u32),
    #[error("no dfa registered for nonterminal kind {0}")]
    UnknownNonterminal(Kind),
}
