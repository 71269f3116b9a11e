//! Crate-boundary error type for `pgen-runtime`.
//!
//! The direct analog of the original's `E_SYNTAX`/`E_NOMEM`/`E_DONE` result
//! codes from `Parser/parser.c`'s `addtoken`. Rust's allocator is infallible
//! in practice, which narrows where `OutOfMemory` could ever actually occur,
//! but the variant is kept so callers retain the original's control-flow
//! shape (see SPEC_FULL.md §7).

use thiserror::Error;

use pgen_core::token::Kind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: unexpected token (kind {kind}, text {text:?})")]
    Syntax { line: u32, kind: Kind, text: String },
    #[error("parser stack depth exceeded {0}")]
    StackOverflow(usize),
    #[error("out of memory")]
    OutOfMemory,
    #[error("grammar has no dfa for start symbol {0}")]
    MissingStartDfa(Kind),
}
