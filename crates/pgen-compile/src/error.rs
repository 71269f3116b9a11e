//! Crate-boundary error type for `pgen-compile`.
//!
//! Grounded on `plotnik-lib::compile::error::CompileError` (plain enum,
//! `thiserror`-derived `Display`). These are the fatal half of the error
//! taxonomy — cases where the meta-grammar itself is malformed and no
//! `GrammarTables` can be produced at all; structural problems in an
//! otherwise well-formed grammar go to [`pgen_core::Diagnostics`] instead.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("line {line}: expected {expected}, found {found:?}")]
    UnexpectedToken { line: u32, expected: String, found: String },
    #[error("line {line}: unterminated rule (missing newline)")]
    UnterminatedRule { line: u32 },
    #[error("grammar defines no rules")]
    EmptyGrammar,
    #[error("rule '{0}' is defined more than once")]
    DuplicateRule(String),
    #[error("rule '{0}' is referenced but never defined")]
    UndefinedRule(String),
    #[error("string literal '{0}' is neither a single punctuation character nor an alphabetic keyword")]
    UnknownLiteral(String),
}
