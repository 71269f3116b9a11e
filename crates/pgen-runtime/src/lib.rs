//! PARSER: the bounded pushdown automaton that drives a generated
//! [`pgen_core::Grammar`] over a token stream, producing a concrete
//! [`pgen_core::ParseNode`] tree.

pub mod engine;
pub mod error;

pub use engine::{parse, Parser, RuntimeToken, StepOutcome, MAX_STACK};
pub use error::ParseError;
