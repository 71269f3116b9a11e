//! Data model shared by the grammar compiler (`pgen-compile`) and the
//! runtime parser (`pgen-runtime`): labels, DFAs, bitsets, and the packed
//! accelerator value, plus a table format for (de)serializing generated
//! grammars.

pub mod bitset;
pub mod diagnostics;
pub mod error;
pub mod grammar;
pub mod label;
pub mod tables;
pub mod token;
pub mod tree;

pub use bitset::BitSet;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::CoreError;
pub use grammar::{Accel, Arc, Dfa, Grammar, State, StateId};
pub use label::{Label, LabelId, LabelList};
pub use tables::GrammarTables;
pub use token::{Kind, NT_OFFSET};
pub use tree::ParseNode;
