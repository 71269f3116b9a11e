//! Non-fatal grammar-structural warnings, collected rather than printed.
//!
//! The original reports these with bare `printf`/`fprintf(stderr, ...)` calls
//! scattered through `pgen.c`/`firstsets.c`/`acceler.c`. Mirrors
//! `plotnik-compiler::diagnostics`'s `Diagnostics`/`Severity` shape instead.

use std::fmt;

use crate::token::Kind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// `makedfa`: `"Error: nonterminal '%s' may produce empty.\n"`.
    MayProduceEmpty { rule: String },
    /// `calcfirstset`'s `dummy` sentinel: `under = None` for direct
    /// recursion, `Some(parent)` when discovered while resolving `parent`.
    LeftRecursion { rule: String, under: Option<String> },
    /// `acceler.c`: `"XXX ambiguity!\n"`. Last-write-wins is kept; this
    /// diagnostic only records that it happened.
    AcceleratorAmbiguity { state: u32, label: u32 },
    /// `acceler.c`: `"XXX too many states!\n"`.
    TooManyStates { rule: String },
    /// `acceler.c`: `"XXX too high nonterminal number!\n"`.
    NonterminalTooLarge { kind: Kind },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MayProduceEmpty { rule } => {
                write!(f, "nonterminal '{rule}' may produce empty")
            }
            Diagnostic::LeftRecursion { rule, under: None } => {
                write!(f, "left recursion in nonterminal '{rule}'")
            }
            Diagnostic::LeftRecursion { rule, under: Some(parent) } => {
                write!(f, "left recursion in nonterminal '{rule}' (discovered while resolving '{parent}')")
            }
            Diagnostic::AcceleratorAmbiguity { state, label } => {
                write!(f, "ambiguous accelerator entry for state {state}, label {label} (last write wins)")
            }
            Diagnostic::TooManyStates { rule } => {
                write!(f, "nonterminal '{rule}' has too many states for the accelerator encoding")
            }
            Diagnostic::NonterminalTooLarge { kind } => {
                write!(f, "nonterminal kind {kind} is too high for the accelerator encoding")
            }
        }
    }
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::MayProduceEmpty { .. } => Severity::Error,
            Diagnostic::LeftRecursion { .. } => Severity::Error,
            Diagnostic::AcceleratorAmbiguity { .. } => Severity::Warning,
            Diagnostic::TooManyStates { .. } => Severity::Warning,
            Diagnostic::NonterminalTooLarge { .. } => Severity::Warning,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn push(&mut self, diag: Diagnostic) {
        self.entries.push(diag);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity() == Severity::Error)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_errors_true_only_for_error_severity() {
        let mut d = Diagnostics::new();
        d.push(Diagnostic::AcceleratorAmbiguity { state: 0, label: 1 });
        assert!(!d.has_errors());
        d.push(Diagnostic::MayProduceEmpty { rule: "foo".to_string() });
        assert!(d.has_errors());
    }

    #[test]
    fn left_recursion_distinguishes_direct_from_nested() {
        let direct = Diagnostic::LeftRecursion { rule: "expr".to_string(), under: None };
        let nested = Diagnostic::LeftRecursion { rule: "expr".to_string(), under: Some("stmt".to_string()) };
        assert_ne!(direct, nested);
    }

    #[test]
    fn display_names_the_affected_rule() {
        let d = Diagnostic::MayProduceEmpty { rule: "start".to_string() };
        assert!(d.to_string().contains("start"));
    }
}
