//! PGEN: compiles meta-grammar source into the table-driven [`Grammar`] that
//! `pgen-runtime`'s pushdown automaton consumes.
//!
//! Grounded directly on `Parser/pgen.c`'s top-level `pgen(node *n)`:
//! `metacompile` → (per rule) subset construction + minimization →
//! `translatelabels` → `addfirstsets` → `addaccelerators`.

pub mod accelerate;
pub mod dfa_build;
pub mod error;
pub mod first;
pub mod label_translate;
pub mod metalex;
pub mod metaparse;
pub mod minimize;
pub mod nfa;

pub use error::CompileError;

use pgen_core::{Diagnostics, Grammar};

/// Result of a successful compile: the generated tables plus any non-fatal
/// diagnostics raised along the way (may-produce-empty, left recursion,
/// accelerator ambiguity).
#[derive(Debug)]
pub struct CompileOutput {
    pub grammar: Grammar,
    pub diagnostics: Diagnostics,
}

/// `pgen`: the full PGEN pipeline over meta-grammar source text.
pub fn compile_grammar(source: &str) -> Result<CompileOutput, CompileError> {
    let tree = metaparse::parse(source)?;
    let nfa_grammar = nfa::metacompile(&tree);
    if nfa_grammar.nfas.is_empty() {
        return Err(CompileError::EmptyGrammar);
    }

    let mut diagnostics = Diagnostics::new();
    let mut grammar = Grammar::new(nfa_grammar.labels.clone(), nfa_grammar.start);

    let mut seen_names = std::collections::HashSet::new();
    for rule_nfa in &nfa_grammar.nfas {
        if !seen_names.insert(rule_nfa.name.clone()) {
            return Err(CompileError::DuplicateRule(rule_nfa.name.clone()));
        }
        let mut ssdfa = dfa_build::makedfa(rule_nfa, &mut diagnostics);
        minimize::simplify(&mut ssdfa);
        let dfa = minimize::convert(&ssdfa, rule_nfa.kind, rule_nfa.name.clone());
        grammar.add_dfa(dfa);
    }

    label_translate::translate_labels(&mut grammar, &nfa_grammar.nfas)?;
    first::add_first_sets(&mut grammar, &mut diagnostics);
    accelerate::install_accelerators(&mut grammar, &mut diagnostics);

    Ok(CompileOutput { grammar, diagnostics })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_the_worked_example_from_pgen_c() {
        let source = "expr: term (('+' | '-') term)*\nterm: NUMBER | '(' expr ')'\n";
        let out = compile_grammar(source).unwrap();
        assert_eq!(out.grammar.dfas().len(), 2);
        assert!(!out.diagnostics.has_errors());
    }

    #[test]
    fn rejects_duplicate_rule_names() {
        let source = "start: 'a'\nstart: 'b'\n";
        let err = compile_grammar(source).unwrap_err();
        assert!(matches!(err, CompileError::DuplicateRule(name) if name == "start"));
    }

    #[test]
    fn rejects_reference_to_undefined_rule() {
        let source = "start: nowhere\n";
        let err = compile_grammar(source).unwrap_err();
        assert!(matches!(err, CompileError::UndefinedRule(name) if name == "nowhere"));
    }

    #[test]
    fn reports_may_produce_empty_without_failing_the_build() {
        // `has_errors()` only reflects the original's "Error:"-worded
        // messages; it does not gate success here — table construction for
        // the rule continues regardless, matching `makedfa`'s own behavior.
        let source = "start: 'a'*\n";
        let out = compile_grammar(source).unwrap();
        assert!(out.diagnostics.has_errors());
    }
}
