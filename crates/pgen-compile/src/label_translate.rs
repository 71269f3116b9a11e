//! Resolves the raw `NAME`/`STRING` labels recorded during NFA construction
//! into real terminal or nonterminal kinds.
//!
//! Grounded directly on `Parser/grammar.c`'s `translatelabels`/`translabel`:
//! a bare `NAME` atom resolves to another rule's kind if one matches, else to
//! a fixed terminal kind by name (`tok_name[]` lookup); a `STRING` atom
//! resolves to the matching single-character punctuation kind if it is
//! exactly one character, else to a keyword `NAME` carrying that spelling.

use std::collections::HashMap;

use pgen_core::token::{self, Kind};
use pgen_core::{Grammar, LabelId};

use crate::error::CompileError;
use crate::nfa::Nfa;

pub fn translate_labels(grammar: &mut Grammar, nfas: &[Nfa]) -> Result<(), CompileError> {
    let rule_kind_by_name: HashMap<&str, Kind> = nfas.iter().map(|n| (n.name.as_str(), n.kind)).collect();

    for i in 0..grammar.labels.len() as u32 {
        let id = LabelId(i);
        let label = grammar.labels.get(id).clone();
        if label.kind == token::NAME {
            let name = label.text.unwrap_or_default();
            if let Some(&kind) = rule_kind_by_name.get(name.as_str()) {
                grammar.labels.resolve(id, kind, None);
            } else if let Some(kind) = token::by_name(&name) {
                grammar.labels.resolve(id, kind, None);
            } else {
                return Err(CompileError::UndefinedRule(name));
            }
        } else if label.kind == token::STRING {
            let text = label.text.unwrap_or_default();
            let mut chars = text.chars();
            let first = chars.next();
            let single = first.is_some() && chars.next().is_none();
            if single {
                if let Some(kind) = token::one_char(first.unwrap()) {
                    grammar.labels.resolve(id, kind, None);
                    continue;
                }
            }
            if !text.is_empty() && text.chars().all(|c| c.is_alphabetic() || c == '_') {
                grammar.labels.resolve(id, token::NAME, Some(text));
            } else {
                return Err(CompileError::UnknownLiteral(text));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dfa_build;
    use crate::metaparse;
    use crate::minimize;
    use crate::nfa::metacompile;
    use pgen_core::Diagnostics;

    fn compile(src: &str) -> (Grammar, Vec<Nfa>) {
        let tree = metaparse::parse(src).unwrap();
        let nfag = metacompile(&tree);
        let mut diags = Diagnostics::new();
        let mut grammar = Grammar::new(nfag.labels.clone(), nfag.start);
        for rule_nfa in &nfag.nfas {
            let mut ssdfa = dfa_build::makedfa(rule_nfa, &mut diags);
            minimize::simplify(&mut ssdfa);
            grammar.add_dfa(minimize::convert(&ssdfa, rule_nfa.kind, rule_nfa.name.clone()));
        }
        (grammar, nfag.nfas)
    }

    #[test]
    fn resolves_name_reference_to_sibling_rule_kind() {
        let (mut g, nfas) = compile("start: mid\nmid: 'x'\n");
        translate_labels(&mut g, &nfas).unwrap();
        let mid_kind = nfas[1].kind;
        let arc = g.find_dfa(g.start).unwrap().state(g.find_dfa(g.start).unwrap().initial).arcs[0];
        assert_eq!(g.labels.get(arc.label).kind, mid_kind);
    }

    #[test]
    fn resolves_bare_name_to_fixed_terminal_kind() {
        let (mut g, nfas) = compile("start: NAME\n");
        translate_labels(&mut g, &nfas).unwrap();
        let arc = g.find_dfa(g.start).unwrap().state(g.find_dfa(g.start).unwrap().initial).arcs[0];
        assert_eq!(g.labels.get(arc.label).kind, token::NAME);
    }

    #[test]
    fn resolves_single_char_string_to_punctuation_kind() {
        let (mut g, nfas) = compile("start: '+'\n");
        translate_labels(&mut g, &nfas).unwrap();
        let arc = g.find_dfa(g.start).unwrap().state(g.find_dfa(g.start).unwrap().initial).arcs[0];
        assert_eq!(g.labels.get(arc.label).kind, token::PLUS);
    }

    #[test]
    fn resolves_word_string_to_keyword_name() {
        let (mut g, nfas) = compile("start: 'if'\n");
        translate_labels(&mut g, &nfas).unwrap();
        let arc = g.find_dfa(g.start).unwrap().state(g.find_dfa(g.start).unwrap().initial).arcs[0];
        let label = g.labels.get(arc.label);
        assert_eq!(label.kind, token::NAME);
        assert_eq!(label.text.as_deref(), Some("if"));
    }

    #[test]
    fn rejects_undefined_rule_reference() {
        let (mut g, nfas) = compile("start: missing_rule\n");
        let err = translate_labels(&mut g, &nfas).unwrap_err();
        assert!(matches!(err, CompileError::UndefinedRule(name) if name == "missing_rule"));
    }
}
