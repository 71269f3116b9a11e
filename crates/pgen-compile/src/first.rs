//! FIRST-set computation with left-recursion detection.
//!
//! Grounded on `Parser/firstsets.c`'s `calcfirstset`: a `dummy` sentinel is
//! installed for a rule's FIRST set the moment computation starts, so that
//! recursing back into the same rule (directly, or via another rule that is
//! itself still mid-computation) can be detected and reported instead of
//! looping forever. Only the **initial state's** direct arcs are scanned —
//! deeper states are not examined, matching the original exactly.

use std::collections::HashSet;

use pgen_core::diagnostics::Diagnostic;
use pgen_core::token::{self, Kind};
use pgen_core::{BitSet, Diagnostics, Grammar};

/// `addfirstsets`: computes FIRST for every DFA that doesn't have one yet.
pub fn add_first_sets(grammar: &mut Grammar, diags: &mut Diagnostics) {
    let kinds: Vec<Kind> = grammar.dfas().iter().map(|d| d.kind).collect();
    let mut in_progress: HashSet<Kind> = HashSet::new();
    for kind in kinds {
        if grammar.find_dfa(kind).unwrap().first.is_none() {
            calc_first_set(grammar, kind, &mut in_progress, diags);
        }
    }
}

fn calc_first_set(grammar: &mut Grammar, kind: Kind, in_progress: &mut HashSet<Kind>, diags: &mut Diagnostics) {
    in_progress.insert(kind);

    let arcs = {
        let dfa = grammar.find_dfa(kind).unwrap();
        dfa.state(dfa.initial).arcs.clone()
    };
    let nlabels = grammar.labels.len();
    let mut result = BitSet::new(nlabels.max(1));

    for arc in arcs {
        let label_kind = grammar.labels.get(arc.label).kind;
        if token::is_nonterminal(label_kind) {
            let target = label_kind;
            if in_progress.contains(&target) {
                let rule_name = grammar.find_dfa(target).unwrap().name.clone();
                if target == kind {
                    diags.push(Diagnostic::LeftRecursion { rule: rule_name, under: None });
                } else {
                    let cur_name = grammar.find_dfa(kind).unwrap().name.clone();
                    diags.push(Diagnostic::LeftRecursion { rule: rule_name, under: Some(cur_name) });
                }
                continue;
            }
            if grammar.find_dfa(target).unwrap().first.is_none() {
                calc_first_set(grammar, target, in_progress, diags);
            }
            if let Some(target_first) = grammar.find_dfa(target).unwrap().first.clone() {
                result.merge_from(&target_first);
            }
        } else {
            result.add(arc.label.0 as usize);
        }
    }

    grammar.find_dfa_mut(kind).unwrap().first = Some(result);
    in_progress.remove(&kind);
}
