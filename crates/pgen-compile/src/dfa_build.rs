//! Subset construction: turns one rule's NFA into a DFA over subsets of NFA
//! states.
//!
//! Grounded on `Parser/pgen.c`'s `addclosure` (recursive epsilon closure with
//! an "already in set" short-circuit) and `makedfa`'s double loop: outer loop
//! over unmarked subset-states, inner loop coalescing outgoing arcs by label.

use pgen_core::diagnostics::Diagnostic;
use pgen_core::label::{LabelId, LabelList};
use pgen_core::Diagnostics;

use crate::nfa::Nfa;

const EMPTY: LabelId = LabelId(0);

#[derive(Debug, Clone)]
pub struct SsState {
    /// Sorted, deduplicated NFA state indices this subset state represents.
    pub nfa_states: Vec<usize>,
    pub arcs: Vec<(LabelId, usize)>,
    pub accepting: bool,
}

#[derive(Debug, Clone)]
pub struct SsDfa {
    pub name: String,
    pub states: Vec<SsState>,
}

/// `addclosure`: adds `start` and everything reachable from it via epsilon
/// arcs to `set`, skipping states already present (the "already set"
/// short-circuit that keeps this from looping on epsilon cycles).
fn add_closure(nfa: &Nfa, set: &mut Vec<usize>, start: usize) {
    if set.contains(&start) {
        return;
    }
    set.push(start);
    for arc in &nfa.states[start].arcs {
        if arc.label == EMPTY {
            add_closure(nfa, set, arc.target);
        }
    }
}

fn closure_of(nfa: &Nfa, seeds: &[usize]) -> Vec<usize> {
    let mut set = Vec::new();
    for &s in seeds {
        add_closure(nfa, &mut set, s);
    }
    set.sort_unstable();
    set
}

/// `makedfa`: runs subset construction to completion, returning the DFA over
/// subsets plus any diagnostics raised along the way (may-produce-empty).
pub fn makedfa(nfa: &Nfa, diags: &mut Diagnostics) -> SsDfa {
    let initial = closure_of(nfa, &[nfa.start]);
    let initial_accepting = initial.contains(&nfa.finish);
    if initial_accepting {
        diags.push(Diagnostic::MayProduceEmpty { rule: nfa.name.clone() });
    }

    let mut states = vec![SsState { nfa_states: initial, arcs: Vec::new(), accepting: initial_accepting }];

    let mut i = 0;
    while i < states.len() {
        let mut labels_seen: Vec<LabelId> = Vec::new();
        for &ns in &states[i].nfa_states {
            for arc in &nfa.states[ns].arcs {
                if arc.label != EMPTY && !labels_seen.contains(&arc.label) {
                    labels_seen.push(arc.label);
                }
            }
        }

        for label in labels_seen {
            let mut targets = Vec::new();
            for &ns in &states[i].nfa_states {
                for arc in &nfa.states[ns].arcs {
                    if arc.label == label {
                        targets.push(arc.target);
                    }
                }
            }
            let subset = closure_of(nfa, &targets);
            let accepting = subset.contains(&nfa.finish);

            let target_index = states.iter().position(|s| s.nfa_states == subset).unwrap_or_else(|| {
                states.push(SsState { nfa_states: subset, arcs: Vec::new(), accepting });
                states.len() - 1
            });
            states[i].arcs.push((label, target_index));
        }
        i += 1;
    }

    SsDfa { name: nfa.name.clone(), states }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metaparse;
    use crate::nfa::metacompile;

    fn build(src: &str) -> (SsDfa, Diagnostics) {
        let tree = metaparse::parse(src).unwrap();
        let g = metacompile(&tree);
        let mut diags = Diagnostics::new();
        let dfa = makedfa(&g.nfas[0], &mut diags);
        (dfa, diags)
    }

    #[test]
    fn plain_sequence_has_no_accepting_initial_state() {
        let (dfa, diags) = build("start: 'a' 'b'\n");
        assert!(!dfa.states[0].accepting);
        assert!(diags.is_empty());
    }

    #[test]
    fn star_rule_reports_may_produce_empty() {
        let (_dfa, diags) = build("start: 'a'*\n");
        assert!(diags.iter().any(|d| matches!(d, Diagnostic::MayProduceEmpty { .. })));
    }

    #[test]
    fn alternation_merges_into_distinct_reachable_states() {
        let (dfa, _diags) = build("start: 'a' | 'b'\n");
        assert_eq!(dfa.states[0].arcs.len(), 2);
    }

    #[test]
    fn common_prefix_arcs_coalesce_into_one_state_per_label() {
        let (dfa, _diags) = build("start: ('a' 'b') | ('a' 'c')\n");
        assert_eq!(dfa.states[0].arcs.len(), 1);
    }
}
