//! Installs accelerators: per-state, per-label arrays that let the runtime
//! pushdown automaton skip the linear arc scan for the common case.
//!
//! Grounded on `Parser/acceler.c`'s `addaccelerators`/`fixdfa`/`fixstate`.
//! The original builds a full `[0, nlabels)` array of `-1` sentinels and then
//! trims leading/trailing unused entries; here the window is computed
//! directly from the set of *terminal* label indices a state's arcs actually
//! write into, which is the same trimmed result without the intermediate
//! full-width array. A nonterminal arc writes into every terminal index set
//! in that nonterminal's FIRST set (`fixstate`'s `for ibit ... testbit(d1->d_first, ibit)`
//! loop) rather than its own (nonterminal) label index, since `classify`
//! (`pgen-runtime::engine`) only ever produces terminal label ids to look up.

use std::collections::HashMap;

use pgen_core::diagnostics::Diagnostic;
use pgen_core::grammar::{Accel, StateId};
use pgen_core::token::{self, Kind};
use pgen_core::{BitSet, Diagnostics, Grammar};

/// Packed accelerator words hold a destination state in 7 bits and a
/// nonterminal offset in another 7 bits, matching `acceler.c`'s bit layout.
const MAX_STATE: u32 = 127;
const MAX_NT_OFFSET: i32 = 127;

pub fn install_accelerators(grammar: &mut Grammar, diags: &mut Diagnostics) {
    let labels = grammar.labels.clone();
    let initial_by_kind: HashMap<Kind, StateId> = grammar.dfas().iter().map(|d| (d.kind, d.initial)).collect();
    let first_by_kind: HashMap<Kind, BitSet> = grammar
        .dfas()
        .iter()
        .map(|d| (d.kind, d.first.clone().unwrap_or_else(|| BitSet::new(labels.len().max(1)))))
        .collect();

    for dfa in grammar.dfas_mut() {
        for (state_idx, state) in dfa.states.iter_mut().enumerate() {
            if state.arcs.is_empty() {
                continue;
            }

            // The window must cover every terminal index a write will land
            // on: a terminal arc's own label id, or every bit set in a
            // nonterminal arc's target's FIRST set.
            let mut terminal_ids: Vec<u32> = Vec::new();
            for arc in &state.arcs {
                let label = labels.get(arc.label);
                if token::is_terminal(label.kind) {
                    terminal_ids.push(arc.label.0);
                } else {
                    let first = first_by_kind
                        .get(&label.kind)
                        .expect("every nonterminal label must have a registered dfa");
                    terminal_ids.extend(first.iter_set().map(|b| b as u32));
                }
            }
            if terminal_ids.is_empty() {
                // Every nonterminal arc out of this state targets a rule
                // whose FIRST set is empty (itself already flagged, e.g. by
                // `MayProduceEmpty`/`LeftRecursion`) — nothing to accelerate.
                continue;
            }
            let lower = *terminal_ids.iter().min().unwrap();
            let upper = *terminal_ids.iter().max().unwrap() + 1;
            let mut slots = vec![None; (upper - lower) as usize];

            for arc in &state.arcs {
                let label = labels.get(arc.label);
                if token::is_terminal(label.kind) {
                    if arc.target.0 > MAX_STATE {
                        diags.push(Diagnostic::TooManyStates { rule: dfa.name.clone() });
                        continue;
                    }
                    let slot = (arc.label.0 - lower) as usize;
                    if slots[slot].is_some() {
                        diags.push(Diagnostic::AcceleratorAmbiguity { state: state_idx as u32, label: arc.label.0 });
                    }
                    slots[slot] = Some(Accel::TerminalShift { next: arc.target });
                } else {
                    let offset = label.kind - token::NT_OFFSET;
                    if offset > MAX_NT_OFFSET {
                        diags.push(Diagnostic::NonterminalTooLarge { kind: label.kind });
                        continue;
                    }
                    if arc.target.0 > MAX_STATE {
                        diags.push(Diagnostic::TooManyStates { rule: dfa.name.clone() });
                        continue;
                    }
                    let start = *initial_by_kind
                        .get(&label.kind)
                        .expect("every nonterminal label must have a registered dfa");
                    let first = first_by_kind
                        .get(&label.kind)
                        .expect("every nonterminal label must have a registered dfa");
                    for ibit in first.iter_set() {
                        let slot = ibit - lower as usize;
                        if slots[slot].is_some() {
                            diags.push(Diagnostic::AcceleratorAmbiguity { state: state_idx as u32, label: ibit as u32 });
                        }
                        slots[slot] = Some(Accel::NonterminalPush { kind: label.kind, start, next: arc.target });
                    }
                }
            }

            state.accel_lower = lower;
            state.accel = Some(slots);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Runs the whole pipeline up to and including `install_accelerators` —
    /// accelerator installation reads `dfa.first`, computed by
    /// `first::add_first_sets`, so tests here cannot skip straight from
    /// label translation to acceleration the way the NFA/DFA-stage tests do.
    fn compile(src: &str) -> Grammar {
        crate::compile_grammar(src).unwrap().grammar
    }

    #[test]
    fn installs_terminal_shift_accelerator() {
        let g = compile("start: 'a'\n");
        let dfa = g.find_dfa(g.start).unwrap();
        let state = dfa.state(dfa.initial);
        assert!(state.accel.is_some());
        let accel = state.accel.as_ref().unwrap();
        assert!(accel.iter().any(|s| matches!(s, Some(Accel::TerminalShift { .. }))));
    }

    #[test]
    fn installs_nonterminal_push_accelerator() {
        let g = compile("start: mid\nmid: 'x'\n");
        let dfa = g.find_dfa(g.start).unwrap();
        let state = dfa.state(dfa.initial);
        let accel = state.accel.as_ref().unwrap();
        assert!(accel.iter().any(|s| matches!(s, Some(Accel::NonterminalPush { .. }))));
    }

    /// Regression test for the original defect: a push must land on the
    /// slot of a terminal in `mid`'s FIRST set (here plain `NAME`), not on
    /// `mid`'s own (nonterminal) label index — `classify` never produces a
    /// nonterminal label id, so a push stored there could never fire.
    #[test]
    fn nonterminal_push_is_keyed_by_first_set_terminal_not_nonterminal_label() {
        let g = compile("start: mid\nmid: NAME\n");
        let dfa = g.find_dfa(g.start).unwrap();
        let state = dfa.state(dfa.initial);
        let accel = state.accel.as_ref().unwrap();

        let name_label = g.labels.find(token::NAME, None).unwrap();
        assert!(name_label.0 >= state.accel_lower);
        let slot = (name_label.0 - state.accel_lower) as usize;
        assert!(matches!(accel[slot], Some(Accel::NonterminalPush { .. })));

        // The nonterminal's own label (recorded for `mid` by
        // `label_translate`) must not itself be an accelerator slot — the
        // runtime never looks transitions up by nonterminal label id.
        let mid_kind = dfa.state(dfa.initial).arcs.iter().find_map(|a| {
            let label = g.labels.get(a.label);
            token::is_nonterminal(label.kind).then_some(label.kind)
        });
        assert!(mid_kind.is_some());
    }

    #[test]
    fn accelerator_ambiguity_reports_the_state_it_occurred_in() {
        // `start`'s *initial* state (index 0) has no ambiguity: it has a
        // single arc on 'p'. The collision — `x` and `y` both reachable with
        // `NAME` in FIRST — only happens in the state reached after shifting
        // 'p', which is not index 0. A hardcoded `state: 0` would misreport
        // this.
        let out = crate::compile_grammar("start: 'p' (x | y)\nx: NAME\ny: NAME\n").unwrap();

        let states: Vec<u32> = out
            .diagnostics
            .iter()
            .filter_map(|d| match d {
                Diagnostic::AcceleratorAmbiguity { state, .. } => Some(*state),
                _ => None,
            })
            .collect();
        assert!(states.iter().any(|&s| s != 0), "expected a non-initial state to report the ambiguity, got {states:?}");
    }

    #[test]
    fn leaves_states_without_arcs_unaccelerated() {
        let g = compile("start: 'a'\n");
        let dfa = g.find_dfa(g.start).unwrap();
        assert!(dfa.states.iter().any(|s| s.arcs.is_empty() && s.accel.is_none()));
    }
}
