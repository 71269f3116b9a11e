//! DFA state minimization and conversion into the final [`Dfa`] shape.
//!
//! Grounded on `Parser/pgen.c`'s `samestate`/`renamestates`/`simplify`/`convert`.
//! `simplify` is **deliberately not** Hopcroft's or any canonical minimization
//! algorithm — per the original's own comment: "This is NOT Algorithm 3.3 ...
//! does not always find the minimal DFA, but it does usually make a much
//! smaller one... (For an example of sub-optimal behavior, try
//! `S: x a b+ | y a b+`.)" That suboptimality is preserved verbatim, not
//! upgraded to real minimization — see DESIGN.md.

use pgen_core::grammar::{Arc, Dfa, State, StateId};
use pgen_core::token::Kind;

use crate::dfa_build::SsDfa;

/// `samestate`: two subset-states are interchangeable only if they agree on
/// acceptance AND have arc lists of identical length where corresponding
/// positions carry the same label and (already-renamed) target. This is
/// arc-*order* sensitive by construction, same as the original.
fn samestate(dfa: &SsDfa, i: usize, j: usize) -> bool {
    let a = &dfa.states[i];
    let b = &dfa.states[j];
    a.accepting == b.accepting
        && a.arcs.len() == b.arcs.len()
        && a.arcs.iter().zip(b.arcs.iter()).all(|(x, y)| x.0 == y.0 && x.1 == y.1)
}

/// `renamestates`: every arc pointing at `from` now points at `to`.
fn rename_target(dfa: &mut SsDfa, from: usize, to: usize) {
    for state in dfa.states.iter_mut() {
        for arc in state.arcs.iter_mut() {
            if arc.1 == from {
                arc.1 = to;
            }
        }
    }
}

/// `simplify`: a `do { ... } while (changes)` fixpoint. On each full pass,
/// scan states from the end backward; the first pair found equivalent is
/// merged and the pass restarts from scratch, exactly mirroring the
/// original's early-break-then-redo-the-whole-scan behavior (which is *why*
/// it's order sensitive — a merge earlier in the scan can prevent a later,
/// still-valid merge from ever being discovered).
pub fn simplify(dfa: &mut SsDfa) {
    loop {
        let mut changed = false;
        let n = dfa.states.len();
        'outer: for i in (1..n).rev() {
            if dfa.states[i].nfa_states.is_empty() {
                continue;
            }
            for j in 0..i {
                if dfa.states[j].nfa_states.is_empty() {
                    continue;
                }
                if samestate(dfa, i, j) {
                    rename_target(dfa, i, j);
                    dfa.states[i].nfa_states.clear();
                    dfa.states[i].arcs.clear();
                    changed = true;
                    break 'outer;
                }
            }
        }
        if !changed {
            break;
        }
    }
}

/// `convert`: renumbers surviving (non-tombstoned) states densely, state 0
/// stays the initial state (it is never itself merged away, only merged
/// into — matching the original, which never renames the initial state's
/// own index).
pub fn convert(ssdfa: &SsDfa, kind: Kind, name: String) -> Dfa {
    let mut mapping: Vec<Option<usize>> = vec![None; ssdfa.states.len()];
    let mut states = Vec::new();
    for (old_idx, s) in ssdfa.states.iter().enumerate() {
        if s.nfa_states.is_empty() {
            continue;
        }
        mapping[old_idx] = Some(states.len());
        states.push(State { arcs: Vec::new(), accepting: s.accepting, accel: None, accel_lower: 0 });
    }
    for (old_idx, s) in ssdfa.states.iter().enumerate() {
        let Some(new_idx) = mapping[old_idx] else { continue };
        for &(label, target) in &s.arcs {
            let new_target = mapping[target].expect("simplify must not leave a dangling arc target");
            states[new_idx].arcs.push(Arc { label, target: StateId(new_target as u32) });
        }
    }
    let initial = StateId(mapping[0].expect("initial state is never tombstoned") as u32);
    Dfa { kind, name, states, initial, first: None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dfa_build::makedfa;
    use crate::metaparse;
    use crate::nfa::metacompile;
    use pgen_core::Diagnostics;

    fn build(src: &str) -> SsDfa {
        let tree = metaparse::parse(src).unwrap();
        let g = metacompile(&tree);
        let mut diags = Diagnostics::new();
        makedfa(&g.nfas[0], &mut diags)
    }

    #[test]
    fn merges_states_with_identical_outgoing_arcs() {
        let mut dfa = build("start: ('a' 'c') | ('b' 'c')\n");
        let before = dfa.states.len();
        simplify(&mut dfa);
        let after = dfa.states.iter().filter(|s| !s.nfa_states.is_empty()).count();
        assert!(after <= before);
    }

    #[test]
    fn convert_produces_densely_numbered_live_states() {
        let mut dfa = build("start: 'a' 'b'\n");
        simplify(&mut dfa);
        let converted = convert(&dfa, 256, "start".to_string());
        let live = dfa.states.iter().filter(|s| !s.nfa_states.is_empty()).count();
        assert_eq!(converted.states.len(), live);
        assert_eq!(converted.initial, StateId(0));
    }

    /// Pins the documented suboptimal-merge behavior: `S: x a b+ | y a b+`
    /// does not collapse to the theoretical minimum because `simplify`
    /// compares arcs positionally rather than recognizing `x`/`y` as
    /// distinguishable-but-otherwise-redundant prefixes feeding the same tail.
    #[test]
    fn documents_suboptimal_merge() {
        let mut dfa = build("start: ('x' 'a' 'b'+) | ('y' 'a' 'b'+)\n");
        let before_live = dfa.states.iter().filter(|s| !s.nfa_states.is_empty()).count();
        simplify(&mut dfa);
        let after_live = dfa.states.iter().filter(|s| !s.nfa_states.is_empty()).count();
        // The 'a b+' tails reached via 'x' and via 'y' are structurally
        // identical and a canonical minimizer would merge them into one
        // shared suffix; this one does not, so no reduction happens here.
        assert_eq!(before_live, after_live);
    }
}
