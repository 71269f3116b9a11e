//! Thompson-style NFA builder: walks the meta-tree produced by
//! [`crate::metaparse`] and emits one NFA fragment per rule.
//!
//! A line-for-line structural port of `Parser/pgen.c`'s `compile_rule`/
//! `compile_rhs`/`compile_alt`/`compile_item`/`compile_atom`. Raw `NAME`/
//! `STRING` labels recorded here are left unresolved (terminal vs
//! nonterminal) until [`crate::label_translate`] runs, matching the
//! original's `addlabel`-then-`translatelabels` split.

use pgen_core::label::{LabelId, LabelList};
use pgen_core::token::{self, Kind};
use pgen_core::ParseNode;

use crate::metaparse::{ATOM, ITEM, RHS};

#[derive(Debug, Clone)]
pub struct NfaArc {
    pub label: LabelId,
    pub target: usize,
}

#[derive(Debug, Clone, Default)]
pub struct NfaState {
    pub arcs: Vec<NfaArc>,
}

#[derive(Debug, Clone)]
pub struct Nfa {
    pub kind: Kind,
    pub name: String,
    pub states: Vec<NfaState>,
    pub start: usize,
    pub finish: usize,
}

impl Nfa {
    fn new_state(&mut self) -> usize {
        self.states.push(NfaState::default());
        self.states.len() - 1
    }

    fn add_arc(&mut self, from: usize, to: usize, label: LabelId) {
        self.states[from].arcs.push(NfaArc { label, target: to });
    }
}

#[derive(Debug, Clone)]
pub struct NfaGrammar {
    pub labels: LabelList,
    pub nfas: Vec<Nfa>,
    pub start: Kind,
}

/// `metacompile`: walks `MSTART`'s `(RULE NEWLINE)*` children, compiling each
/// `RULE` in turn. The first rule compiled becomes the grammar's start symbol,
/// matching the original's convention that the first DFA is the start DFA.
pub fn metacompile(mstart: &ParseNode) -> NfaGrammar {
    let mut labels = LabelList::with_empty_sentinel();
    let mut nfas = Vec::new();
    let mut next_kind = token::NT_OFFSET;
    let mut start = next_kind;
    let mut first = true;

    for child in &mstart.children {
        if child.kind != crate::metaparse::RULE {
            continue;
        }
        let name = child.children[0].lexeme.clone().unwrap();
        let rhs = &child.children[2];
        let kind = next_kind;
        next_kind += 1;
        if first {
            start = kind;
            first = false;
        }
        let mut nfa = Nfa { kind, name, states: Vec::new(), start: 0, finish: 0 };
        let (s, f) = compile_rhs(&mut labels, rhs, &mut nfa);
        nfa.start = s;
        nfa.finish = f;
        nfas.push(nfa);
    }

    NfaGrammar { labels, nfas, start }
}

/// `compile_rhs`: one alternative needs no extra epsilon fanout; two or more
/// get a shared entry/exit pair epsilon-linked to each alternative.
fn compile_rhs(labels: &mut LabelList, rhs: &ParseNode, nfa: &mut Nfa) -> (usize, usize) {
    let alts: Vec<&ParseNode> = rhs.children.iter().filter(|c| c.kind == crate::metaparse::ALT).collect();
    debug_assert_eq!(rhs.kind, RHS);
    if alts.len() == 1 {
        return compile_alt(labels, alts[0], nfa);
    }
    let empty = LabelId(0);
    let entry = nfa.new_state();
    let exit = nfa.new_state();
    for alt in alts {
        let (a, b) = compile_alt(labels, alt, nfa);
        nfa.add_arc(entry, a, empty);
        nfa.add_arc(b, exit, empty);
    }
    (entry, exit)
}

/// `compile_alt`: chains items with epsilon arcs, item[i].finish -> item[i+1].start.
fn compile_alt(labels: &mut LabelList, alt: &ParseNode, nfa: &mut Nfa) -> (usize, usize) {
    let empty = LabelId(0);
    let items = &alt.children;
    let (start, mut prev_finish) = compile_item(labels, &items[0], nfa);
    for item in &items[1..] {
        let (a, b) = compile_item(labels, item, nfa);
        nfa.add_arc(prev_finish, a, empty);
        prev_finish = b;
    }
    (start, prev_finish)
}

/// `compile_item`: `'[' RHS ']'` (optional group) or `ATOM ('*' | '+')?`.
fn compile_item(labels: &mut LabelList, item: &ParseNode, nfa: &mut Nfa) -> (usize, usize) {
    debug_assert_eq!(item.kind, ITEM);
    let empty = LabelId(0);
    if item.children[0].kind == token::LSQB {
        let (a, b) = compile_rhs(labels, &item.children[1], nfa);
        nfa.add_arc(a, b, empty);
        return (a, b);
    }

    let (a, b) = compile_atom(labels, &item.children[0], nfa);
    if item.children.len() < 2 {
        return (a, b);
    }
    match item.children[1].kind {
        token::STAR => {
            nfa.add_arc(b, a, empty);
            (a, a)
        }
        token::PLUS => {
            nfa.add_arc(b, a, empty);
            (a, b)
        }
        _ => (a, b),
    }
}

/// `compile_atom`: `NAME | STRING | '(' RHS ')'`.
fn compile_atom(labels: &mut LabelList, atom: &ParseNode, nfa: &mut Nfa) -> (usize, usize) {
    debug_assert_eq!(atom.kind, ATOM);
    let child = &atom.children[0];
    match child.kind {
        token::NAME => {
            let label = labels.add(token::NAME, child.lexeme.clone());
            let a = nfa.new_state();
            let b = nfa.new_state();
            nfa.add_arc(a, b, label);
            (a, b)
        }
        token::STRING => {
            let raw = child.lexeme.as_deref().unwrap_or("");
            let inner = raw.trim_matches(|c| c == '\'' || c == '"').to_string();
            let label = labels.add(token::STRING, Some(inner));
            let a = nfa.new_state();
            let b = nfa.new_state();
            nfa.add_arc(a, b, label);
            (a, b)
        }
        token::LPAR => compile_rhs(labels, &atom.children[1], nfa),
        _ => unreachable!("ATOM child must be NAME, STRING, or '('"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_rule_single_alt_produces_two_state_nfa() {
        let tree = crate::metaparse::parse("start: 'a'\n").unwrap();
        let g = metacompile(&tree);
        assert_eq!(g.nfas.len(), 1);
        let nfa = &g.nfas[0];
        assert_eq!(nfa.name, "start");
        assert_ne!(nfa.start, nfa.finish);
    }

    #[test]
    fn star_makes_finish_equal_start() {
        let tree = crate::metaparse::parse("start: 'a'*\n").unwrap();
        let g = metacompile(&tree);
        let nfa = &g.nfas[0];
        assert_eq!(nfa.start, nfa.finish);
    }

    #[test]
    fn plus_keeps_distinct_start_and_finish_with_backedge() {
        let tree = crate::metaparse::parse("start: 'a'+\n").unwrap();
        let g = metacompile(&tree);
        let nfa = &g.nfas[0];
        assert_ne!(nfa.start, nfa.finish);
        let has_backedge = nfa.states[nfa.finish].arcs.iter().any(|a| a.target == nfa.start);
        assert!(has_backedge);
    }

    #[test]
    fn multiple_rules_get_sequential_kinds_and_first_is_start() {
        let tree = crate::metaparse::parse("start: mid\nmid: 'x'\n").unwrap();
        let g = metacompile(&tree);
        assert_eq!(g.nfas[0].kind, token::NT_OFFSET);
        assert_eq!(g.nfas[1].kind, token::NT_OFFSET + 1);
        assert_eq!(g.start, token::NT_OFFSET);
    }

    #[test]
    fn optional_group_adds_direct_skip_arc() {
        let tree = crate::metaparse::parse("start: 'a' ['b']\n").unwrap();
        let g = metacompile(&tree);
        let nfa = &g.nfas[0];
        assert!(nfa.states.iter().any(|s| s.arcs.len() >= 2));
    }
}
