//! The generated-table data model: `Grammar`, `Dfa`, `State`, `Arc`, and the
//! packed accelerator value.
//!
//! Grounded on `Parser/grammar.c` (`newgrammar`/`adddfa`/`addstate`/`addarc`)
//! for the container operations, and on `Parser/acceler.c`'s bit-packed
//! `int accel[k]` encoding for [`Accel`]. Indices, not references, link states
//! to arcs and arcs to destination states — avoiding cyclic ownership on
//! graphs with cycles — following `plotnik-compiler`'s `Label(u32)` +
//! `IndexMap` handle style.

use indexmap::IndexMap;

use crate::bitset::BitSet;
use crate::label::{LabelId, LabelList};
use crate::token::{Kind, NT_OFFSET};

/// A transition out of a [`State`], labeled by a [`LabelId`] and pointing at
/// another state within the same [`Dfa`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arc {
    pub label: LabelId,
    pub target: StateId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub u32);

/// A single packed accelerator decision for one label in a state's `[lower,
/// upper)` window. Mirrors `acceler.c`'s `accel[ibit] = a->a_arrow | (1 << 7)
/// | ((type - NT_OFFSET) << 8)` for nonterminal pushes, and the plain
/// `accel[lbl] = a->a_arrow` form for terminal shifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accel {
    /// Shift the current token and move to `next` in the same DFA.
    TerminalShift { next: StateId },
    /// Push a new stack frame for nonterminal `kind`, whose own DFA starts
    /// at `start`; the current frame will resume at `next` once that
    /// nonterminal is reduced.
    NonterminalPush { kind: Kind, start: StateId, next: StateId },
}

impl Accel {
    /// Packs into the original's 32-bit accelerator word: bit 7 is the tag,
    /// bits 8..14 hold `kind - NT_OFFSET`, and the low 7 bits hold the
    /// destination state. `start` is not representable in the packed word
    /// (the original looks it up from `d_initial` of the target DFA at
    /// decode time) so `to_word` only packs `next`/`kind`; callers that need
    /// `start` keep `Accel` itself rather than round-tripping through the word.
    pub fn to_word(&self) -> u32 {
        match *self {
            Accel::TerminalShift { next } => next.0,
            Accel::NonterminalPush { kind, next, .. } => {
                (next.0 & 0x7f) | (1 << 7) | (((kind - NT_OFFSET) as u32) << 8)
            }
        }
    }
}

/// One state in a [`Dfa`]: its outgoing arcs and whether it is accepting.
#[derive(Debug, Clone, Default)]
pub struct State {
    pub arcs: Vec<Arc>,
    pub accepting: bool,
    /// Installed by the accelerator pass; `None` until then.
    pub accel: Option<Vec<Option<Accel>>>,
    /// Lower bound (inclusive) of the accelerator window, i.e. the first
    /// label index the window covers. Only meaningful once `accel` is `Some`.
    pub accel_lower: u32,
}

/// The DFA for one nonterminal rule.
#[derive(Debug, Clone)]
pub struct Dfa {
    pub kind: Kind,
    pub name: String,
    pub states: Vec<State>,
    pub initial: StateId,
    /// FIRST set over label ids, `None` until `addfirstsets` has run.
    pub first: Option<BitSet>,
}

impl Dfa {
    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.0 as usize]
    }

    pub fn state_mut(&mut self, id: StateId) -> &mut State {
        &mut self.states[id.0 as usize]
    }
}

/// The full generated grammar: every rule's DFA plus the shared label table.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub labels: LabelList,
    dfas: Vec<Dfa>,
    by_kind: IndexMap<Kind, usize>,
    pub start: Kind,
}

impl Grammar {
    pub fn new(labels: LabelList, start: Kind) -> Self {
        Grammar { labels, dfas: Vec::new(), by_kind: IndexMap::new(), start }
    }

    pub fn add_dfa(&mut self, dfa: Dfa) {
        self.by_kind.insert(dfa.kind, self.dfas.len());
        self.dfas.push(dfa);
    }

    pub fn dfas(&self) -> &[Dfa] {
        &self.dfas
    }

    pub fn dfas_mut(&mut self) -> &mut [Dfa] {
        &mut self.dfas
    }

    /// Indexes directly by construction order, matching how `newnfa`'s
    /// counter and `pgen`'s single pass allocate nonterminal kinds densely
    /// and in order (see SPEC_FULL.md §3). `finddfa` in the original does a
    /// linear scan tolerant of out-of-order construction; kept here as
    /// [`Grammar::find_dfa_scanning`] for tooling that doesn't control
    /// construction order.
    pub fn find_dfa(&self, kind: Kind) -> Option<&Dfa> {
        self.by_kind.get(&kind).map(|&i| &self.dfas[i])
    }

    pub fn find_dfa_mut(&mut self, kind: Kind) -> Option<&mut Dfa> {
        if let Some(&i) = self.by_kind.get(&kind) {
            Some(&mut self.dfas[i])
        } else {
            None
        }
    }

    pub fn find_dfa_scanning(&self, kind: Kind) -> Option<&Dfa> {
        self.dfas.iter().find(|d| d.kind == kind)
    }

    /// Checks every index a deserialized [`crate::tables::GrammarTables`]
    /// could have gotten wrong: arc targets and labels, initial states, and
    /// accelerator destinations, including the nonterminal `kind` an
    /// [`Accel::NonterminalPush`] names. Never called on a `Grammar` built by
    /// the compiler itself, whose indices are correct by construction.
    pub fn validate(&self) -> Result<(), crate::error::CoreError> {
        use crate::error::CoreError;

        for dfa in &self.dfas {
            let n = dfa.states.len() as u32;
            if dfa.initial.0 >= n {
                return Err(CoreError::StateOutOfRange(dfa.initial.0));
            }
            for state in &dfa.states {
                for arc in &state.arcs {
                    if arc.target.0 >= n {
                        return Err(CoreError::StateOutOfRange(arc.target.0));
                    }
                    if arc.label.0 as usize >= self.labels.len() {
                        return Err(CoreError::LabelOutOfRange(arc.label.0));
                    }
                }
                if let Some(slots) = &state.accel {
                    for entry in slots.iter().flatten() {
                        match *entry {
                            Accel::TerminalShift { next } => {
                                if next.0 >= n {
                                    return Err(CoreError::StateOutOfRange(next.0));
                                }
                            }
                            Accel::NonterminalPush { kind, start, next } => {
                                if next.0 >= n {
                                    return Err(CoreError::StateOutOfRange(next.0));
                                }
                                let target = self.find_dfa(kind).ok_or(CoreError::UnknownNonterminal(kind))?;
                                if start.0 >= target.states.len() as u32 {
                                    return Err(CoreError::StateOutOfRange(start.0));
                                }
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
