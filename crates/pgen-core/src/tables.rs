//! `serde`-derived mirror of [`crate::grammar::Grammar`] for debug dumps and
//! the on-disk table format used for generated grammar tables.
//!
//! Mirrors `plotnik-core::grammar::json`-style (de)serializable table structs
//! kept separate from the in-memory graph so the graph can stay
//! index-based and cheap to mutate during construction.

use serde::{Deserialize, Serialize};

use crate::grammar::{Accel, Arc as GArc, Dfa, Grammar, State, StateId};
use crate::label::{Label, LabelId, LabelList};
use crate::token::Kind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelRecord {
    pub kind: Kind,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArcRecord {
    pub label: u32,
    pub target: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccelRecord {
    pub lower: u32,
    /// One slot per label in `[lower, lower + slots.len())`; `None` means no
    /// accelerator entry for that label in this state.
    pub slots: Vec<Option<AccelEntry>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AccelEntry {
    TerminalShift { next: u32 },
    NonterminalPush { kind: Kind, start: u32, next: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateRecord {
    pub arcs: Vec<ArcRecord>,
    pub accepting: bool,
    pub accel: Option<AccelRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DfaRecord {
    pub kind: Kind,
    pub name: String,
    pub states: Vec<StateRecord>,
    pub initial: u32,
    /// FIRST-set label ids, sorted ascending; `None` if FIRST sets were not computed.
    pub first: Option<Vec<u32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarTables {
    pub labels: Vec<LabelRecord>,
    pub dfas: Vec<DfaRecord>,
    pub start: Kind,
}

impl From<&Grammar> for GrammarTables {
    fn from(g: &Grammar) -> Self {
        let labels = g
            .labels
            .iter()
            .map(|(_, l): (LabelId, &Label)| LabelRecord { kind: l.kind, text: l.text.clone() })
            .collect();
        let dfas = g.dfas().iter().map(dfa_to_record).collect();
        GrammarTables { labels, dfas, start: g.start }
    }
}

fn dfa_to_record(dfa: &Dfa) -> DfaRecord {
    DfaRecord {
        kind: dfa.kind,
        name: dfa.name.clone(),
        states: dfa.states.iter().map(state_to_record).collect(),
        initial: dfa.initial.0,
        first: dfa.first.as_ref().map(|bs| bs.iter_set().map(|b| b as u32).collect()),
    }
}

fn state_to_record(state: &State) -> StateRecord {
    StateRecord {
        arcs: state
            .arcs
            .iter()
            .map(|a: &GArc| ArcRecord { label: a.label.0, target: a.target.0 })
            .collect(),
        accepting: state.accepting,
        accel: state.accel.as_ref().map(|slots| AccelRecord {
            lower: state.accel_lower,
            slots: slots
                .iter()
                .map(|slot| {
                    slot.map(|a| match a {
                        Accel::TerminalShift { next } => AccelEntry::TerminalShift { next: next.0 },
                        Accel::NonterminalPush { kind, start, next } => {
                            AccelEntry::NonterminalPush { kind, start: start.0, next: next.0 }
                        }
                    })
                })
                .collect(),
        }),
    }
}

impl GrammarTables {
    /// Rebuilds an in-memory [`Grammar`], validating every index a
    /// hand-edited or corrupted table file could have gotten wrong (see
    /// [`Grammar::validate`]). The label list is rebuilt by replay (`add` is
    /// dedup-aware), matching the original's append-only semantics.
    pub fn to_grammar(&self) -> Result<Grammar, crate::error::CoreError> {
        let mut labels = LabelList::new();
        for rec in &self.labels {
            labels.add(rec.kind, rec.text.clone());
        }
        let mut g = Grammar::new(labels, self.start);
        for rec in &self.dfas {
            g.add_dfa(Dfa {
                kind: rec.kind,
                name: rec.name.clone(),
                states: rec.states.iter().map(record_to_state).collect(),
                initial: StateId(rec.initial),
                first: rec.first.as_ref().map(|ids| {
                    let max = ids.iter().copied().max().unwrap_or(0) as usize + 1;
                    let mut bs = crate::bitset::BitSet::new(max);
                    for id in ids {
                        bs.add(*id as usize);
                    }
                    bs
                }),
            });
        }
        g.validate()?;
        Ok(g)
    }
}

fn record_to_state(rec: &StateRecord) -> State {
    State {
        arcs: rec
            .arcs
            .iter()
            .map(|a| GArc { label: LabelId(a.label), target: StateId(a.target) })
            .collect(),
        accepting: rec.accepting,
        accel: rec.accel.as_ref().map(|ar| {
            ar.slots
                .iter()
                .map(|slot| {
                    slot.as_ref().map(|e| match *e {
                        AccelEntry::TerminalShift { next } => Accel::TerminalShift { next: StateId(next) },
                        AccelEntry::NonterminalPush { kind, start, next } => {
                            Accel::NonterminalPush { kind, start: StateId(start), next: StateId(next) }
                        }
                    })
                })
                .collect()
        }),
        accel_lower: rec.accel.as_ref().map(|ar| ar.lower).unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token;

    #[test]
    fn roundtrips_through_json() {
        let mut labels = LabelList::with_empty_sentinel();
        labels.add(token::NAME, None);
        let mut g = Grammar::new(labels, token::NT_OFFSET);
        g.add_dfa(Dfa {
            kind: token::NT_OFFSET,
            name: "start".to_string(),
            states: vec![State {
                arcs: vec![GArc { label: LabelId(1), target: StateId(1) }],
                accepting: false,
                accel: None,
                accel_lower: 0,
            }, State { accepting: true, ..Default::default() }],
            initial: StateId(0),
            first: None,
        });

        let tables = GrammarTables::from(&g);
        let json = serde_json::to_string(&tables).unwrap();
        let back: GrammarTables = serde_json::from_str(&json).unwrap();
        let g2 = back.to_grammar().unwrap();

        assert_eq!(g2.labels.len(), g.labels.len());
        assert_eq!(g2.dfas().len(), 1);
        assert_eq!(g2.dfas()[0].states.len(), 2);
        assert!(g2.dfas()[0].states[1].accepting);
    }

    #[test]
    fn to_grammar_rejects_an_out_of_range_arc_target() {
        let tables = GrammarTables {
            labels: vec![LabelRecord { kind: token::NAME, text: None }],
            dfas: vec![DfaRecord {
                kind: token::NT_OFFSET,
                name: "start".to_string(),
                states: vec![StateRecord {
                    arcs: vec![ArcRecord { label: 0, target: 7 }],
                    accepting: false,
                    accel: None,
                }],
                initial: 0,
                first: None,
            }],
            start: token::NT_OFFSET,
        };

        let err = tables.to_grammar().unwrap_err();
        assert!(matches!(err, crate::error::CoreError::StateOutOfRange(7)));
    }
}
