//! Concrete parse tree produced by both the meta-grammar parser
//! (`pgen-compile::metaparse`) and the generated-grammar runtime parser
//! (`pgen-runtime::engine`) — the two share one node shape, per the parse
//! node's
//! "the system is self-descriptive" note.
//!
//! Grounded on `Parser/node.c`'s `PyNode_AddChild`: child-vector capacity is
//! rounded up to a multiple of 3 (`XXXROUNDUP`) rather than grown one at a
//! time, to cut down on reallocations while a rule's children are appended
//! one token/reduction at a time.

use crate::token::Kind;

const ROUNDUP_FACTOR: usize = 3;

fn roundup(n: usize) -> usize {
    if n <= 1 {
        n
    } else {
        n.div_ceil(ROUNDUP_FACTOR) * ROUNDUP_FACTOR
    }
}

/// One node of a concrete parse tree. Terminal nodes (`kind < NT_OFFSET`)
/// carry the token's lexeme and no children; nonterminal nodes carry
/// children and no lexeme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNode {
    pub kind: Kind,
    pub lexeme: Option<String>,
    pub line: u32,
    pub children: Vec<ParseNode>,
}

impl ParseNode {
    pub fn terminal(kind: Kind, lexeme: String, line: u32) -> Self {
        ParseNode { kind, lexeme: Some(lexeme), line, children: Vec::new() }
    }

    pub fn nonterminal(kind: Kind, line: u32) -> Self {
        ParseNode { kind, lexeme: None, line, children: Vec::new() }
    }

    /// Appends a child, reserving capacity in rounded-up steps (1, 3, 6, 9, ...)
    /// instead of doubling or growing exactly-by-one.
    pub fn add_child(&mut self, child: ParseNode) {
        if self.children.len() == self.children.capacity() {
            let wanted = roundup(self.children.len() + 1);
            self.children.reserve_exact(wanted - self.children.len());
        }
        self.children.push(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundup_matches_xxxroundup_steps() {
        assert_eq!(roundup(0), 0);
        assert_eq!(roundup(1), 1);
        assert_eq!(roundup(2), 3);
        assert_eq!(roundup(3), 3);
        assert_eq!(roundup(4), 6);
        assert_eq!(roundup(9), 9);
        assert_eq!(roundup(10), 12);
    }

    #[test]
    fn add_child_preserves_insertion_order() {
        let mut root = ParseNode::nonterminal(300, 1);
        for i in 0..7 {
            root.add_child(ParseNode::terminal(1, format!("t{i}"), 1));
        }
        assert_eq!(root.children.len(), 7);
        assert_eq!(root.children[3].lexeme.as_deref(), Some("t3"));
    }

    #[test]
    fn terminal_has_no_children_nonterminal_has_no_lexeme() {
        let t = ParseNode::terminal(1, "x".to_string(), 1);
        assert!(t.children.is_empty());
        let nt = ParseNode::nonterminal(300, 1);
        assert!(nt.lexeme.is_none());
    }
}
