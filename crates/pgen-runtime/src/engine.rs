//! The pushdown automaton: drives a generated [`Grammar`] over a token
//! stream, producing a concrete [`ParseNode`] tree.
//!
//! Grounded directly on `Parser/parser.c`: `s_push`/`s_pop` (bounded stack),
//! `shift`/`push` (token consumption vs. nonterminal entry), `classify`
//! (keyword-`NAME`-then-plain-kind label lookup), and `addtoken`'s `for(;;)`
//! step loop (accelerator dispatch, accept-drain, syntax-error fallthrough).
//! Expressed here as a small state machine
//! for instead of the original's `goto`-free-but-still-imperative loop, and
//! built on owned per-frame nodes (moved into the parent on reduction)
//! rather than raw pointers into a growing arena — see DESIGN.md for why
//! that avoids the original's reliance on node-array addresses staying
//! stable across reallocation.

use pgen_core::grammar::{Accel, StateId};
use pgen_core::token::Kind;
use pgen_core::{Grammar, LabelId, ParseNode};

use crate::error::ParseError;

/// Bounded pushdown-stack depth, matching the original's fixed-size stack
/// array (see SPEC_FULL.md §9, Open Question 4).
pub const MAX_STACK: usize = 100;

/// One `(kind, lexeme, line)` triple handed in by the external tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeToken {
    pub kind: Kind,
    pub text: String,
    pub line: u32,
}

struct Frame {
    dfa_kind: Kind,
    state: StateId,
    node: ParseNode,
}

/// Outcome of feeding one token to the automaton.
#[derive(Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The token was consumed (possibly after internal nonterminal pushes).
    Consumed,
    /// The grammar's start symbol reduced completely; parsing is finished.
    Done,
}

pub struct Parser<'g> {
    grammar: &'g Grammar,
    stack: Vec<Frame>,
}

impl<'g> Parser<'g> {
    pub fn new(grammar: &'g Grammar, start_line: u32) -> Result<Self, ParseError> {
        let start_dfa = grammar.find_dfa(grammar.start).ok_or(ParseError::MissingStartDfa(grammar.start))?;
        let frame = Frame {
            dfa_kind: grammar.start,
            state: start_dfa.initial,
            node: ParseNode::nonterminal(grammar.start, start_line),
        };
        Ok(Parser { grammar, stack: vec![frame] })
    }

    /// `classify`: finds the label a token matches — a keyword `NAME` first
    /// (e.g. the label `(NAME, Some("if"))`), then the token's plain kind
    /// (`(kind, None)`) — mirroring the original's two-pass linear scan.
    fn classify(&self, token: &RuntimeToken) -> Option<LabelId> {
        if token.kind == pgen_core::token::NAME {
            if let Some(id) = self.grammar.labels.find(pgen_core::token::NAME, Some(token.text.as_str())) {
                return Some(id);
            }
        }
        self.grammar.labels.find(token.kind, None)
    }

    /// `addtoken`'s step loop for a single incoming token: dispatches
    /// through any number of nonterminal pushes and accept-drains before
    /// either consuming the token (`Consumed`) or completing the parse
    /// (`Done`).
    pub fn step(&mut self, token: &RuntimeToken) -> Result<StepOutcome, ParseError> {
        loop {
            let label = self.classify(token).ok_or_else(|| ParseError::Syntax {
                line: token.line,
                kind: token.kind,
                text: token.text.clone(),
            })?;

            let top = self.stack.last().expect("stack is never empty while parsing");
            let dfa = self.grammar.find_dfa(top.dfa_kind).expect("frame dfa_kind always names a live dfa");
            let state = dfa.state(top.state);

            let accel_hit = state.accel.as_ref().and_then(|slots| {
                let lower = state.accel_lower;
                if label.0 < lower {
                    return None;
                }
                let slot = (label.0 - lower) as usize;
                slots.get(slot).copied().flatten()
            });

            match accel_hit {
                Some(Accel::NonterminalPush { kind, start, next }) => {
                    if self.stack.len() >= MAX_STACK {
                        return Err(ParseError::StackOverflow(MAX_STACK));
                    }
                    self.stack.last_mut().expect("stack is never empty while parsing").state = next;
                    self.stack.push(Frame { dfa_kind: kind, state: start, node: ParseNode::nonterminal(kind, token.line) });
                    continue;
                }
                Some(Accel::TerminalShift { next }) => {
                    self.shift(token, next);
                    if self.drain_accepting_chain() {
                        return Ok(StepOutcome::Done);
                    }
                    return Ok(StepOutcome::Consumed);
                }
                None => {
                    if state.accepting {
                        self.reduce_top();
                        continue;
                    }
                    return Err(ParseError::Syntax { line: token.line, kind: token.kind, text: token.text.clone() });
                }
            }
        }
    }

    /// `shift`: appends the token as a terminal child and advances the
    /// current frame's state.
    fn shift(&mut self, token: &RuntimeToken, next: StateId) {
        let top = self.stack.last_mut().expect("stack is never empty while parsing");
        top.node.add_child(ParseNode::terminal(token.kind, token.text.clone(), token.line));
        top.state = next;
    }

    /// Pops the top frame, merging its node into the new top's children.
    /// Used both by the "direct pop" accept-drain after a shift and by the
    /// "else if accepting" retry-without-consuming path.
    fn reduce_top(&mut self) {
        let finished = self.stack.pop().expect("reduce_top only called with a non-empty stack");
        if let Some(parent) = self.stack.last_mut() {
            parent.node.add_child(finished.node);
        } else {
            self.stack.push(finished);
        }
    }

    /// "Direct pop": `while (s->s_accept && s->s_narcs == 1) pop();`. The
    /// original counts the accept-encoding self-arc as one of `s_narcs`, so
    /// "exactly one arc" there means "no *real* outgoing transitions besides
    /// acceptance" — since this grammar never materializes that self-arc
    /// (see `minimize`/`accelerate`), the direct translation is "no real arcs
    /// at all". Returns `true` if the pop chain emptied the stack (parse
    /// complete).
    fn drain_accepting_chain(&mut self) -> bool {
        loop {
            let top = self.stack.last().expect("stack is never empty while parsing");
            let dfa = self.grammar.find_dfa(top.dfa_kind).expect("frame dfa_kind always names a live dfa");
            let state = dfa.state(top.state);
            if !(state.accepting && state.arcs.is_empty()) {
                return false;
            }
            let finished = self.stack.pop().unwrap();
            match self.stack.last_mut() {
                Some(parent) => parent.node.add_child(finished.node),
                None => {
                    self.stack.push(finished);
                    return true;
                }
            }
        }
    }

    /// Finishes the parse: the caller is responsible for having fed an
    /// `ENDMARKER` token that drives the start symbol to completion.
    pub fn into_tree(mut self) -> Result<ParseNode, ParseError> {
        if self.stack.len() == 1 {
            let top = &self.stack[0];
            let dfa = self.grammar.find_dfa(top.dfa_kind).expect("frame dfa_kind always names a live dfa");
            if dfa.state(top.state).accepting {
                return Ok(self.stack.pop().unwrap().node);
            }
        }
        Err(ParseError::Syntax { line: 0, kind: top_kind(&self), text: "<end of input>".to_string() })
    }
}

fn top_kind(parser: &Parser<'_>) -> Kind {
    parser.stack.last().map(|f| f.dfa_kind).unwrap_or(0)
}

/// Drives a whole token stream through a fresh [`Parser`], returning the
/// completed tree or the first error encountered.
pub fn parse(grammar: &Grammar, tokens: &[RuntimeToken]) -> Result<ParseNode, ParseError> {
    let first_line = tokens.first().map(|t| t.line).unwrap_or(1);
    let mut parser = Parser::new(grammar, first_line)?;
    for token in tokens {
        if parser.step(token)? == StepOutcome::Done {
            return parser.into_tree();
        }
    }
    parser.into_tree()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgen_compile::compile_grammar;

    fn toks(pairs: &[(Kind, &str)]) -> Vec<RuntimeToken> {
        pairs.iter().enumerate().map(|(i, (k, t))| RuntimeToken { kind: *k, text: t.to_string(), line: i as u32 + 1 }).collect()
    }

    #[test]
    fn parses_single_terminal_rule() {
        // `'a'` is a single alphabetic character, so `label_translate`
        // resolves it to a *keyword* label `(NAME, Some("a"))`, not a plain
        // `STRING` terminal — the token fed in must carry kind `NAME` for
        // `classify`'s keyword lookup to find it.
        let out = compile_grammar("start: 'a'\n").unwrap();
        let tree = parse(&out.grammar, &toks(&[(pgen_core::token::NAME, "a")])).unwrap();
        assert_eq!(tree.kind, out.grammar.start);
        assert_eq!(tree.children.len(), 1);
    }

    #[test]
    fn parses_nonterminal_push_and_reduce() {
        let out = compile_grammar("start: mid\nmid: 'x'\n").unwrap();
        let tree = parse(&out.grammar, &toks(&[(pgen_core::token::NAME, "x")])).unwrap();
        assert_eq!(tree.children.len(), 1);
        assert_ne!(tree.children[0].kind, pgen_core::token::STRING);
    }

    /// A nonterminal push driven through a *bare* terminal (not a keyword)
    /// in the pushed rule's FIRST set — the case the accelerator has to get
    /// right by spreading the push across `mid`'s FIRST set rather than
    /// keying it on `mid`'s own nonterminal label.
    #[test]
    fn parses_nonterminal_push_through_first_set_terminal() {
        let out = compile_grammar("start: mid\nmid: NAME\n").unwrap();
        let tree = parse(&out.grammar, &toks(&[(pgen_core::token::NAME, "x")])).unwrap();
        assert_eq!(tree.kind, out.grammar.start);
        assert_eq!(tree.children.len(), 1);
        assert_ne!(tree.children[0].kind, pgen_core::token::NAME);
    }

    #[test]
    fn rejects_unmatched_token() {
        let out = compile_grammar("start: 'a'\n").unwrap();
        let err = parse(&out.grammar, &toks(&[(pgen_core::token::NAME, "b")])).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn parses_repetition_via_star() {
        let out = compile_grammar("start: 'a'*\n").unwrap();
        let tree = parse(
            &out.grammar,
            &toks(&[(pgen_core::token::NAME, "a"), (pgen_core::token::NAME, "a"), (pgen_core::token::NAME, "a")]),
        )
        .unwrap();
        assert_eq!(tree.children.len(), 3);
    }

    #[test]
    fn parses_the_pgen_c_worked_example() {
        let source = "expr: term (('+' | '-') term)*\nterm: NUMBER | '(' expr ')'\n";
        let out = compile_grammar(source).unwrap();
        let stream = toks(&[
            (pgen_core::token::NUMBER, "1"),
            (pgen_core::token::PLUS, "+"),
            (pgen_core::token::LPAR, "("),
            (pgen_core::token::NUMBER, "2"),
            (pgen_core::token::MINUS, "-"),
            (pgen_core::token::NUMBER, "3"),
            (pgen_core::token::RPAR, ")"),
        ]);
        let tree = parse(&out.grammar, &stream).unwrap();
        assert_eq!(tree.kind, out.grammar.start);
    }

    /// After a nonterminal reduces, the parent frame must resume at the
    /// state *past* that nonterminal, not loop back to expect another one —
    /// a regression test for the nonterminal-push resume state
    /// (`Accel::NonterminalPush::next`).
    #[test]
    fn parent_frame_resumes_past_a_reduced_nonterminal() {
        let out = compile_grammar("expr: term ('+' term)*\nterm: NAME\n").unwrap();
        let stream = toks(&[
            (pgen_core::token::NAME, "x"),
            (pgen_core::token::PLUS, "+"),
            (pgen_core::token::NAME, "y"),
            (pgen_core::token::PLUS, "+"),
            (pgen_core::token::NAME, "z"),
        ]);
        let tree = parse(&out.grammar, &stream).unwrap();
        assert_eq!(tree.kind, out.grammar.start);
        assert_eq!(tree.children.len(), 5);
    }
}
