//! Hand-written recursive-descent parser for meta-grammar source, building a
//! [`ParseNode`] meta-tree of the exact shape `pgen-runtime::engine` would
//! itself produce for the same grammar.
//!
//! `Parser/metagrammar.c` is the same grammar, pre-baked as checked-in DFA
//! tables (`dfas[6]` for `MSTART`/`RULE`/`RHS`/`ALT`/`ITEM`/`ATOM`) produced
//! by bootstrapping pgen on itself once; we do not carry that bootstrap (see
//! SPEC_FULL.md §4.3) and instead parse the grammar by hand, styled after
//! `plotnik-compiler::parser::grammar::atoms`'s `expect`/`bump`/`currently_is`
//! method shapes.

use pgen_core::token::{self, Kind};
use pgen_core::ParseNode;

use crate::error::CompileError;
use crate::metalex::{self, Token};

pub const MSTART: Kind = token::NT_OFFSET;
pub const RULE: Kind = token::NT_OFFSET + 1;
pub const RHS: Kind = token::NT_OFFSET + 2;
pub const ALT: Kind = token::NT_OFFSET + 3;
pub const ITEM: Kind = token::NT_OFFSET + 4;
pub const ATOM: Kind = token::NT_OFFSET + 5;

pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn currently_is(&self, kind: Kind) -> bool {
        self.peek().kind == kind
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: Kind, what: &str) -> Result<Token, CompileError> {
        if self.currently_is(kind) {
            Ok(self.bump())
        } else {
            let found = self.peek();
            Err(CompileError::UnexpectedToken {
                line: found.line,
                expected: what.to_string(),
                found: found.text.clone(),
            })
        }
    }

    /// `MSTART: (RULE NEWLINE)* ENDMARKER`
    pub fn parse_mstart(&mut self) -> Result<ParseNode, CompileError> {
        let mut node = ParseNode::nonterminal(MSTART, self.peek().line);
        while !self.currently_is(token::ENDMARKER) {
            node.add_child(self.parse_rule()?);
            let nl = self.expect(metalex::META_NEWLINE, "newline")?;
            node.add_child(ParseNode::terminal(token::NEWLINE, nl.text, nl.line));
        }
        let end = self.expect(token::ENDMARKER, "end of input")?;
        node.add_child(ParseNode::terminal(token::ENDMARKER, end.text, end.line));
        Ok(node)
    }

    /// `RULE: NAME ':' RHS`
    fn parse_rule(&mut self) -> Result<ParseNode, CompileError> {
        let mut node = ParseNode::nonterminal(RULE, self.peek().line);
        let name = self.expect(metalex::META_NAME, "rule name")?;
        node.add_child(ParseNode::terminal(token::NAME, name.text, name.line));
        let colon = self.expect(metalex::META_COLON, "':'")?;
        node.add_child(ParseNode::terminal(token::COLON, colon.text, colon.line));
        node.add_child(self.parse_rhs()?);
        Ok(node)
    }

    /// `RHS: ALT ('|' ALT)*`
    fn parse_rhs(&mut self) -> Result<ParseNode, CompileError> {
        let mut node = ParseNode::nonterminal(RHS, self.peek().line);
        node.add_child(self.parse_alt()?);
        while self.currently_is(metalex::META_BAR) {
            let bar = self.bump();
            node.add_child(ParseNode::terminal(token::VBAR, bar.text, bar.line));
            node.add_child(self.parse_alt()?);
        }
        Ok(node)
    }

    /// `ALT: ITEM+`
    fn parse_alt(&mut self) -> Result<ParseNode, CompileError> {
        let mut node = ParseNode::nonterminal(ALT, self.peek().line);
        node.add_child(self.parse_item()?);
        while self.starts_item() {
            node.add_child(self.parse_item()?);
        }
        Ok(node)
    }

    fn starts_item(&self) -> bool {
        let k = self.peek().kind;
        k == metalex::META_LSQB || k == metalex::META_NAME || k == metalex::META_STRING || k == metalex::META_LPAR
    }

    /// `ITEM: '[' RHS ']' | ATOM ('*' | '+')?`
    fn parse_item(&mut self) -> Result<ParseNode, CompileError> {
        let mut node = ParseNode::nonterminal(ITEM, self.peek().line);
        if self.currently_is(metalex::META_LSQB) {
            let lsqb = self.bump();
            node.add_child(ParseNode::terminal(token::LSQB, lsqb.text, lsqb.line));
            node.add_child(self.parse_rhs()?);
            let rsqb = self.expect(metalex::META_RSQB, "']'")?;
            node.add_child(ParseNode::terminal(token::RSQB, rsqb.text, rsqb.line));
        } else {
            node.add_child(self.parse_atom()?);
            if self.currently_is(metalex::META_STAR) {
                let star = self.bump();
                node.add_child(ParseNode::terminal(token::STAR, star.text, star.line));
            } else if self.currently_is(metalex::META_PLUS) {
                let plus = self.bump();
                node.add_child(ParseNode::terminal(token::PLUS, plus.text, plus.line));
            }
        }
        Ok(node)
    }

    /// `ATOM: NAME | STRING | '(' RHS ')'`
    fn parse_atom(&mut self) -> Result<ParseNode, CompileError> {
        let mut node = ParseNode::nonterminal(ATOM, self.peek().line);
        if self.currently_is(metalex::META_NAME) {
            let name = self.bump();
            node.add_child(ParseNode::terminal(token::NAME, name.text, name.line));
        } else if self.currently_is(metalex::META_STRING) {
            let s = self.bump();
            node.add_child(ParseNode::terminal(token::STRING, s.text, s.line));
        } else {
            let lpar = self.expect(metalex::META_LPAR, "NAME, STRING, or '('")?;
            node.add_child(ParseNode::terminal(token::LPAR, lpar.text, lpar.line));
            node.add_child(self.parse_rhs()?);
            let rpar = self.expect(metalex::META_RPAR, "')'")?;
            node.add_child(ParseNode::terminal(token::RPAR, rpar.text, rpar.line));
        }
        Ok(node)
    }
}

/// Lexes and parses meta-grammar source into an `MSTART` meta-tree.
pub fn parse(source: &str) -> Result<ParseNode, CompileError> {
    let tokens = metalex::lex(source);
    Parser::new(&tokens).parse_mstart()
}
