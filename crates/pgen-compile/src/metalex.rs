//! Lexer for meta-grammar source (the EBNF-ish grammar notation).
//!
//! Grounded on `plotnik-lib::parser::lexer` (a `logos`-derived token enum,
//! a manual loop pulling tokens off the lexer, assembling a flat `Vec<Token>`)
//! — adapted to track source line numbers instead of `rowan` text ranges,
//! matching the `line: u32` field the parse-node model expects.

use logos::Logos;
use pgen_core::token;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r]+")]
#[logos(skip r"#[^\n]*")]
pub enum MetaTok {
    #[regex(r"[A-Za-z_][A-Za-z_0-9]*")]
    Name,
    #[regex(r#"'[^'\n]*'|"[^"\n]*""#)]
    Str,
    #[token(":")]
    Colon,
    #[token("|")]
    Bar,
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
    #[token("(")]
    LPar,
    #[token(")")]
    RPar,
    #[token("[")]
    LSqb,
    #[token("]")]
    RSqb,
    #[token("\n")]
    Newline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: token::Kind,
    pub text: String,
    pub line: u32,
}

/// Terminal kinds specific to meta-grammar source; these never collide with
/// [`pgen_core::token`]'s fixed registry because that registry tops out at
/// `N_TOKENS` and these are assigned just below `NT_OFFSET`.
pub const META_NAME: token::Kind = token::N_TOKENS;
pub const META_STRING: token::Kind = token::N_TOKENS + 1;
pub const META_COLON: token::Kind = token::N_TOKENS + 2;
pub const META_BAR: token::Kind = token::N_TOKENS + 3;
pub const META_STAR: token::Kind = token::N_TOKENS + 4;
pub const META_PLUS: token::Kind = token::N_TOKENS + 5;
pub const META_LPAR: token::Kind = token::N_TOKENS + 6;
pub const META_RPAR: token::Kind = token::N_TOKENS + 7;
pub const META_LSQB: token::Kind = token::N_TOKENS + 8;
pub const META_RSQB: token::Kind = token::N_TOKENS + 9;
pub const META_NEWLINE: token::Kind = token::N_TOKENS + 10;

fn kind_of(tok: MetaTok) -> token::Kind {
    match tok {
        MetaTok::Name => META_NAME,
        MetaTok::Str => META_STRING,
        MetaTok::Colon => META_COLON,
        MetaTok::Bar => META_BAR,
        MetaTok::Star => META_STAR,
        MetaTok::Plus => META_PLUS,
        MetaTok::LPar => META_LPAR,
        MetaTok::RPar => META_RPAR,
        MetaTok::LSqb => META_LSQB,
        MetaTok::RSqb => META_RSQB,
        MetaTok::Newline => META_NEWLINE,
    }
}

/// Lexes `source` into a flat token list, appending a trailing `ENDMARKER`.
/// Unrecognized bytes produce an `ERRORTOKEN` rather than aborting the scan,
/// matching the original tokenizer's tolerance for feeding bad input through
/// to the parser as a syntax error instead of a lex-time panic.
pub fn lex(source: &str) -> Vec<Token> {
    let mut line = 1u32;
    let mut out = Vec::new();
    let mut lexer = MetaTok::lexer(source);
    while let Some(result) = lexer.next() {
        let text = lexer.slice();
        match result {
            Ok(tok) => {
                out.push(Token { kind: kind_of(tok), text: text.to_string(), line });
                if tok == MetaTok::Newline {
                    line += 1;
                }
            }
            Err(()) => {
                out.push(Token { kind: token::ERRORTOKEN, text: text.to_string(), line });
            }
        }
    }
    out.push(Token { kind: token::ENDMARKER, text: String::new(), line });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_simple_rule() {
        let toks = lex("expr: term ('+' term)*\n");
        let kinds: Vec<_> = toks.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                META_NAME, META_COLON, META_NAME, META_LPAR, META_STRING, META_NAME, META_RPAR,
                META_STAR, META_NEWLINE, token::ENDMARKER,
            ]
        );
    }

    #[test]
    fn tracks_line_numbers_across_newlines() {
        let toks = lex("a: b\nc: d\n");
        let c_tok = toks.iter().find(|t| t.text == "c").unwrap();
        assert_eq!(c_tok.line, 2);
    }

    #[test]
    fn skips_comments() {
        let toks = lex("a: b # trailing comment\n");
        assert!(toks.iter().all(|t| !t.text.contains('#')));
    }
}
