//! Fixed terminal-kind registry.
//!
//! The tokenizer that produces `(kind, lexeme, line)` triples is an external
//! collaborator — this module only fixes the *numbering*
//! of terminal kinds below [`NT_OFFSET`], the contract both the tokenizer and the
//! generated grammar tables must agree on.

/// A label or node kind. Terminals occupy `0..NT_OFFSET`; nonterminals occupy
/// `NT_OFFSET..`.
pub type Kind = i32;

/// First nonterminal kind. Terminal and nonterminal kinds never collide.
pub const NT_OFFSET: Kind = 256;

#[inline]
pub fn is_terminal(kind: Kind) -> bool {
    kind < NT_OFFSET
}

#[inline]
pub fn is_nonterminal(kind: Kind) -> bool {
    kind >= NT_OFFSET
}

macro_rules! token_kinds {
    ($($name:ident = $value:expr),+ $(,)?) => {
        $(pub const $name: Kind = $value;)+

        /// Display names for terminal kinds, indexed by kind value.
        pub const TOKEN_NAMES: &[&str] = &[$(stringify!($name)),+];
    };
}

token_kinds! {
    ENDMARKER = 0,
    NAME = 1,
    NUMBER = 2,
    STRING = 3,
    NEWLINE = 4,
    INDENT = 5,
    DEDENT = 6,
    LPAR = 7,
    RPAR = 8,
    LSQB = 9,
    RSQB = 10,
    COLON = 11,
    COMMA = 12,
    SEMI = 13,
    PLUS = 14,
    MINUS = 15,
    STAR = 16,
    SLASH = 17,
    VBAR = 18,
    AMPER = 19,
    LESS = 20,
    GREATER = 21,
    EQUAL = 22,
    DOT = 23,
    PERCENT = 24,
    BACKQUOTE = 25,
    LBRACE = 26,
    RBRACE = 27,
    EQEQUAL = 28,
    NOTEQUAL = 29,
    LESSEQUAL = 30,
    GREATEREQUAL = 31,
    TILDE = 32,
    CIRCUMFLEX = 33,
    LEFTSHIFT = 34,
    RIGHTSHIFT = 35,
    DOUBLESTAR = 36,
    OP = 37,
    ERRORTOKEN = 38,
}

/// Number of fixed terminal kinds (`token.h`'s `N_TOKENS`).
pub const N_TOKENS: Kind = 39;

/// Look up a terminal kind by its display name (`NAME`, `NEWLINE`, ...), the
/// way `translabel` resolves a bare grammar identifier against `tok_name`.
pub fn by_name(name: &str) -> Option<Kind> {
    TOKEN_NAMES.iter().position(|n| *n == name).map(|i| i as Kind)
}

/// Map a single punctuation character to its terminal kind, the way
/// `PyToken_OneChar` does for a one-character `STRING` label.
pub fn one_char(c: char) -> Option<Kind> {
    Some(match c {
        '(' => LPAR,
        ')' => RPAR,
        '[' => LSQB,
        ']' => RSQB,
        ':' => COLON,
        ',' => COMMA,
        ';' => SEMI,
        '+' => PLUS,
        '-' => MINUS,
        '*' => STAR,
        '/' => SLASH,
        '|' => VBAR,
        '&' => AMPER,
        '<' => LESS,
        '>' => GREATER,
        '=' => EQUAL,
        '.' => DOT,
        '%' => PERCENT,
        '`' => BACKQUOTE,
        '{' => LBRACE,
        '}' => RBRACE,
        '~' => TILDE,
        '^' => CIRCUMFLEX,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nt_offset_separates_terminal_and_nonterminal() {
        assert!(is_terminal(NAME));
        assert!(is_terminal(N_TOKENS - 1));
        assert!(is_nonterminal(NT_OFFSET));
        assert!(!is_terminal(NT_OFFSET));
    }

    #[test]
    fn by_name_roundtrips_token_names() {
        assert_eq!(by_name("NAME"), Some(NAME));
        assert_eq!(by_name("ENDMARKER"), Some(ENDMARKER));
        assert_eq!(by_name("NOT_A_TOKEN"), None);
    }

    #[test]
    fn one_char_covers_meta_grammar_punctuation() {
        assert_eq!(one_char('('), Some(LPAR));
        assert_eq!(one_char(')'), Some(RPAR));
        assert_eq!(one_char('['), Some(LSQB));
        assert_eq!(one_char(']'), Some(RSQB));
        assert_eq!(one_char(':'), Some(COLON));
        assert_eq!(one_char('|'), Some(VBAR));
        assert_eq!(one_char('*'), Some(STAR));
        assert_eq!(one_char('+'), Some(PLUS));
    }
}
