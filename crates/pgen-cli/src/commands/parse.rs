use std::path::Path;

use pgen_core::{token, Kind, ParseNode};
use pgen_runtime::RuntimeToken;
use serde::{Deserialize, Serialize};

use super::read_to_string_or_exit;

/// One entry of the input token stream. `kind` is either a fixed terminal
/// name (`"NAME"`, `"PLUS"`, ...) or a bare integer kind, so a fixture can
/// also target the raw kind numbers a generated grammar's nonterminals use.
#[derive(Debug, Deserialize)]
struct TokenJson {
    kind: String,
    #[serde(default)]
    lexeme: String,
    #[serde(default = "default_line")]
    line: u32,
}

fn default_line() -> u32 {
    1
}

fn resolve_kind(raw: &str) -> Option<Kind> {
    token::by_name(raw).or_else(|| raw.parse::<Kind>().ok())
}

/// JSON mirror of [`ParseNode`]. Kept local to the CLI rather than added as
/// a `Serialize` derive on `pgen_core::tree::ParseNode` itself, since that
/// type's shape is otherwise settled and shared with the meta-grammar
/// parser.
#[derive(Debug, Serialize)]
struct NodeJson {
    kind: Kind,
    #[serde(skip_serializing_if = "Option::is_none")]
    lexeme: Option<String>,
    line: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<NodeJson>,
}

impl From<&ParseNode> for NodeJson {
    fn from(node: &ParseNode) -> Self {
        NodeJson {
            kind: node.kind,
            lexeme: node.lexeme.clone(),
            line: node.line,
            children: node.children.iter().map(NodeJson::from).collect(),
        }
    }
}

pub fn run(grammar_path: &Path, tokens_path: &Path) {
    let source = read_to_string_or_exit(grammar_path);
    let output = pgen_compile::compile_grammar(&source).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });

    let tokens_json = read_to_string_or_exit(tokens_path);
    let entries: Vec<TokenJson> = serde_json::from_str(&tokens_json).unwrap_or_else(|e| {
        eprintln!("error: malformed token stream: {e}");
        std::process::exit(1);
    });

    let mut tokens = Vec::with_capacity(entries.len());
    for entry in &entries {
        let kind = resolve_kind(&entry.kind).unwrap_or_else(|| {
            eprintln!("error: unknown token kind '{}'", entry.kind);
            std::process::exit(1);
        });
        tokens.push(RuntimeToken { kind, text: entry.lexeme.clone(), line: entry.line });
    }

    let tree = pgen_runtime::parse(&output.grammar, &tokens).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });

    let json = NodeJson::from(&tree);
    println!("{}", serde_json::to_string_pretty(&json).expect("NodeJson always serializes"));
}
