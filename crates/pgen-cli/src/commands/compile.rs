use std::path::Path;

use pgen_core::GrammarTables;

use super::read_to_string_or_exit;

pub fn run(grammar_path: &Path) {
    let source = read_to_string_or_exit(grammar_path);

    let output = pgen_compile::compile_grammar(&source).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });

    for diagnostic in output.diagnostics.iter() {
        eprintln!("{}: {}", diagnostic.severity(), diagnostic);
    }
    if output.diagnostics.has_errors() {
        std::process::exit(1);
    }

    let tables = GrammarTables::from(&output.grammar);
    println!("{}", serde_json::to_string_pretty(&tables).expect("GrammarTables always serializes"));
}
