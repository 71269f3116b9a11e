use std::path::Path;

use pgen_peephole::{Const, LineEntry};
use serde::{Deserialize, Serialize};

use super::read_to_string_or_exit;

/// A wordcode unit plus constants table and line-number table, the unit
/// this crate's optimizer operates on end-to-end.
#[derive(Debug, Deserialize, Serialize)]
struct BytecodeFixture {
    code: Vec<u16>,
    #[serde(default)]
    consts: Vec<Const>,
    #[serde(default)]
    lines: Vec<LineEntry>,
}

pub fn run(bytecode_path: &Path) {
    let raw = read_to_string_or_exit(bytecode_path);
    let fixture: BytecodeFixture = serde_json::from_str(&raw).unwrap_or_else(|e| {
        eprintln!("error: malformed bytecode fixture: {e}");
        std::process::exit(1);
    });

    let mut consts = fixture.consts;
    let result = pgen_peephole::optimize(&fixture.code, &mut consts, &fixture.lines).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });

    let out = BytecodeFixture { code: result.code, consts, lines: result.lines };
    println!("{}", serde_json::to_string_pretty(&out).expect("BytecodeFixture always serializes"));
}
