//! Argument parsing. Three subcommands, one positional path each — small
//! enough that clap's derive API covers it directly, unlike the builder +
//! `Params`/`from_matches` split the richer multi-flag CLIs in this family
//! use.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "pgen", about = "PGEN grammar compiler, pushdown parser, and peephole optimizer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compile a grammar into DFA tables and print them as JSON.
    Compile { grammar: PathBuf },
    /// Parse a token stream against a compiled grammar and print the tree.
    Parse { grammar: PathBuf, tokens: PathBuf },
    /// Run the peephole optimizer over a wordcode fixture and print the result.
    Optimize { bytecode: PathBuf },
}
