mod cli;
mod commands;

use clap::Parser as _;
use cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Compile { grammar } => commands::compile::run(&grammar),
        Command::Parse { grammar, tokens } => commands::parse::run(&grammar, &tokens),
        Command::Optimize { bytecode } => commands::optimize::run(&bytecode),
    }
}
