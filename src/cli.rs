use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use startlang::parser::parse::DEFAULT_MAX_DEPTH;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Source file to parse (default: stdin)
    pub file: Option<PathBuf>,

    /// What to print on success
    #[arg(short, long, value_enum, default_value_t = Emit::Ast)]
    pub emit: Emit,

    /// JSON production table to use instead of the built-in grammar
    #[arg(short, long, value_name = "FILE")]
    pub grammar: Option<PathBuf>,

    /// Maximum expression and statement nesting
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Step through the parse in the terminal viewer
    #[arg(long)]
    pub tui: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Emit {
    /// Indented AST outline
    Ast,
    /// AST as JSON
    Json,
    /// Token list
    Tokens,
    /// Shift/reduce steps
    Trace,
    /// Production table as JSON
    Grammar,
}
