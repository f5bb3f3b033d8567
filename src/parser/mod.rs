//! Start/end source parser
//!
//! This module transforms Start/end source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`grammar`]: Symbols, the 62 productions, FIRST sets, table loading
//! - [`parse`]: The parse engine (tokens → shifts and reductions)
//! - [`builder`]: Semantic actions (reductions → AST nodes)
//! - [`diagnostics`]: Structured token and parse errors
//! - [`ast`]: AST node definitions
//!
//! # Language
//!
//! A program is `Start <statements> end`. Statements are `var` declarations,
//! `:=` assignments, `if`/`then`/`else`/`end`, `while`/`do`/`end`,
//! `function name(params): type begin ... end`, calls terminated by `;` and
//! `return`. Expressions use `or`, `and`, `=`, `<>`, `<`, `>`, `+`, `-`, `*`,
//! `/` and the prefix operators `not`, `+`, `-`.
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent that drives an explicit shift-reduce
//! stack; see [`parse`]. No external parser generator dependencies.

pub mod ast;
pub mod builder;
mod declarations;
pub mod diagnostics;
mod expressions;
pub mod grammar;
pub mod lexer;
pub mod parse;
mod statements;

use ast::Program;
use diagnostics::Diagnostic;
use grammar::{Grammar, GrammarLoadError};
use parse::Parser;
use thiserror::Error;

/// Failure of [`parse_source`]
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Grammar(#[from] GrammarLoadError),
    #[error("parsing failed with {} diagnostic(s)", .0.len())]
    Syntax(Vec<Diagnostic>),
}

/// Parse source text with the built-in grammar
pub fn parse_source(source: &str) -> Result<Program, Error> {
    let grammar = Grammar::standard()?;
    Parser::from_source(grammar, source)
        .parse()
        .map_err(Error::Syntax)
}
