//! # Introduction
//!
//! startlang parses programs in the Start/end teaching language with a
//! grammar-driven shift-reduce engine, builds a typed AST from the
//! reductions, and records every parse step so it can be replayed forward
//! and backward in a terminal UI built with [ratatui](https://docs.rs/ratatui).
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Parser (shift/reduce) → AstBuilder → AST | Diagnostics
//!                        ↓
//!                      Trace → TUI
//! ```
//!
//! 1. [`parser`]: tokenises the source, drives the 62-production grammar and
//!    turns each reduction into AST nodes; failures become structured
//!    [`parser::diagnostics::Diagnostic`]s.
//! 2. [`trace`]: optional bounded recorder of shifts, reductions and the
//!    final accept or halt.
//! 3. [`ui`]: ratatui-based trace viewer; not part of the stable library API.
//!
//! ```
//! let program = startlang::parser::parse_source("Start var x: int; x := 1 + 2; end").unwrap();
//! assert_eq!(program.statements.len(), 2);
//! ```

pub mod parser;
pub mod trace;
pub mod ui;
