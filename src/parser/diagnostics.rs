//! Structured parse diagnostics
//!
//! The parser records [`Diagnostic`]s into a [`Diagnostics`] reporter owned by
//! the parse; presentation is left to the caller ([`Diagnostic::render`] for
//! a compiler-style snippet, `Display` for a one-line message).

use super::ast::SourceLocation;
use super::grammar::Symbol;
use super::lexer::Token;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    /// The lexer could not classify a token, or a token is malformed
    TokenError,
    /// No valid move for the lookahead token
    ParseError,
    /// Nesting exceeded the configured depth
    NestingLimit,
    /// The AST builder rejected a reduction
    Internal,
}

impl DiagnosticKind {
    fn title(self) -> &'static str {
        match self {
            DiagnosticKind::TokenError => "Token error",
            DiagnosticKind::ParseError => "Parse error",
            DiagnosticKind::NestingLimit => "Nesting limit",
            DiagnosticKind::Internal => "Internal error",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::TokenError => "token",
            DiagnosticKind::ParseError => "syntax",
            DiagnosticKind::NestingLimit => "nesting",
            DiagnosticKind::Internal => "internal",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// The offending token, when there is one
    pub token: Option<Token>,
    pub location: SourceLocation,
    /// Terminals that would have been accepted, sorted by id
    pub expected: Vec<Symbol>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            message: message.into(),
            token: None,
            location,
            expected: Vec::new(),
        }
    }

    pub fn with_token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }

    pub fn with_expected(mut self, mut expected: Vec<Symbol>) -> Self {
        expected.sort();
        expected.dedup();
        self.expected = expected;
        self
    }

    /// Render a compiler-style snippet:
    ///
    /// ```text
    /// error[syntax]: unexpected identifier 'x'
    ///   --> demo.start:1:15
    ///    |
    ///  1 | Start if true x := 1; end end
    ///    |               ^
    ///    = expected one of: then, ...
    /// ```
    pub fn render(&self, source: &str, file_name: &str) -> String {
        let SourceLocation { line, column } = self.location;
        let src_line = source.lines().nth(line.saturating_sub(1)).unwrap_or("");
        let gutter = line.to_string().len().max(2);
        let blank = " ".repeat(gutter);

        let mut out = format!(
            "error[{}]: {}\n{blank}--> {}:{}:{}\n{blank} |\n{:>gutter$} | {}\n{blank} | {}^",
            self.kind.code(),
            self.message,
            file_name,
            line,
            column,
            line,
            src_line,
            caret_indent(src_line, column),
        );
        if !self.expected.is_empty() {
            out.push_str(&format!("\n{blank} = expected one of: {}", self.expected_list()));
        }
        out
    }

    fn expected_list(&self) -> String {
        self.expected
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Whitespace up to `column`, keeping the source line's tabs so the caret
/// lines up under any tab width
fn caret_indent(src_line: &str, column: usize) -> String {
    src_line
        .chars()
        .take(column.saturating_sub(1))
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .collect()
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at line {}, column {}: {}",
            self.kind, self.location.line, self.location.column, self.message
        )?;
        if !self.expected.is_empty() {
            write!(f, "; expected one of: {}", self.expected_list())?;
        }
        Ok(())
    }
}

/// Ordered collection of the diagnostics raised by one parse
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Take every recorded diagnostic, leaving the reporter empty
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }
}
