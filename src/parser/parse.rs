//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and the parse engine's core:
//! the parse stack, shift and reduce, lookahead validation, diagnostics and
//! the entry point.
//!
//! # Parser Architecture
//!
//! The Parser recognizes input by recursive descent, but it never builds a
//! tree directly. It drives an explicit parse stack the way a shift-reduce
//! parser does:
//! - every consumed token is a *shift* that pushes a terminal node;
//! - every recognized production is a *reduce* that pops `arity(rule)`
//!   nodes, hands them to the [`AstBuilder`] and pushes the result.
//!
//! Reductions happen in the same bottom-up order an LR parser for the grammar
//! would produce. Left-recursive levels are recognized with loops and
//! right-recursive lists reduce their cons rule once per element, so neither
//! needs extra recursion.
//!
//! - This module: Parser struct, stack operations, helpers, entry point
//! - `declarations`: `var` declarations, types, function declarations
//! - `statements`: statement lists and the statement forms
//! - `expressions`: the precedence levels, factors and calls
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.

use crate::parser::ast::*;
use crate::parser::builder::{AstBuilder, ParseNode};
use crate::parser::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::parser::grammar::{Grammar, Rule, Symbol};
use crate::parser::lexer::{Lexer, Token};
use crate::trace::{TraceAction, TraceRecorder, TraceStep};
use tracing::{debug, trace, warn};

/// Default nesting limit for statements, parentheses and unary chains
pub const DEFAULT_MAX_DEPTH: usize = 200;

/// Parser configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A parse stack entry: a node labelled with its grammar symbol
#[derive(Debug, Clone)]
pub(crate) struct StackEntry {
    pub(crate) symbol: Symbol,
    pub(crate) node: ParseNode,
    pub(crate) location: SourceLocation,
}

/// The parse stopped; the reason is already recorded as a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Halt;

pub(crate) type Step<T = ()> = Result<T, Halt>;

/// Grammar-driven parser for Start/end programs
pub struct Parser<'g> {
    pub(crate) grammar: &'g Grammar,
    builder: AstBuilder,
    config: ParserConfig,
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    pub(crate) stack: Vec<StackEntry>,
    diagnostics: Diagnostics,
    /// Terminals consulted since the last shift
    pub(crate) expected: Vec<Symbol>,
    depth: usize,
    trace: Option<TraceRecorder>,
}

impl<'g> Parser<'g> {
    /// Create a parser over a token stream. A missing trailing `EOF` is
    /// appended at the last token's location.
    pub fn new(grammar: &'g Grammar, mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.symbol) != Some(Symbol::Eof) {
            let location = tokens
                .last()
                .map(|t| t.location)
                .unwrap_or(SourceLocation::new(1, 1));
            tokens.push(Token::eof(location));
        }

        Self {
            grammar,
            builder: AstBuilder::new(),
            config: ParserConfig::default(),
            tokens,
            position: 0,
            stack: Vec::new(),
            diagnostics: Diagnostics::new(),
            expected: Vec::new(),
            depth: 0,
            trace: None,
        }
    }

    /// Lex `source` and create a parser over its tokens
    pub fn from_source(grammar: &'g Grammar, source: &str) -> Self {
        Self::new(grammar, Lexer::new(source).tokenize())
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Record every step of the next parse
    pub fn with_trace(mut self, recorder: TraceRecorder) -> Self {
        self.trace = Some(recorder);
        self
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn trace(&self) -> Option<&TraceRecorder> {
        self.trace.as_ref()
    }

    pub fn take_trace(&mut self) -> Option<TraceRecorder> {
        self.trace.take()
    }

    /// Parse the whole token stream into a [`Program`].
    ///
    /// All per-parse state is reset first, so calling this again on the same
    /// parser yields an equal result. On failure the diagnostics are returned
    /// and no tree is built.
    pub fn parse(&mut self) -> Result<Program, Vec<Diagnostic>> {
        self.reset();

        match self.parse_program() {
            Ok(program) => {
                debug!(
                    statements = program.statements.len(),
                    tokens = self.tokens.len(),
                    "parse accepted"
                );
                Ok(program)
            }
            Err(Halt) => {
                let diagnostics = self.diagnostics.drain();
                debug!(
                    diagnostics = diagnostics.len(),
                    position = self.position,
                    "parse halted"
                );
                Err(diagnostics)
            }
        }
    }

    fn reset(&mut self) {
        self.position = 0;
        self.stack.clear();
        self.diagnostics.drain();
        self.expected.clear();
        self.depth = 0;
        if let Some(recorder) = self.trace.as_mut() {
            recorder.clear();
        }
    }

    /// `<Program> ::= Start <StatementList> end`, accepted on `EOF`
    fn parse_program(&mut self) -> Step<Program> {
        self.validate_lookahead()?;
        self.expect(Symbol::Start)?;
        self.parse_statement_list()?;
        self.expect(Symbol::End)?;
        if !self.check(Symbol::Eof) {
            return Err(self.syntax_error());
        }
        self.reduce(Rule::Program)?;
        self.record_step(TraceAction::Accept, self.current_location());

        match self.stack.pop() {
            Some(StackEntry {
                node: ParseNode::Program(program),
                ..
            }) if self.stack.is_empty() => Ok(program),
            _ => Err(self.internal_error("parse stack does not hold a single program at accept")),
        }
    }

    // ===== Stack operations =====

    /// Push the lookahead token and advance
    pub(crate) fn shift(&mut self) -> Step {
        let token = self.peek().clone();
        trace!(symbol = %token.symbol, lexeme = %token.lexeme, location = %token.location, "shift");

        self.position += 1;
        self.expected.clear();
        let action = TraceAction::Shift {
            symbol: token.symbol,
            lexeme: token.lexeme.clone(),
        };
        let location = token.location;
        self.stack.push(StackEntry {
            symbol: token.symbol,
            node: ParseNode::Token(token),
            location,
        });
        self.record_step(action, location);

        self.validate_lookahead()
    }

    /// Pop the rule's children, build its node and push it under the rule's
    /// left-hand side
    pub(crate) fn reduce(&mut self, rule: Rule) -> Step {
        let arity = self.grammar.arity(rule);
        let Some(start) = self.stack.len().checked_sub(arity) else {
            return Err(self.internal_error(&format!(
                "parse stack underflow reducing {}",
                rule
            )));
        };

        let grammar = self.grammar;
        let rhs = &grammar.production(rule).rhs;
        if !self.stack[start..]
            .iter()
            .map(|entry| entry.symbol)
            .eq(rhs.iter().copied())
        {
            let found: Vec<&str> = self.stack[start..].iter().map(|e| e.symbol.name()).collect();
            return Err(self.internal_error(&format!(
                "parse stack `{}` does not match {}",
                found.join(" "),
                rule
            )));
        }

        let location = self
            .stack
            .get(start)
            .map(|entry| entry.location)
            .unwrap_or_else(|| self.current_location());
        let children: Vec<ParseNode> = self.stack.drain(start..).map(|entry| entry.node).collect();
        trace!(rule = rule.id(), production = %rule, "reduce");

        match self.builder.reduce(rule, children) {
            Ok(node) => {
                // The empty statement closing a list stands for its empty tail
                let symbol = match rule {
                    Rule::StatementEmpty => Symbol::StatementList,
                    _ => grammar.lhs(rule),
                };
                self.stack.push(StackEntry {
                    symbol,
                    node,
                    location,
                });
                self.record_step(TraceAction::Reduce { rule }, location);
                Ok(())
            }
            Err(err) => Err(self.internal_error(&err.to_string())),
        }
    }

    /// Run `f` one nesting level deeper
    pub(crate) fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Step<T>) -> Step<T> {
        if self.depth >= self.config.max_depth {
            let token = self.peek().clone();
            let diagnostic = Diagnostic::new(
                DiagnosticKind::NestingLimit,
                format!("nesting deeper than {} levels", self.config.max_depth),
                token.location,
            )
            .with_token(token);
            return Err(self.halt(diagnostic));
        }

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // ===== Helper methods =====

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub(crate) fn peek_symbol(&self) -> Symbol {
        self.peek().symbol
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location
    }

    /// Whether the lookahead is `symbol`; if not, `symbol` joins the
    /// expected set
    pub(crate) fn check(&mut self, symbol: Symbol) -> bool {
        if self.peek_symbol() == symbol {
            true
        } else {
            self.expected.push(symbol);
            false
        }
    }

    /// Whether the lookahead can begin `nonterminal`; if not, its FIRST set
    /// joins the expected set
    pub(crate) fn check_first(&mut self, nonterminal: Symbol) -> bool {
        let first = self.grammar.first(nonterminal);
        if first.contains(&self.peek_symbol()) {
            true
        } else {
            self.expected.extend_from_slice(first);
            false
        }
    }

    /// Shift `symbol` or fail with a parse error
    pub(crate) fn expect(&mut self, symbol: Symbol) -> Step {
        if self.check(symbol) {
            self.shift()
        } else {
            Err(self.syntax_error())
        }
    }

    /// Reject lexer error tokens and malformed tokens before the parser
    /// looks at them
    fn validate_lookahead(&mut self) -> Step {
        let token = self.peek();
        let message = if token.symbol == Symbol::Error {
            match token.invalid_reason() {
                Some(reason) => format!("{}: {}", token, reason),
                None => format!("{}", token),
            }
        } else if !token.is_well_formed() {
            format!("malformed token {} ({})", token, token.symbol)
        } else {
            return Ok(());
        };

        let token = token.clone();
        let diagnostic = Diagnostic::new(DiagnosticKind::TokenError, message, token.location)
            .with_token(token);
        Err(self.halt(diagnostic))
    }

    /// Record a parse error at the lookahead with the current expected set
    pub(crate) fn syntax_error(&mut self) -> Halt {
        let token = self.peek().clone();
        let expected = std::mem::take(&mut self.expected);
        let diagnostic = Diagnostic::new(
            DiagnosticKind::ParseError,
            format!("unexpected {}", token),
            token.location,
        )
        .with_token(token)
        .with_expected(expected);
        self.halt(diagnostic)
    }

    fn internal_error(&mut self, message: &str) -> Halt {
        let diagnostic = Diagnostic::new(
            DiagnosticKind::Internal,
            message,
            self.current_location(),
        );
        self.halt(diagnostic)
    }

    fn halt(&mut self, diagnostic: Diagnostic) -> Halt {
        debug!(kind = ?diagnostic.kind, location = %diagnostic.location, "{}", diagnostic.message);
        let location = diagnostic.location;
        let kind = diagnostic.kind;
        self.diagnostics.record(diagnostic);
        self.record_step(TraceAction::Halt { kind }, location);
        Halt
    }

    fn record_step(&mut self, action: TraceAction, location: SourceLocation) {
        let Some(recorder) = self.trace.as_mut() else {
            return;
        };
        if recorder.is_truncated() {
            return;
        }

        let step = TraceStep {
            action,
            stack: self.stack.iter().map(|entry| entry.symbol).collect(),
            location,
        };
        if let Err(err) = recorder.push(step) {
            warn!(%err, "parse trace truncated; parsing continues without recording");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Program, Vec<Diagnostic>> {
        let grammar = Grammar::standard().unwrap();
        Parser::from_source(grammar, source).parse()
    }

    #[test]
    fn test_parse_empty_program() {
        let program = parse("Start end").unwrap();
        assert!(program.statements.is_empty());
        assert_eq!(program.location, SourceLocation::new(1, 1));
    }

    #[test]
    fn test_parse_simple_program() {
        let program = parse("Start var x: int; x := 1 + 2 * 3; end").unwrap();

        assert_eq!(program.statements.len(), 2);
        match &program.statements[1] {
            Stmt::Assign { target, value, .. } => {
                assert_eq!(target, "x");
                assert_eq!(value.to_string(), "Add(1, Mul(2, 3))");
            }
            other => panic!("Expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_eof_is_appended() {
        let grammar = Grammar::standard().unwrap();
        let mut tokens = Lexer::new("Start end").tokenize();
        tokens.pop();

        let mut parser = Parser::new(grammar, tokens);
        assert_eq!(parser.tokens().last().map(|t| t.symbol), Some(Symbol::Eof));
        assert!(parser.parse().is_ok());
    }

    #[test]
    fn test_trailing_tokens_after_end() {
        let diagnostics = parse("Start end end").unwrap_err();

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::ParseError);
        assert_eq!(diagnostics[0].expected, vec![Symbol::Eof]);
        assert_eq!(diagnostics[0].location, SourceLocation::new(1, 11));
    }

    #[test]
    fn test_malformed_token_is_token_error() {
        let grammar = Grammar::standard().unwrap();
        let loc = SourceLocation::new(1, 7);
        let tokens = vec![
            Token::new(Symbol::Start, "Start", SourceLocation::new(1, 1)),
            Token::new(Symbol::Identifier, "x", loc),
        ];

        let diagnostics = Parser::new(grammar, tokens).parse().unwrap_err();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::TokenError);
        assert_eq!(diagnostics[0].location, loc);
    }

    #[test]
    fn test_nonterminal_token_is_token_error() {
        let grammar = Grammar::standard().unwrap();
        let tokens = vec![Token::new(Symbol::Program, "?", SourceLocation::new(1, 1))];

        let diagnostics = Parser::new(grammar, tokens).parse().unwrap_err();
        assert_eq!(diagnostics[0].kind, DiagnosticKind::TokenError);
    }

    #[test]
    fn test_configured_nesting_limit() {
        let grammar = Grammar::standard().unwrap();
        let source = format!("Start x := {}1{}; end", "(".repeat(30), ")".repeat(30));
        let config = ParserConfig { max_depth: 20 };

        let diagnostics = Parser::from_source(grammar, &source)
            .with_config(config)
            .parse()
            .unwrap_err();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::NestingLimit);

        let shallow = format!("Start x := {}1{}; end", "(".repeat(5), ")".repeat(5));
        assert!(Parser::from_source(grammar, &shallow)
            .with_config(config)
            .parse()
            .is_ok());
    }

    #[test]
    fn test_trace_overflow_keeps_parsing() {
        let grammar = Grammar::standard().unwrap();
        let mut parser = Parser::from_source(grammar, "Start x := 1 + 2; end")
            .with_trace(TraceRecorder::new(5));

        assert!(parser.parse().is_ok());
        let trace = parser.trace().unwrap();
        assert_eq!(trace.len(), 5);
        assert!(trace.is_truncated());
    }

    #[test]
    fn test_reduce_checks_stack_symbols() {
        let grammar = Grammar::standard().unwrap();
        let mut parser = Parser::from_source(grammar, "Start end");
        assert_eq!(parser.shift(), Ok(()));

        // <Statement> ::= <Declaration> over a `Start` terminal
        assert_eq!(parser.reduce(Rule::StatementDeclaration), Err(Halt));
        let diagnostics = parser.diagnostics.drain();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::Internal);
        assert!(diagnostics[0].message.contains("parse stack `Start`"));
    }

    #[test]
    fn test_trace_stack_matches_each_reduction() {
        let grammar = Grammar::standard().unwrap();
        let source = "Start if a then x := 1; else end while b do f(); end end";
        let mut parser = Parser::from_source(grammar, source).with_trace(TraceRecorder::new(1000));
        parser.parse().unwrap();

        let steps = parser.trace().unwrap().steps();
        for pair in steps.windows(2) {
            if let TraceAction::Reduce { rule } = pair[1].action {
                let rhs = rule.rhs();
                let before = &pair[0].stack;
                assert!(
                    before.ends_with(rhs),
                    "{} reduced over {:?}",
                    rule,
                    before
                );
            }
        }
    }

    #[test]
    fn test_trace_ends_with_accept() {
        let grammar = Grammar::standard().unwrap();
        let mut parser =
            Parser::from_source(grammar, "Start end").with_trace(TraceRecorder::new(100));
        parser.parse().unwrap();

        let steps = parser.trace().unwrap().steps();
        let actions: Vec<String> = steps.iter().map(|s| s.action.to_string()).collect();
        assert_eq!(
            actions,
            vec![
                "shift Start 'Start'",
                "reduce 61: <Empty> ::=",
                "reduce  9: <Statement> ::= <Empty>",
                "shift end 'end'",
                "reduce  0: <Program> ::= Start <StatementList> end",
                "accept",
            ]
        );
        assert_eq!(steps.last().unwrap().stack, vec![Symbol::Program]);
    }
}
