//! Statement parsing implementation
//!
//! This module handles statement lists and the statement forms that do not
//! introduce declarations:
//!
//! - Assignments: `x := expr;`
//! - Control flow: `if ... then ... [else ...] end`, `while ... do ... end`
//! - Calls as statements: `f(a, b);`
//! - `return expr;`
//!
//! # Grammar
//!
//! ```text
//! <StatementList> ::= <Statement> <StatementList>
//! <Statement>     ::= <Declaration> | <Assignment> | <Condition> | <Loop>
//!                   | <MethodDeclaration> | <MethodCall> | <ReturnStatement>
//!                   | <Empty>
//! <Condition>     ::= if <Expression> then <StatementList> <OptionalElse> end
//! <OptionalElse>  ::= else <StatementList> | <Empty>
//! <Loop>          ::= while <Expression> do <StatementList> end
//! ```
//!
//! A statement list ends at the first lookahead that cannot begin a
//! statement. That position is closed with the empty statement, which stands
//! for the list's empty tail; the cons rule is then reduced once per
//! statement, innermost first.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::grammar::{Rule, Symbol};
use crate::parser::parse::{Parser, Step};

impl Parser<'_> {
    /// Parse a statement list, leaving one `<StatementList>` entry on the
    /// stack.
    ///
    /// The closing `<Statement> ::= <Empty>` goes on the stack labelled
    /// `<StatementList>`: it is the list's empty tail, and the cons rule and
    /// every enclosing production pop it as one.
    pub(crate) fn parse_statement_list(&mut self) -> Step {
        let mut count = 0;
        while self.check_first(Symbol::Statement) {
            self.parse_statement()?;
            count += 1;
        }

        self.reduce(Rule::Empty)?;
        self.reduce(Rule::StatementEmpty)?;
        for _ in 0..count {
            self.reduce(Rule::StatementList)?;
        }
        Ok(())
    }

    /// Parse a single statement and reduce it to `<Statement>`
    pub(crate) fn parse_statement(&mut self) -> Step {
        let rule = match self.peek_symbol() {
            Symbol::Var => {
                self.parse_declaration()?;
                Rule::StatementDeclaration
            }
            Symbol::If => {
                self.nested(|p| p.parse_condition())?;
                Rule::StatementCondition
            }
            Symbol::While => {
                self.nested(|p| p.parse_loop())?;
                Rule::StatementLoop
            }
            Symbol::Function => {
                self.nested(|p| p.parse_method_declaration())?;
                Rule::StatementMethodDeclaration
            }
            Symbol::Return => {
                self.parse_return_statement()?;
                Rule::StatementReturn
            }
            Symbol::Identifier => {
                // Either a call or an assignment; decided after the name
                self.shift()?;
                if self.check(Symbol::LParen) {
                    self.parse_call_rest()?;
                    Rule::StatementMethodCall
                } else if self.check(Symbol::Assign) {
                    self.parse_assignment_rest()?;
                    Rule::StatementAssignment
                } else {
                    return Err(self.syntax_error());
                }
            }
            _ => {
                self.check_first(Symbol::Statement);
                return Err(self.syntax_error());
            }
        };

        self.reduce(rule)
    }

    /// `Assign <Expression> Semi` after a shifted identifier
    fn parse_assignment_rest(&mut self) -> Step {
        self.expect(Symbol::Assign)?;
        self.parse_expression()?;
        self.expect(Symbol::Semi)?;
        self.reduce(Rule::Assignment)
    }

    /// Parse if statement
    fn parse_condition(&mut self) -> Step {
        self.expect(Symbol::If)?;
        self.parse_expression()?;
        self.expect(Symbol::Then)?;
        self.parse_statement_list()?;

        if self.check(Symbol::Else) {
            self.shift()?;
            self.parse_statement_list()?;
            self.reduce(Rule::OptionalElseElse)?;
        } else {
            self.reduce(Rule::Empty)?;
            self.reduce(Rule::OptionalElseEmpty)?;
        }

        self.expect(Symbol::End)?;
        self.reduce(Rule::Condition)
    }

    /// Parse while loop
    fn parse_loop(&mut self) -> Step {
        self.expect(Symbol::While)?;
        self.parse_expression()?;
        self.expect(Symbol::Do)?;
        self.parse_statement_list()?;
        self.expect(Symbol::End)?;
        self.reduce(Rule::Loop)
    }

    /// Parse return statement
    fn parse_return_statement(&mut self) -> Step {
        self.expect(Symbol::Return)?;
        self.parse_expression()?;
        self.expect(Symbol::Semi)?;
        self.reduce(Rule::ReturnStatement)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::diagnostics::DiagnosticKind;
    use crate::parser::grammar::{Grammar, Symbol};
    use crate::parser::parse::Parser;

    fn parse(source: &str) -> Program {
        let grammar = Grammar::standard().unwrap();
        Parser::from_source(grammar, source).parse().unwrap()
    }

    #[test]
    fn test_parse_if_without_else() {
        let program = parse("Start if true then x := 1; end end");

        match &program.statements[0] {
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                assert_eq!(condition.to_string(), "true");
                assert_eq!(then_branch.len(), 1);
                assert!(else_branch.is_none());
            }
            other => panic!("Expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_if_with_empty_else() {
        let program = parse("Start if a then else end end");

        match &program.statements[0] {
            Stmt::If {
                then_branch,
                else_branch,
                ..
            } => {
                assert!(then_branch.is_empty());
                assert_eq!(else_branch.as_deref(), Some(&[][..]));
            }
            other => panic!("Expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_while_loop() {
        let program = parse("Start while i < 10 do i := i + 1; end end");

        match &program.statements[0] {
            Stmt::While {
                condition, body, ..
            } => {
                assert_eq!(condition.to_string(), "Lt(i, 10)");
                assert_eq!(body.len(), 1);
            }
            other => panic!("Expected while loop, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_call_statement() {
        let program = parse("Start print(\"hi\", 2); end");

        match &program.statements[0] {
            Stmt::Call(call) => {
                assert_eq!(call.name, "print");
                assert_eq!(call.args.len(), 2);
            }
            other => panic!("Expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_identifier_needs_assign_or_call() {
        let grammar = Grammar::standard().unwrap();
        let diagnostics = Parser::from_source(grammar, "Start x 1; end")
            .parse()
            .unwrap_err();

        assert_eq!(diagnostics[0].kind, DiagnosticKind::ParseError);
        assert_eq!(diagnostics[0].expected, vec![Symbol::Assign, Symbol::LParen]);
    }

    #[test]
    fn test_statement_locations() {
        let program = parse("Start\n  return 1;\nend");
        assert_eq!(program.statements[0].location(), SourceLocation::new(2, 3));
    }
}
