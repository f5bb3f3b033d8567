//! Expression parsing implementation
//!
//! This module handles expressions, from `or` down to factors, plus calls
//! (which appear both as statements and as factors).
//!
//! # Precedence
//!
//! Lowest to highest; every binary level is left-associative:
//!
//! ```text
//! <LogicalOrExpr>      Or
//! <LogicalAndExpr>     And
//! <EqualityExpr>       Eq Neq
//! <RelationalExpr>     Lt Gt
//! <AdditiveExpr>       Plus Minus
//! <MultiplicativeExpr> Times Divide
//! <Factor>             Not Plus Minus (prefix, right-associative)
//! ```
//!
//! Each level `X ::= X op Y | Y` is recognized as one `X ::= Y` reduction
//! followed by one `X ::= X op Y` reduction per operator, which yields the
//! left-leaning tree without left recursion.
//!
//! A call used as a factor keeps the grammar's trailing `Semi`:
//! `y := f(x);;`.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::grammar::{Rule, Symbol};
use crate::parser::parse::{Parser, Step};

type Operand<'g> = fn(&mut Parser<'g>) -> Step;

impl<'g> Parser<'g> {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Step {
        self.nested(|p| {
            p.parse_logical_or()?;
            p.reduce(Rule::Expression)
        })
    }

    fn parse_logical_or(&mut self) -> Step {
        self.parse_binary_level(
            Self::parse_logical_and,
            Rule::LogicalOrFromAnd,
            &[(Symbol::Or, Rule::LogicalOrOr)],
        )
    }

    fn parse_logical_and(&mut self) -> Step {
        self.parse_binary_level(
            Self::parse_equality,
            Rule::LogicalAndFromEquality,
            &[(Symbol::And, Rule::LogicalAndAnd)],
        )
    }

    fn parse_equality(&mut self) -> Step {
        self.parse_binary_level(
            Self::parse_relational,
            Rule::EqualityFromRelational,
            &[(Symbol::Eq, Rule::EqualityEq), (Symbol::Neq, Rule::EqualityNeq)],
        )
    }

    fn parse_relational(&mut self) -> Step {
        self.parse_binary_level(
            Self::parse_additive,
            Rule::RelationalFromAdditive,
            &[(Symbol::Lt, Rule::RelationalLt), (Symbol::Gt, Rule::RelationalGt)],
        )
    }

    fn parse_additive(&mut self) -> Step {
        self.parse_binary_level(
            Self::parse_multiplicative,
            Rule::AdditiveFromMultiplicative,
            &[
                (Symbol::Plus, Rule::AdditivePlus),
                (Symbol::Minus, Rule::AdditiveMinus),
            ],
        )
    }

    fn parse_multiplicative(&mut self) -> Step {
        self.parse_binary_level(
            Self::parse_factor,
            Rule::MultiplicativeFromFactor,
            &[
                (Symbol::Times, Rule::MultiplicativeTimes),
                (Symbol::Divide, Rule::MultiplicativeDivide),
            ],
        )
    }

    /// One left-associative level: `operand (op operand)*`
    fn parse_binary_level(
        &mut self,
        operand: Operand<'g>,
        single: Rule,
        operators: &[(Symbol, Rule)],
    ) -> Step {
        operand(self)?;
        self.reduce(single)?;

        'level: loop {
            for &(symbol, rule) in operators {
                if self.check(symbol) {
                    self.shift()?;
                    operand(self)?;
                    self.reduce(rule)?;
                    continue 'level;
                }
            }
            return Ok(());
        }
    }

    /// Parse a factor and reduce it to `<Factor>`
    pub(crate) fn parse_factor(&mut self) -> Step {
        let rule = match self.peek_symbol() {
            Symbol::Identifier => {
                self.shift()?;
                if self.check(Symbol::LParen) {
                    self.parse_call_rest()?;
                    Rule::FactorMethodCall
                } else {
                    Rule::FactorIdentifier
                }
            }
            Symbol::Number => {
                self.shift()?;
                Rule::FactorNumber
            }
            Symbol::StringLiteral => {
                self.shift()?;
                Rule::FactorStringLiteral
            }
            Symbol::True => {
                self.shift()?;
                Rule::FactorTrue
            }
            Symbol::False => {
                self.shift()?;
                Rule::FactorFalse
            }
            Symbol::LParen => {
                self.shift()?;
                self.parse_expression()?;
                self.expect(Symbol::RParen)?;
                Rule::FactorParens
            }
            prefix @ (Symbol::Not | Symbol::Plus | Symbol::Minus) => {
                self.shift()?;
                self.nested(|p| p.parse_factor())?;
                match prefix {
                    Symbol::Not => Rule::FactorNot,
                    Symbol::Plus => Rule::FactorPlus,
                    _ => Rule::FactorMinus,
                }
            }
            _ => {
                self.check_first(Symbol::Factor);
                return Err(self.syntax_error());
            }
        };

        self.reduce(rule)
    }

    /// `LParen <OptionalArgs> RParen Semi` after a shifted identifier,
    /// reduced to `<MethodCall>`
    pub(crate) fn parse_call_rest(&mut self) -> Step {
        self.expect(Symbol::LParen)?;

        if self.check_first(Symbol::Expression) {
            self.parse_expression()?;
            let mut tail = 0;
            while self.check(Symbol::Comma) {
                self.shift()?;
                self.parse_expression()?;
                tail += 1;
            }

            self.reduce(Rule::Empty)?;
            self.reduce(Rule::ArgTailEmpty)?;
            for _ in 0..tail {
                self.reduce(Rule::ArgTailComma)?;
            }
            self.reduce(Rule::ArgList)?;
            self.reduce(Rule::OptionalArgsList)?;
        } else {
            self.reduce(Rule::Empty)?;
            self.reduce(Rule::OptionalArgsEmpty)?;
        }

        self.expect(Symbol::RParen)?;
        self.expect(Symbol::Semi)?;
        self.reduce(Rule::MethodCall)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::diagnostics::DiagnosticKind;
    use crate::parser::grammar::{Grammar, Symbol};
    use crate::parser::parse::Parser;

    /// Parse `x := <expr>;` and return the assigned expression
    fn expr(source: &str) -> Expr {
        let grammar = Grammar::standard().unwrap();
        let program = Parser::from_source(grammar, &format!("Start x := {}; end", source))
            .parse()
            .unwrap();
        match program.statements.into_iter().next() {
            Some(Stmt::Assign { value, .. }) => value,
            other => panic!("Expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_precedence() {
        assert_eq!(expr("1 + 2 * 3").to_string(), "Add(1, Mul(2, 3))");
        assert_eq!(expr("(1 + 2) * 3").to_string(), "Mul(Add(1, 2), 3)");
        assert_eq!(
            expr("a or b and c = d").to_string(),
            "Or(a, And(b, Eq(c, d)))"
        );
        assert_eq!(expr("a < b + 1").to_string(), "Lt(a, Add(b, 1))");
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(expr("10 - 3 - 2").to_string(), "Sub(Sub(10, 3), 2)");
        assert_eq!(expr("8 / 4 / 2").to_string(), "Div(Div(8, 4), 2)");
        assert_eq!(expr("a <> b = c").to_string(), "Eq(Neq(a, b), c)");
    }

    #[test]
    fn test_unary_operators() {
        assert_eq!(expr("- - 1").to_string(), "Neg(Neg(1))");
        assert_eq!(expr("not a and b").to_string(), "And(Not(a), b)");
        assert_eq!(expr("+x * 2").to_string(), "Mul(Pos(x), 2)");
    }

    #[test]
    fn test_literals() {
        assert_eq!(expr("2.5").to_string(), "2.5");
        assert_eq!(expr("\"hi\"").to_string(), "\"hi\"");
        assert_eq!(expr("false").to_string(), "false");
    }

    #[test]
    fn test_call_as_factor_keeps_semi() {
        // Each call carries its own `;`, then one more closes the assignment
        let value = expr("f(1, g(););");
        assert_eq!(value.to_string(), "f(1, g())");
        assert!(matches!(value, Expr::Call(ref call) if call.args.len() == 2));
    }

    #[test]
    fn test_operator_location() {
        let value = expr("1 + 2");
        assert_eq!(value.location(), SourceLocation::new(1, 14));
    }

    #[test]
    fn test_missing_operand_lists_factor_starts() {
        let grammar = Grammar::standard().unwrap();
        let diagnostics = Parser::from_source(grammar, "Start x := 1 + ; end")
            .parse()
            .unwrap_err();

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::ParseError);
        assert!(diagnostics[0].expected.contains(&Symbol::LParen));
        assert!(diagnostics[0].expected.contains(&Symbol::Number));
        assert!(!diagnostics[0].expected.contains(&Symbol::Semi));
    }
}
