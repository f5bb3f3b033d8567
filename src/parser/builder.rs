//! Semantic actions: one AST synthesis per production
//!
//! The parse engine hands every reduction to [`AstBuilder::reduce`] together
//! with the popped stack nodes, leftmost first. The match in `reduce` is
//! exhaustive over [`Rule`], so adding a production without its action is a
//! compile error.
//!
//! Precedence pass-through rules (`X ::= Y`) return the child unchanged,
//! empty productions yield [`ParseNode::Absent`], and the right-recursive
//! list rules flatten into a single sequence in source order.

use super::ast::*;
use super::grammar::Rule;
use super::lexer::{Token, TokenValue};
use std::collections::VecDeque;
use thiserror::Error;

/// A value on the parse stack: a shifted token or a partially built AST value
#[derive(Debug, Clone, PartialEq)]
pub enum ParseNode {
    Token(Token),
    /// Result of an empty production
    Absent,
    Program(Program),
    Statements(VecDeque<Stmt>),
    Stmt(Stmt),
    Call(Call),
    Type(TypeName, SourceLocation),
    Params(VecDeque<Param>),
    Param(Param),
    Args(VecDeque<Expr>),
    Expr(Expr),
}

impl ParseNode {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ParseNode::Token(_) => "token",
            ParseNode::Absent => "empty",
            ParseNode::Program(_) => "program",
            ParseNode::Statements(_) => "statement list",
            ParseNode::Stmt(_) => "statement",
            ParseNode::Call(_) => "call",
            ParseNode::Type(..) => "type",
            ParseNode::Params(_) => "parameter list",
            ParseNode::Param(_) => "parameter",
            ParseNode::Args(_) => "argument list",
            ParseNode::Expr(_) => "expression",
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, ParseNode::Absent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("no semantic action for rule id {0}")]
    UnknownRule(u16),
    #[error("rule {rule} expects {expected} children, got {found}")]
    Arity {
        rule: Rule,
        expected: usize,
        found: usize,
    },
    #[error("rule {rule}: child {position} should be a {expected}, found a {found}")]
    UnexpectedNode {
        rule: Rule,
        position: usize,
        expected: &'static str,
        found: &'static str,
    },
}

/// Ordered access to the children of one reduction
struct Children {
    rule: Rule,
    nodes: std::vec::IntoIter<ParseNode>,
    position: usize,
}

impl Children {
    fn next(&mut self) -> Result<ParseNode, BuildError> {
        let node = self.nodes.next().ok_or(BuildError::Arity {
            rule: self.rule,
            expected: self.rule.arity(),
            found: self.position,
        })?;
        self.position += 1;
        Ok(node)
    }

    fn unexpected(&self, expected: &'static str, found: &ParseNode) -> BuildError {
        BuildError::UnexpectedNode {
            rule: self.rule,
            position: self.position - 1,
            expected,
            found: found.kind_name(),
        }
    }

    fn token(&mut self) -> Result<Token, BuildError> {
        match self.next()? {
            ParseNode::Token(token) => Ok(token),
            other => Err(self.unexpected("token", &other)),
        }
    }

    /// Consume a punctuation or keyword token
    fn skip(&mut self) -> Result<(), BuildError> {
        self.token().map(|_| ())
    }

    /// Identifier name and location
    fn name(&mut self) -> Result<(String, SourceLocation), BuildError> {
        match self.next()? {
            ParseNode::Token(Token {
                value: Some(TokenValue::Name(name)),
                location,
                ..
            }) => Ok((name, location)),
            other => Err(self.unexpected("identifier", &other)),
        }
    }

    fn expr(&mut self) -> Result<Expr, BuildError> {
        match self.next()? {
            ParseNode::Expr(expr) => Ok(expr),
            other => Err(self.unexpected("expression", &other)),
        }
    }

    fn stmt(&mut self) -> Result<Stmt, BuildError> {
        match self.next()? {
            ParseNode::Stmt(stmt) => Ok(stmt),
            other => Err(self.unexpected("statement", &other)),
        }
    }

    /// A statement, or nothing for the empty statement
    fn stmt_or_absent(&mut self) -> Result<Option<Stmt>, BuildError> {
        match self.next()? {
            ParseNode::Stmt(stmt) => Ok(Some(stmt)),
            ParseNode::Absent => Ok(None),
            other => Err(self.unexpected("statement", &other)),
        }
    }

    /// A statement list; the empty statement closing a list stands for `[]`
    fn statements(&mut self) -> Result<VecDeque<Stmt>, BuildError> {
        match self.next()? {
            ParseNode::Statements(list) => Ok(list),
            ParseNode::Absent => Ok(VecDeque::new()),
            other => Err(self.unexpected("statement list", &other)),
        }
    }

    fn optional_statements(&mut self) -> Result<Option<Vec<Stmt>>, BuildError> {
        match self.next()? {
            ParseNode::Statements(list) => Ok(Some(list.into())),
            ParseNode::Absent => Ok(None),
            other => Err(self.unexpected("else branch", &other)),
        }
    }

    fn type_name(&mut self) -> Result<TypeName, BuildError> {
        match self.next()? {
            ParseNode::Type(type_name, _) => Ok(type_name),
            other => Err(self.unexpected("type", &other)),
        }
    }

    fn call(&mut self) -> Result<Call, BuildError> {
        match self.next()? {
            ParseNode::Call(call) => Ok(call),
            other => Err(self.unexpected("call", &other)),
        }
    }

    fn param(&mut self) -> Result<Param, BuildError> {
        match self.next()? {
            ParseNode::Param(param) => Ok(param),
            other => Err(self.unexpected("parameter", &other)),
        }
    }

    fn params(&mut self) -> Result<VecDeque<Param>, BuildError> {
        match self.next()? {
            ParseNode::Params(params) => Ok(params),
            ParseNode::Absent => Ok(VecDeque::new()),
            other => Err(self.unexpected("parameter list", &other)),
        }
    }

    fn args(&mut self) -> Result<VecDeque<Expr>, BuildError> {
        match self.next()? {
            ParseNode::Args(args) => Ok(args),
            ParseNode::Absent => Ok(VecDeque::new()),
            other => Err(self.unexpected("argument list", &other)),
        }
    }

    fn absent(&mut self) -> Result<ParseNode, BuildError> {
        match self.next()? {
            ParseNode::Absent => Ok(ParseNode::Absent),
            other => Err(self.unexpected("empty", &other)),
        }
    }
}

/// Stateless table of semantic actions
#[derive(Debug, Default, Clone, Copy)]
pub struct AstBuilder;

impl AstBuilder {
    pub fn new() -> Self {
        AstBuilder
    }

    /// Reduce by a raw rule id
    pub fn reduce_id(&self, id: u16, children: Vec<ParseNode>) -> Result<ParseNode, BuildError> {
        let rule = Rule::from_id(id).ok_or(BuildError::UnknownRule(id))?;
        self.reduce(rule, children)
    }

    /// Synthesize the node for `rule` from its children, leftmost first
    pub fn reduce(&self, rule: Rule, children: Vec<ParseNode>) -> Result<ParseNode, BuildError> {
        if children.len() != rule.arity() {
            return Err(BuildError::Arity {
                rule,
                expected: rule.arity(),
                found: children.len(),
            });
        }

        let mut c = Children {
            rule,
            nodes: children.into_iter(),
            position: 0,
        };

        let node = match rule {
            Rule::Program => {
                let start = c.token()?;
                let statements = c.statements()?;
                c.skip()?;
                ParseNode::Program(Program::new(statements.into(), start.location))
            }
            Rule::StatementList => {
                let head = c.stmt_or_absent()?;
                let mut tail = c.statements()?;
                if let Some(stmt) = head {
                    tail.push_front(stmt);
                }
                ParseNode::Statements(tail)
            }
            Rule::StatementDeclaration
            | Rule::StatementAssignment
            | Rule::StatementCondition
            | Rule::StatementLoop
            | Rule::StatementMethodDeclaration
            | Rule::StatementReturn => ParseNode::Stmt(c.stmt()?),
            Rule::StatementMethodCall => ParseNode::Stmt(Stmt::Call(c.call()?)),
            Rule::StatementEmpty => c.absent()?,

            Rule::Declaration => {
                let var = c.token()?;
                let (name, _) = c.name()?;
                c.skip()?;
                let declared_type = c.type_name()?;
                c.skip()?;
                ParseNode::Stmt(Stmt::VarDecl {
                    name,
                    declared_type,
                    location: var.location,
                })
            }
            Rule::TypeInt => type_node(&mut c, TypeName::Int)?,
            Rule::TypeFloat => type_node(&mut c, TypeName::Float)?,
            Rule::TypeString => type_node(&mut c, TypeName::String)?,
            Rule::TypeBool => type_node(&mut c, TypeName::Bool)?,

            Rule::Assignment => {
                let (target, location) = c.name()?;
                c.skip()?;
                let value = c.expr()?;
                c.skip()?;
                ParseNode::Stmt(Stmt::Assign {
                    target,
                    value,
                    location,
                })
            }
            Rule::Condition => {
                let keyword = c.token()?;
                let condition = c.expr()?;
                c.skip()?;
                let then_branch = c.statements()?.into();
                let else_branch = c.optional_statements()?;
                c.skip()?;
                ParseNode::Stmt(Stmt::If {
                    condition,
                    then_branch,
                    else_branch,
                    location: keyword.location,
                })
            }
            Rule::OptionalElseElse => {
                c.skip()?;
                ParseNode::Statements(c.statements()?)
            }
            Rule::OptionalElseEmpty => c.absent()?,
            Rule::Loop => {
                let keyword = c.token()?;
                let condition = c.expr()?;
                c.skip()?;
                let body = c.statements()?.into();
                c.skip()?;
                ParseNode::Stmt(Stmt::While {
                    condition,
                    body,
                    location: keyword.location,
                })
            }

            Rule::MethodDeclaration => {
                let keyword = c.token()?;
                let (name, _) = c.name()?;
                c.skip()?;
                let params = c.params()?.into();
                c.skip()?;
                c.skip()?;
                let return_type = c.type_name()?;
                c.skip()?;
                let body = c.statements()?.into();
                c.skip()?;
                ParseNode::Stmt(Stmt::FuncDecl {
                    name,
                    params,
                    return_type,
                    body,
                    location: keyword.location,
                })
            }
            Rule::OptionalParamsList => ParseNode::Params(c.params()?),
            Rule::OptionalParamsEmpty => c.absent()?,
            Rule::ParamList => {
                let head = c.param()?;
                let mut tail = c.params()?;
                tail.push_front(head);
                ParseNode::Params(tail)
            }
            Rule::ParamTailComma => {
                c.skip()?;
                let head = c.param()?;
                let mut tail = c.params()?;
                tail.push_front(head);
                ParseNode::Params(tail)
            }
            Rule::ParamTailEmpty => c.absent()?,
            Rule::Param => {
                let (name, location) = c.name()?;
                c.skip()?;
                let param_type = c.type_name()?;
                ParseNode::Param(Param {
                    name,
                    param_type,
                    location,
                })
            }

            Rule::MethodCall => {
                let (name, location) = c.name()?;
                c.skip()?;
                let args = c.args()?.into();
                c.skip()?;
                c.skip()?;
                ParseNode::Call(Call {
                    name,
                    args,
                    location,
                })
            }
            Rule::OptionalArgsList => ParseNode::Args(c.args()?),
            Rule::OptionalArgsEmpty => c.absent()?,
            Rule::ArgList => {
                let head = c.expr()?;
                let mut tail = c.args()?;
                tail.push_front(head);
                ParseNode::Args(tail)
            }
            Rule::ArgTailComma => {
                c.skip()?;
                let head = c.expr()?;
                let mut tail = c.args()?;
                tail.push_front(head);
                ParseNode::Args(tail)
            }
            Rule::ArgTailEmpty => c.absent()?,
            Rule::ReturnStatement => {
                let keyword = c.token()?;
                let value = c.expr()?;
                c.skip()?;
                ParseNode::Stmt(Stmt::Return {
                    value,
                    location: keyword.location,
                })
            }

            Rule::Expression
            | Rule::LogicalOrFromAnd
            | Rule::LogicalAndFromEquality
            | Rule::EqualityFromRelational
            | Rule::RelationalFromAdditive
            | Rule::AdditiveFromMultiplicative
            | Rule::MultiplicativeFromFactor => ParseNode::Expr(c.expr()?),

            Rule::LogicalOrOr => binary(&mut c, BinOp::Or)?,
            Rule::LogicalAndAnd => binary(&mut c, BinOp::And)?,
            Rule::EqualityEq => binary(&mut c, BinOp::Eq)?,
            Rule::EqualityNeq => binary(&mut c, BinOp::Neq)?,
            Rule::RelationalLt => binary(&mut c, BinOp::Lt)?,
            Rule::RelationalGt => binary(&mut c, BinOp::Gt)?,
            Rule::AdditivePlus => binary(&mut c, BinOp::Add)?,
            Rule::AdditiveMinus => binary(&mut c, BinOp::Sub)?,
            Rule::MultiplicativeTimes => binary(&mut c, BinOp::Mul)?,
            Rule::MultiplicativeDivide => binary(&mut c, BinOp::Div)?,

            Rule::FactorIdentifier => {
                let (name, location) = c.name()?;
                ParseNode::Expr(Expr::Variable(name, location))
            }
            Rule::FactorNumber => {
                let token = c.token()?;
                let literal = match token.value {
                    Some(TokenValue::Integer(n)) => Literal::Integer(n),
                    Some(TokenValue::Float(x)) => Literal::Float(x),
                    _ => return Err(c.unexpected("number", &ParseNode::Token(token))),
                };
                ParseNode::Expr(Expr::Literal(literal, token.location))
            }
            Rule::FactorStringLiteral => {
                let token = c.token()?;
                match token.value {
                    Some(TokenValue::Text(text)) => {
                        ParseNode::Expr(Expr::Literal(Literal::Str(text), token.location))
                    }
                    _ => return Err(c.unexpected("string", &ParseNode::Token(token))),
                }
            }
            Rule::FactorTrue => {
                let token = c.token()?;
                ParseNode::Expr(Expr::Literal(Literal::Bool(true), token.location))
            }
            Rule::FactorFalse => {
                let token = c.token()?;
                ParseNode::Expr(Expr::Literal(Literal::Bool(false), token.location))
            }
            Rule::FactorParens => {
                c.skip()?;
                let inner = c.expr()?;
                c.skip()?;
                ParseNode::Expr(inner)
            }
            Rule::FactorMethodCall => ParseNode::Expr(Expr::Call(c.call()?)),
            Rule::FactorNot => unary(&mut c, UnOp::Not)?,
            Rule::FactorPlus => unary(&mut c, UnOp::Pos)?,
            Rule::FactorMinus => unary(&mut c, UnOp::Neg)?,

            Rule::Empty => ParseNode::Absent,
        };

        Ok(node)
    }
}

fn type_node(c: &mut Children, type_name: TypeName) -> Result<ParseNode, BuildError> {
    let token = c.token()?;
    Ok(ParseNode::Type(type_name, token.location))
}

/// `X ::= X op Y`, located at the operator
fn binary(c: &mut Children, op: BinOp) -> Result<ParseNode, BuildError> {
    let left = c.expr()?;
    let operator = c.token()?;
    let right = c.expr()?;
    Ok(ParseNode::Expr(Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
        location: operator.location,
    }))
}

/// `Factor ::= op Factor`, located at the operator
fn unary(c: &mut Children, op: UnOp) -> Result<ParseNode, BuildError> {
    let operator = c.token()?;
    let operand = c.expr()?;
    Ok(ParseNode::Expr(Expr::Unary {
        op,
        operand: Box::new(operand),
        location: operator.location,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::grammar::Symbol;

    fn loc(column: usize) -> SourceLocation {
        SourceLocation::new(1, column)
    }

    fn tok(symbol: Symbol, lexeme: &str, column: usize) -> ParseNode {
        ParseNode::Token(Token::new(symbol, lexeme, loc(column)))
    }

    fn ident(name: &str, column: usize) -> ParseNode {
        ParseNode::Token(
            Token::new(Symbol::Identifier, name, loc(column))
                .with_value(TokenValue::Name(name.to_string())),
        )
    }

    fn int(n: i64, column: usize) -> ParseNode {
        ParseNode::Expr(Expr::Literal(Literal::Integer(n), loc(column)))
    }

    #[test]
    fn test_binary_located_at_operator() {
        let builder = AstBuilder::new();
        let node = builder
            .reduce(
                Rule::AdditiveMinus,
                vec![int(10, 1), tok(Symbol::Minus, "-", 4), int(3, 6)],
            )
            .unwrap();

        match node {
            ParseNode::Expr(expr) => {
                assert_eq!(expr.to_string(), "Sub(10, 3)");
                assert_eq!(expr.location(), loc(4));
            }
            other => panic!("Expected expression, got {:?}", other),
        }
    }

    #[test]
    fn test_number_payload() {
        let builder = AstBuilder::new();
        let number = Token::new(Symbol::Number, "2.5", loc(1)).with_value(TokenValue::Float(2.5));
        let node = builder
            .reduce(Rule::FactorNumber, vec![ParseNode::Token(number)])
            .unwrap();

        assert_eq!(
            node,
            ParseNode::Expr(Expr::Literal(Literal::Float(2.5), loc(1)))
        );
    }

    #[test]
    fn test_pass_through_keeps_child() {
        let builder = AstBuilder::new();
        let node = builder.reduce(Rule::Expression, vec![int(1, 1)]).unwrap();
        assert_eq!(node, int(1, 1));

        let parens = builder
            .reduce(
                Rule::FactorParens,
                vec![tok(Symbol::LParen, "(", 1), int(7, 2), tok(Symbol::RParen, ")", 3)],
            )
            .unwrap();
        assert_eq!(parens, int(7, 2));
    }

    #[test]
    fn test_argument_list_flattens_in_order() {
        let builder = AstBuilder::new();
        let empty_tail = builder
            .reduce(Rule::ArgTailEmpty, vec![ParseNode::Absent])
            .unwrap();
        let tail = builder
            .reduce(
                Rule::ArgTailComma,
                vec![tok(Symbol::Comma, ",", 4), int(2, 6), empty_tail],
            )
            .unwrap();
        let list = builder.reduce(Rule::ArgList, vec![int(1, 3), tail]).unwrap();

        match list {
            ParseNode::Args(args) => {
                let rendered: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                assert_eq!(rendered, vec!["1", "2"]);
            }
            other => panic!("Expected argument list, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_statement_closes_list() {
        let builder = AstBuilder::new();
        let empty = builder.reduce(Rule::Empty, vec![]).unwrap();
        let closing = builder.reduce(Rule::StatementEmpty, vec![empty]).unwrap();
        assert!(closing.is_absent());

        let stmt = ParseNode::Stmt(Stmt::Return {
            value: Expr::Literal(Literal::Integer(1), loc(8)),
            location: loc(1),
        });
        let list = builder
            .reduce(Rule::StatementList, vec![stmt, closing])
            .unwrap();
        assert!(matches!(list, ParseNode::Statements(ref s) if s.len() == 1));
    }

    #[test]
    fn test_else_branch_always_present() {
        let builder = AstBuilder::new();
        let node = builder
            .reduce(
                Rule::OptionalElseElse,
                vec![tok(Symbol::Else, "else", 1), ParseNode::Absent],
            )
            .unwrap();
        assert_eq!(node, ParseNode::Statements(VecDeque::new()));
    }

    #[test]
    fn test_unknown_rule_id() {
        let builder = AstBuilder::new();
        assert_eq!(
            builder.reduce_id(62, vec![]).unwrap_err(),
            BuildError::UnknownRule(62)
        );
        assert!(builder.reduce_id(61, vec![]).unwrap().is_absent());
    }

    #[test]
    fn test_arity_mismatch() {
        let builder = AstBuilder::new();
        assert_eq!(
            builder.reduce(Rule::Param, vec![ident("x", 1)]).unwrap_err(),
            BuildError::Arity {
                rule: Rule::Param,
                expected: 3,
                found: 1
            }
        );
    }

    #[test]
    fn test_unexpected_node() {
        let builder = AstBuilder::new();
        let err = builder
            .reduce(
                Rule::Assignment,
                vec![
                    ident("x", 1),
                    tok(Symbol::Assign, ":=", 3),
                    ParseNode::Absent,
                    tok(Symbol::Semi, ";", 6),
                ],
            )
            .unwrap_err();

        assert_eq!(
            err,
            BuildError::UnexpectedNode {
                rule: Rule::Assignment,
                position: 2,
                expected: "expression",
                found: "empty"
            }
        );
    }
}
