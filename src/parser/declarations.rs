//! Declaration parsing implementation
//!
//! This module handles parsing of declarations:
//!
//! - Variable declarations: `var name: type;`
//! - Function declarations: `function name(params): type begin ... end`
//! - Types and function parameters
//!
//! # Grammar
//!
//! ```text
//! <Declaration>       ::= var Identifier Colon <Type> Semi
//! <Type>              ::= int | float | string | bool
//! <MethodDeclaration> ::= function Identifier LParen <OptionalParams> RParen
//!                         Colon <Type> begin <StatementList> end
//! <OptionalParams>    ::= <ParamList> | <Empty>
//! <ParamList>         ::= <Param> <ParamTail>
//! <ParamTail>         ::= Comma <Param> <ParamTail> | <Empty>
//! <Param>             ::= Identifier Colon <Type>
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::grammar::{Rule, Symbol};
use crate::parser::parse::{Parser, Step};

impl Parser<'_> {
    /// Parse variable declaration
    pub(crate) fn parse_declaration(&mut self) -> Step {
        self.expect(Symbol::Var)?;
        self.expect(Symbol::Identifier)?;
        self.expect(Symbol::Colon)?;
        self.parse_type()?;
        self.expect(Symbol::Semi)?;
        self.reduce(Rule::Declaration)
    }

    /// Parse a type keyword
    pub(crate) fn parse_type(&mut self) -> Step {
        let rule = match self.peek_symbol() {
            Symbol::Int => Rule::TypeInt,
            Symbol::Float => Rule::TypeFloat,
            Symbol::String => Rule::TypeString,
            Symbol::Bool => Rule::TypeBool,
            _ => {
                self.check_first(Symbol::Type);
                return Err(self.syntax_error());
            }
        };

        self.shift()?;
        self.reduce(rule)
    }

    /// Parse function declaration
    pub(crate) fn parse_method_declaration(&mut self) -> Step {
        self.expect(Symbol::Function)?;
        self.expect(Symbol::Identifier)?;
        self.expect(Symbol::LParen)?;

        if self.check(Symbol::Identifier) {
            self.parse_param()?;
            let mut tail = 0;
            while self.check(Symbol::Comma) {
                self.shift()?;
                self.parse_param()?;
                tail += 1;
            }

            self.reduce(Rule::Empty)?;
            self.reduce(Rule::ParamTailEmpty)?;
            for _ in 0..tail {
                self.reduce(Rule::ParamTailComma)?;
            }
            self.reduce(Rule::ParamList)?;
            self.reduce(Rule::OptionalParamsList)?;
        } else {
            self.reduce(Rule::Empty)?;
            self.reduce(Rule::OptionalParamsEmpty)?;
        }

        self.expect(Symbol::RParen)?;
        self.expect(Symbol::Colon)?;
        self.parse_type()?;
        self.expect(Symbol::Begin)?;
        self.parse_statement_list()?;
        self.expect(Symbol::End)?;
        self.reduce(Rule::MethodDeclaration)
    }

    /// Parse `name: type`
    fn parse_param(&mut self) -> Step {
        self.expect(Symbol::Identifier)?;
        self.expect(Symbol::Colon)?;
        self.parse_type()?;
        self.reduce(Rule::Param)
    }
}
