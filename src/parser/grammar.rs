//! Grammar model: symbols, productions and the sets derived from them
//!
//! The symbol set and the 62 productions are fixed at build time and carry
//! stable integer ids, so a persisted production table (see
//! [`Grammar::from_json`]) can be checked against the rule enumeration the
//! [`AstBuilder`](super::builder::AstBuilder) was written for.
//!
//! # Grammar
//!
//! ```text
//! <Program>       ::= Start <StatementList> end
//! <StatementList> ::= <Statement> <StatementList>
//! <Statement>     ::= <Declaration> | <Assignment> | <Condition> | <Loop>
//!                   | <MethodDeclaration> | <MethodCall> | <ReturnStatement> | <Empty>
//! <Expression>    ::= <LogicalOrExpr>
//! <LogicalOrExpr> ::= <LogicalOrExpr> Or <LogicalAndExpr> | <LogicalAndExpr>
//! ...
//! <Factor>        ::= Identifier | Number | StringLiteral | true | false
//!                   | LParen <Expression> RParen | <MethodCall>
//!                   | Not <Factor> | Plus <Factor> | Minus <Factor>
//! <Empty>         ::=
//! ```
//!
//! Precedence lives in the shape of the rules: each binary level is
//! left-recursive and its right operand is the next tighter level.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Number of grammar symbols (terminals, nonterminals and the whitespace noise symbol)
pub const SYMBOL_COUNT: usize = 68;

/// Number of productions
pub const RULE_COUNT: usize = 62;

/// Terminal / nonterminal classification of a [`Symbol`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Terminal,
    Nonterminal,
    /// Recognized by the scanner and discarded (whitespace)
    Noise,
}

/// Every grammar symbol. Discriminants are the stable symbol ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(u16)]
pub enum Symbol {
    // Terminals
    Eof = 0,
    Error = 1,
    Whitespace = 2,
    And = 3,
    Assign = 4,
    Begin = 5,
    Bool = 6,
    Colon = 7,
    Comma = 8,
    Divide = 9,
    Do = 10,
    Else = 11,
    End = 12,
    Eq = 13,
    False = 14,
    Float = 15,
    Function = 16,
    Gt = 17,
    Identifier = 18,
    If = 19,
    Int = 20,
    LParen = 21,
    Lt = 22,
    Minus = 23,
    Neq = 24,
    Not = 25,
    Number = 26,
    Or = 27,
    Plus = 28,
    Return = 29,
    RParen = 30,
    Semi = 31,
    Start = 32,
    String = 33,
    StringLiteral = 34,
    Then = 35,
    Times = 36,
    True = 37,
    Var = 38,
    While = 39,

    // Nonterminals
    AdditiveExpr = 40,
    ArgList = 41,
    ArgTail = 42,
    Assignment = 43,
    Condition = 44,
    Declaration = 45,
    Empty = 46,
    EqualityExpr = 47,
    Expression = 48,
    Factor = 49,
    LogicalAndExpr = 50,
    LogicalOrExpr = 51,
    Loop = 52,
    MethodCall = 53,
    MethodDeclaration = 54,
    MultiplicativeExpr = 55,
    OptionalArgs = 56,
    OptionalElse = 57,
    OptionalParams = 58,
    Param = 59,
    ParamList = 60,
    ParamTail = 61,
    Program = 62,
    RelationalExpr = 63,
    ReturnStatement = 64,
    Statement = 65,
    StatementList = 66,
    Type = 67,
}

use Symbol as S;

impl Symbol {
    /// All symbols in id order
    pub const ALL: [Symbol; SYMBOL_COUNT] = [
        S::Eof, S::Error, S::Whitespace, S::And, S::Assign, S::Begin, S::Bool,
        S::Colon, S::Comma, S::Divide, S::Do, S::Else, S::End, S::Eq, S::False,
        S::Float, S::Function, S::Gt, S::Identifier, S::If, S::Int, S::LParen,
        S::Lt, S::Minus, S::Neq, S::Not, S::Number, S::Or, S::Plus, S::Return,
        S::RParen, S::Semi, S::Start, S::String, S::StringLiteral, S::Then,
        S::Times, S::True, S::Var, S::While, S::AdditiveExpr, S::ArgList,
        S::ArgTail, S::Assignment, S::Condition, S::Declaration, S::Empty,
        S::EqualityExpr, S::Expression, S::Factor, S::LogicalAndExpr,
        S::LogicalOrExpr, S::Loop, S::MethodCall, S::MethodDeclaration,
        S::MultiplicativeExpr, S::OptionalArgs, S::OptionalElse,
        S::OptionalParams, S::Param, S::ParamList, S::ParamTail, S::Program,
        S::RelationalExpr, S::ReturnStatement, S::Statement, S::StatementList,
        S::Type,
    ];

    const NAMES: [&'static str; SYMBOL_COUNT] = [
        "EOF", "Error", "Whitespace", "And", "Assign", "begin", "bool", "Colon",
        "Comma", "Divide", "do", "else", "end", "Eq", "false", "float",
        "function", "Gt", "Identifier", "if", "int", "LParen", "Lt", "Minus",
        "Neq", "Not", "Number", "Or", "Plus", "return", "RParen", "Semi",
        "Start", "string", "StringLiteral", "then", "Times", "true", "var",
        "while", "<AdditiveExpr>", "<ArgList>", "<ArgTail>", "<Assignment>",
        "<Condition>", "<Declaration>", "<Empty>", "<EqualityExpr>",
        "<Expression>", "<Factor>", "<LogicalAndExpr>", "<LogicalOrExpr>",
        "<Loop>", "<MethodCall>", "<MethodDeclaration>",
        "<MultiplicativeExpr>", "<OptionalArgs>", "<OptionalElse>",
        "<OptionalParams>", "<Param>", "<ParamList>", "<ParamTail>",
        "<Program>", "<RelationalExpr>", "<ReturnStatement>", "<Statement>",
        "<StatementList>", "<Type>",
    ];

    pub fn id(self) -> u16 {
        self as u16
    }

    pub fn from_id(id: u16) -> Option<Symbol> {
        Self::ALL.get(id as usize).copied()
    }

    /// Human-readable name used in diagnostics (`Semi`, `then`, `<Factor>`)
    pub fn name(self) -> &'static str {
        Self::NAMES[self as usize]
    }

    pub fn kind(self) -> SymbolKind {
        match self.id() {
            2 => SymbolKind::Noise,
            0..=39 => SymbolKind::Terminal,
            _ => SymbolKind::Nonterminal,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.kind() == SymbolKind::Terminal
    }

    pub fn is_nonterminal(self) -> bool {
        self.kind() == SymbolKind::Nonterminal
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every production. Discriminants are the stable rule ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(u16)]
pub enum Rule {
    Program = 0,
    StatementList = 1,
    StatementDeclaration = 2,
    StatementAssignment = 3,
    StatementCondition = 4,
    StatementLoop = 5,
    StatementMethodDeclaration = 6,
    StatementMethodCall = 7,
    StatementReturn = 8,
    StatementEmpty = 9,
    Declaration = 10,
    TypeInt = 11,
    TypeFloat = 12,
    TypeString = 13,
    TypeBool = 14,
    Assignment = 15,
    Condition = 16,
    OptionalElseElse = 17,
    OptionalElseEmpty = 18,
    Loop = 19,
    MethodDeclaration = 20,
    OptionalParamsList = 21,
    OptionalParamsEmpty = 22,
    ParamList = 23,
    ParamTailComma = 24,
    ParamTailEmpty = 25,
    Param = 26,
    MethodCall = 27,
    OptionalArgsList = 28,
    OptionalArgsEmpty = 29,
    ArgList = 30,
    ArgTailComma = 31,
    ArgTailEmpty = 32,
    ReturnStatement = 33,
    Expression = 34,
    LogicalOrOr = 35,
    LogicalOrFromAnd = 36,
    LogicalAndAnd = 37,
    LogicalAndFromEquality = 38,
    EqualityEq = 39,
    EqualityNeq = 40,
    EqualityFromRelational = 41,
    RelationalLt = 42,
    RelationalGt = 43,
    RelationalFromAdditive = 44,
    AdditivePlus = 45,
    AdditiveMinus = 46,
    AdditiveFromMultiplicative = 47,
    MultiplicativeTimes = 48,
    MultiplicativeDivide = 49,
    MultiplicativeFromFactor = 50,
    FactorIdentifier = 51,
    FactorNumber = 52,
    FactorStringLiteral = 53,
    FactorTrue = 54,
    FactorFalse = 55,
    FactorParens = 56,
    FactorMethodCall = 57,
    FactorNot = 58,
    FactorPlus = 59,
    FactorMinus = 60,
    Empty = 61,
}

/// The built-in production table, indexed by rule id.
const PRODUCTIONS: [(Rule, Symbol, &[Symbol]); RULE_COUNT] = [
    (Rule::Program, S::Program, &[S::Start, S::StatementList, S::End]),
    (Rule::StatementList, S::StatementList, &[S::Statement, S::StatementList]),
    (Rule::StatementDeclaration, S::Statement, &[S::Declaration]),
    (Rule::StatementAssignment, S::Statement, &[S::Assignment]),
    (Rule::StatementCondition, S::Statement, &[S::Condition]),
    (Rule::StatementLoop, S::Statement, &[S::Loop]),
    (Rule::StatementMethodDeclaration, S::Statement, &[S::MethodDeclaration]),
    (Rule::StatementMethodCall, S::Statement, &[S::MethodCall]),
    (Rule::StatementReturn, S::Statement, &[S::ReturnStatement]),
    (Rule::StatementEmpty, S::Statement, &[S::Empty]),
    (
        Rule::Declaration,
        S::Declaration,
        &[S::Var, S::Identifier, S::Colon, S::Type, S::Semi],
    ),
    (Rule::TypeInt, S::Type, &[S::Int]),
    (Rule::TypeFloat, S::Type, &[S::Float]),
    (Rule::TypeString, S::Type, &[S::String]),
    (Rule::TypeBool, S::Type, &[S::Bool]),
    (
        Rule::Assignment,
        S::Assignment,
        &[S::Identifier, S::Assign, S::Expression, S::Semi],
    ),
    (
        Rule::Condition,
        S::Condition,
        &[S::If, S::Expression, S::Then, S::StatementList, S::OptionalElse, S::End],
    ),
    (Rule::OptionalElseElse, S::OptionalElse, &[S::Else, S::StatementList]),
    (Rule::OptionalElseEmpty, S::OptionalElse, &[S::Empty]),
    (
        Rule::Loop,
        S::Loop,
        &[S::While, S::Expression, S::Do, S::StatementList, S::End],
    ),
    (
        Rule::MethodDeclaration,
        S::MethodDeclaration,
        &[
            S::Function,
            S::Identifier,
            S::LParen,
            S::OptionalParams,
            S::RParen,
            S::Colon,
            S::Type,
            S::Begin,
            S::StatementList,
            S::End,
        ],
    ),
    (Rule::OptionalParamsList, S::OptionalParams, &[S::ParamList]),
    (Rule::OptionalParamsEmpty, S::OptionalParams, &[S::Empty]),
    (Rule::ParamList, S::ParamList, &[S::Param, S::ParamTail]),
    (Rule::ParamTailComma, S::ParamTail, &[S::Comma, S::Param, S::ParamTail]),
    (Rule::ParamTailEmpty, S::ParamTail, &[S::Empty]),
    (Rule::Param, S::Param, &[S::Identifier, S::Colon, S::Type]),
    (
        Rule::MethodCall,
        S::MethodCall,
        &[S::Identifier, S::LParen, S::OptionalArgs, S::RParen, S::Semi],
    ),
    (Rule::OptionalArgsList, S::OptionalArgs, &[S::ArgList]),
    (Rule::OptionalArgsEmpty, S::OptionalArgs, &[S::Empty]),
    (Rule::ArgList, S::ArgList, &[S::Expression, S::ArgTail]),
    (Rule::ArgTailComma, S::ArgTail, &[S::Comma, S::Expression, S::ArgTail]),
    (Rule::ArgTailEmpty, S::ArgTail, &[S::Empty]),
    (Rule::ReturnStatement, S::ReturnStatement, &[S::Return, S::Expression, S::Semi]),
    (Rule::Expression, S::Expression, &[S::LogicalOrExpr]),
    (
        Rule::LogicalOrOr,
        S::LogicalOrExpr,
        &[S::LogicalOrExpr, S::Or, S::LogicalAndExpr],
    ),
    (Rule::LogicalOrFromAnd, S::LogicalOrExpr, &[S::LogicalAndExpr]),
    (
        Rule::LogicalAndAnd,
        S::LogicalAndExpr,
        &[S::LogicalAndExpr, S::And, S::EqualityExpr],
    ),
    (Rule::LogicalAndFromEquality, S::LogicalAndExpr, &[S::EqualityExpr]),
    (
        Rule::EqualityEq,
        S::EqualityExpr,
        &[S::EqualityExpr, S::Eq, S::RelationalExpr],
    ),
    (
        Rule::EqualityNeq,
        S::EqualityExpr,
        &[S::EqualityExpr, S::Neq, S::RelationalExpr],
    ),
    (Rule::EqualityFromRelational, S::EqualityExpr, &[S::RelationalExpr]),
    (
        Rule::RelationalLt,
        S::RelationalExpr,
        &[S::RelationalExpr, S::Lt, S::AdditiveExpr],
    ),
    (
        Rule::RelationalGt,
        S::RelationalExpr,
        &[S::RelationalExpr, S::Gt, S::AdditiveExpr],
    ),
    (Rule::RelationalFromAdditive, S::RelationalExpr, &[S::AdditiveExpr]),
    (
        Rule::AdditivePlus,
        S::AdditiveExpr,
        &[S::AdditiveExpr, S::Plus, S::MultiplicativeExpr],
    ),
    (
        Rule::AdditiveMinus,
        S::AdditiveExpr,
        &[S::AdditiveExpr, S::Minus, S::MultiplicativeExpr],
    ),
    (Rule::AdditiveFromMultiplicative, S::AdditiveExpr, &[S::MultiplicativeExpr]),
    (
        Rule::MultiplicativeTimes,
        S::MultiplicativeExpr,
        &[S::MultiplicativeExpr, S::Times, S::Factor],
    ),
    (
        Rule::MultiplicativeDivide,
        S::MultiplicativeExpr,
        &[S::MultiplicativeExpr, S::Divide, S::Factor],
    ),
    (Rule::MultiplicativeFromFactor, S::MultiplicativeExpr, &[S::Factor]),
    (Rule::FactorIdentifier, S::Factor, &[S::Identifier]),
    (Rule::FactorNumber, S::Factor, &[S::Number]),
    (Rule::FactorStringLiteral, S::Factor, &[S::StringLiteral]),
    (Rule::FactorTrue, S::Factor, &[S::True]),
    (Rule::FactorFalse, S::Factor, &[S::False]),
    (Rule::FactorParens, S::Factor, &[S::LParen, S::Expression, S::RParen]),
    (Rule::FactorMethodCall, S::Factor, &[S::MethodCall]),
    (Rule::FactorNot, S::Factor, &[S::Not, S::Factor]),
    (Rule::FactorPlus, S::Factor, &[S::Plus, S::Factor]),
    (Rule::FactorMinus, S::Factor, &[S::Minus, S::Factor]),
    (Rule::Empty, S::Empty, &[]),
];

impl Rule {
    /// All rules in id order
    pub fn all() -> impl Iterator<Item = Rule> {
        PRODUCTIONS.iter().map(|(rule, _, _)| *rule)
    }

    pub fn id(self) -> u16 {
        self as u16
    }

    pub fn from_id(id: u16) -> Option<Rule> {
        PRODUCTIONS.get(id as usize).map(|(rule, _, _)| *rule)
    }

    /// Left-hand side in the built-in table
    pub fn lhs(self) -> Symbol {
        PRODUCTIONS[self as usize].1
    }

    /// Right-hand side in the built-in table
    pub fn rhs(self) -> &'static [Symbol] {
        PRODUCTIONS[self as usize].2
    }

    pub fn arity(self) -> usize {
        self.rhs().len()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ::=", self.lhs())?;
        for symbol in self.rhs() {
            write!(f, " {}", symbol)?;
        }
        Ok(())
    }
}

/// Grammar table loading errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarLoadError {
    #[error("expected {expected} productions, found {found}")]
    RuleCount { expected: usize, found: usize },
    #[error("undefined rule id {0}")]
    UndefinedRule(u16),
    #[error("rule id {found} listed at position {position}; rules must appear in id order")]
    RuleOutOfOrder { position: usize, found: u16 },
    #[error("rule {rule} references undefined symbol id {symbol}")]
    UndefinedSymbol { rule: u16, symbol: u16 },
    #[error("rule {rule}: left-hand side {symbol} is not a nonterminal")]
    TerminalLhs { rule: u16, symbol: Symbol },
    #[error("rule {rule}: left-hand side is {found}, expected {expected}")]
    LhsMismatch {
        rule: u16,
        expected: Symbol,
        found: Symbol,
    },
    #[error("rule {rule}: {symbol} cannot appear on a right-hand side")]
    ReservedSymbol { rule: u16, symbol: Symbol },
    #[error("rule {rule}: right-hand side has {found} symbols, expected {expected}")]
    ArityMismatch {
        rule: u16,
        expected: usize,
        found: usize,
    },
    #[error("rule {rule}: right-hand side is `{}`, expected `{}`", join_names(.found), join_names(.expected))]
    RhsMismatch {
        rule: u16,
        expected: Vec<Symbol>,
        found: Vec<Symbol>,
    },
    #[error("malformed grammar table: {0}")]
    Format(String),
}

/// Persisted form of a production: integer ids only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionRecord {
    pub rule: u16,
    pub lhs: u16,
    pub rhs: Vec<u16>,
}

/// A validated production
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub rule: Rule,
    pub lhs: Symbol,
    pub rhs: Vec<Symbol>,
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ::=", self.lhs)?;
        for symbol in &self.rhs {
            write!(f, " {}", symbol)?;
        }
        Ok(())
    }
}

/// Immutable grammar model shared by every parse
#[derive(Debug)]
pub struct Grammar {
    productions: Vec<Production>,
    by_lhs: FxHashMap<Symbol, Vec<Rule>>,
    first: FxHashMap<Symbol, Vec<Symbol>>,
    nullable: FxHashSet<Symbol>,
}

static STANDARD: OnceLock<Result<Grammar, GrammarLoadError>> = OnceLock::new();

impl Grammar {
    /// The built-in grammar, built on first use and shared afterwards
    pub fn standard() -> Result<&'static Grammar, GrammarLoadError> {
        STANDARD
            .get_or_init(|| Grammar::from_records(&Grammar::builtin_records()))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// The built-in production table in persisted form
    pub fn builtin_records() -> Vec<ProductionRecord> {
        PRODUCTIONS
            .iter()
            .map(|(rule, lhs, rhs)| ProductionRecord {
                rule: rule.id(),
                lhs: lhs.id(),
                rhs: rhs.iter().map(|s| s.id()).collect(),
            })
            .collect()
    }

    /// Load a production table from its JSON form
    pub fn from_json(text: &str) -> Result<Grammar, GrammarLoadError> {
        let records: Vec<ProductionRecord> =
            serde_json::from_str(text).map_err(|e| GrammarLoadError::Format(e.to_string()))?;
        Self::from_records(&records)
    }

    /// Validate a production table and derive FIRST/nullable sets
    pub fn from_records(records: &[ProductionRecord]) -> Result<Grammar, GrammarLoadError> {
        if records.len() != RULE_COUNT {
            return Err(GrammarLoadError::RuleCount {
                expected: RULE_COUNT,
                found: records.len(),
            });
        }

        let mut productions = Vec::with_capacity(RULE_COUNT);
        for (position, record) in records.iter().enumerate() {
            let rule =
                Rule::from_id(record.rule).ok_or(GrammarLoadError::UndefinedRule(record.rule))?;
            if rule as usize != position {
                return Err(GrammarLoadError::RuleOutOfOrder {
                    position,
                    found: record.rule,
                });
            }

            let lhs = resolve_symbol(record.rule, record.lhs)?;
            if !lhs.is_nonterminal() {
                return Err(GrammarLoadError::TerminalLhs {
                    rule: record.rule,
                    symbol: lhs,
                });
            }
            if lhs != rule.lhs() {
                return Err(GrammarLoadError::LhsMismatch {
                    rule: record.rule,
                    expected: rule.lhs(),
                    found: lhs,
                });
            }

            let rhs = record
                .rhs
                .iter()
                .map(|&id| resolve_symbol(record.rule, id))
                .collect::<Result<Vec<_>, _>>()?;
            if let Some(&symbol) = rhs
                .iter()
                .find(|s| matches!(s, S::Eof | S::Error | S::Whitespace))
            {
                return Err(GrammarLoadError::ReservedSymbol {
                    rule: record.rule,
                    symbol,
                });
            }
            if rhs.len() != rule.arity() {
                return Err(GrammarLoadError::ArityMismatch {
                    rule: record.rule,
                    expected: rule.arity(),
                    found: rhs.len(),
                });
            }
            // The descent hard-codes each rule's shape, so a table may only
            // restate it
            if rhs != rule.rhs() {
                return Err(GrammarLoadError::RhsMismatch {
                    rule: record.rule,
                    expected: rule.rhs().to_vec(),
                    found: rhs,
                });
            }

            productions.push(Production { rule, lhs, rhs });
        }

        let mut by_lhs: FxHashMap<Symbol, Vec<Rule>> = FxHashMap::default();
        for production in &productions {
            by_lhs.entry(production.lhs).or_default().push(production.rule);
        }

        let (nullable, first) = first_sets(&productions);

        Ok(Grammar {
            productions,
            by_lhs,
            first,
            nullable,
        })
    }

    /// Export the table in persisted form
    pub fn to_records(&self) -> Vec<ProductionRecord> {
        self.productions
            .iter()
            .map(|p| ProductionRecord {
                rule: p.rule.id(),
                lhs: p.lhs.id(),
                rhs: p.rhs.iter().map(|s| s.id()).collect(),
            })
            .collect()
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, rule: Rule) -> &Production {
        &self.productions[rule as usize]
    }

    pub fn lhs(&self, rule: Rule) -> Symbol {
        self.production(rule).lhs
    }

    pub fn arity(&self, rule: Rule) -> usize {
        self.production(rule).rhs.len()
    }

    /// Rules whose left-hand side is `symbol`, in id order
    pub fn rules_for(&self, symbol: Symbol) -> &[Rule] {
        self.by_lhs.get(&symbol).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Terminals that can begin `symbol`, sorted by id
    pub fn first(&self, symbol: Symbol) -> &[Symbol] {
        self.first.get(&symbol).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_nullable(&self, symbol: Symbol) -> bool {
        self.nullable.contains(&symbol)
    }
}

fn join_names(symbols: &[Symbol]) -> String {
    symbols
        .iter()
        .map(|s| s.name())
        .collect::<Vec<_>>()
        .join(" ")
}

fn resolve_symbol(rule: u16, id: u16) -> Result<Symbol, GrammarLoadError> {
    Symbol::from_id(id).ok_or(GrammarLoadError::UndefinedSymbol { rule, symbol: id })
}

/// Fixpoint computation of nullable nonterminals and FIRST sets
fn first_sets(
    productions: &[Production],
) -> (FxHashSet<Symbol>, FxHashMap<Symbol, Vec<Symbol>>) {
    let mut nullable: FxHashSet<Symbol> = FxHashSet::default();
    let mut first: FxHashMap<Symbol, FxHashSet<Symbol>> = FxHashMap::default();
    for symbol in Symbol::ALL.iter().filter(|s| s.is_terminal()) {
        first.entry(*symbol).or_default().insert(*symbol);
    }

    let mut changed = true;
    while changed {
        changed = false;
        for production in productions {
            let mut rhs_nullable = true;
            for symbol in &production.rhs {
                let additions: Vec<Symbol> = first
                    .get(symbol)
                    .map(|set| set.iter().copied().collect())
                    .unwrap_or_default();
                let entry = first.entry(production.lhs).or_default();
                for terminal in additions {
                    changed |= entry.insert(terminal);
                }
                if !nullable.contains(symbol) {
                    rhs_nullable = false;
                    break;
                }
            }
            if rhs_nullable && nullable.insert(production.lhs) {
                changed = true;
            }
        }
    }

    let first = first
        .into_iter()
        .map(|(symbol, set)| {
            let mut terminals: Vec<Symbol> = set.into_iter().collect();
            terminals.sort();
            (symbol, terminals)
        })
        .collect();

    (nullable, first)
}
