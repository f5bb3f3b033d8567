//! Lexer (tokenizer) for Start/end source text
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the
//! parser. Every character is classified into exactly one terminal symbol or
//! discarded as whitespace. Malformed input never aborts the scan: it becomes
//! an [`Symbol::Error`] token carrying the reason, and scanning resumes after
//! it. The stream always ends with [`Symbol::Eof`].

use super::ast::SourceLocation;
use super::grammar::{Symbol, SymbolKind};
use serde::Serialize;
use std::fmt;

/// Literal payload attached to a token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TokenValue {
    Name(String),
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    /// Why an `Error` token could not be classified
    Invalid(String),
}

/// A classified piece of source text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub symbol: Symbol,
    pub value: Option<TokenValue>,
    /// Source text exactly as written
    pub lexeme: String,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(symbol: Symbol, lexeme: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            symbol,
            value: None,
            lexeme: lexeme.into(),
            location,
        }
    }

    pub fn with_value(mut self, value: TokenValue) -> Self {
        self.value = Some(value);
        self
    }

    pub fn eof(location: SourceLocation) -> Self {
        Self::new(Symbol::Eof, "", location)
    }

    /// Whether the token can be handed to the parser as-is: a terminal
    /// symbol, with the payload its symbol requires.
    pub fn is_well_formed(&self) -> bool {
        if self.symbol.kind() != SymbolKind::Terminal {
            return false;
        }
        match self.symbol {
            Symbol::Identifier => matches!(self.value, Some(TokenValue::Name(_))),
            Symbol::Number => matches!(
                self.value,
                Some(TokenValue::Integer(_)) | Some(TokenValue::Float(_))
            ),
            Symbol::StringLiteral => matches!(self.value, Some(TokenValue::Text(_))),
            _ => true,
        }
    }

    /// The reason carried by an `Error` token
    pub fn invalid_reason(&self) -> Option<&str> {
        match &self.value {
            Some(TokenValue::Invalid(reason)) => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.symbol {
            Symbol::Eof => write!(f, "end of input"),
            Symbol::Error => write!(f, "invalid input '{}'", self.lexeme),
            Symbol::Identifier => write!(f, "identifier '{}'", self.lexeme),
            Symbol::Number => write!(f, "number {}", self.lexeme),
            Symbol::StringLiteral => write!(f, "string {}", self.lexeme),
            _ => write!(f, "'{}'", self.lexeme),
        }
    }
}

/// Lexer for Start/end source text
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();

            if self.is_at_end() {
                tokens.push(Token::eof(self.current_location()));
                break;
            }

            tokens.push(self.next_token());
        }

        tokens
    }

    /// Get next token
    fn next_token(&mut self) -> Token {
        let start = self.position;
        let loc = self.current_location();
        let Some(ch) = self.advance() else {
            return Token::eof(loc);
        };

        let symbol = match ch {
            '"' => return self.string_literal(start, loc),
            '0'..='9' => return self.number_literal(start, loc),
            'a'..='z' | 'A'..='Z' | '_' => return self.identifier_or_keyword(start, loc),

            ':' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Symbol::Assign
                } else {
                    Symbol::Colon
                }
            }
            '<' => {
                if self.peek() == Some('>') {
                    self.advance();
                    Symbol::Neq
                } else {
                    Symbol::Lt
                }
            }
            '>' => Symbol::Gt,
            '=' => Symbol::Eq,
            '+' => Symbol::Plus,
            '-' => Symbol::Minus,
            '*' => Symbol::Times,
            '/' => Symbol::Divide,
            '(' => Symbol::LParen,
            ')' => Symbol::RParen,
            ',' => Symbol::Comma,
            ';' => Symbol::Semi,

            _ => {
                return Token::new(Symbol::Error, ch.to_string(), loc).with_value(
                    TokenValue::Invalid(format!("unexpected character '{}'", ch)),
                );
            }
        };

        Token::new(symbol, self.lexeme_from(start), loc)
    }

    /// Parse string literal. The opening quote has been consumed.
    fn string_literal(&mut self, start: usize, loc: SourceLocation) -> Token {
        let mut string = String::new();
        let mut problem: Option<String> = None;

        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Token::new(Symbol::Error, self.lexeme_from(start), loc).with_value(
                        TokenValue::Invalid("unterminated string literal".to_string()),
                    );
                }
                Some('"') => {
                    self.advance(); // closing quote
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        Some('"') => string.push('"'),
                        Some('\\') => string.push('\\'),
                        Some('n') => string.push('\n'),
                        Some('t') => string.push('\t'),
                        // Leave the line break for the unterminated check
                        None | Some('\n') => continue,
                        Some(other) => {
                            if problem.is_none() {
                                problem = Some(format!("unknown escape sequence '\\{}'", other));
                            }
                        }
                    }
                    self.advance();
                }
                Some(ch) => {
                    string.push(ch);
                    self.advance();
                }
            }
        }

        let lexeme = self.lexeme_from(start);
        match problem {
            Some(reason) => {
                Token::new(Symbol::Error, lexeme, loc).with_value(TokenValue::Invalid(reason))
            }
            None => Token::new(Symbol::StringLiteral, lexeme, loc)
                .with_value(TokenValue::Text(string)),
        }
    }

    /// Parse numeric literal: `[0-9]+` or `[0-9]+.[0-9]+`
    fn number_literal(&mut self, start: usize, loc: SourceLocation) -> Token {
        self.consume_digits();

        let is_float = self.peek() == Some('.')
            && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit());
        if is_float {
            self.advance(); // '.'
            self.consume_digits();
        }

        let lexeme = self.lexeme_from(start);
        let value = if is_float {
            lexeme.parse::<f64>().map(TokenValue::Float).ok()
        } else {
            lexeme.parse::<i64>().map(TokenValue::Integer).ok()
        };

        match value {
            Some(value) => Token::new(Symbol::Number, lexeme, loc).with_value(value),
            None => {
                let reason = format!("number literal out of range: {}", lexeme);
                Token::new(Symbol::Error, lexeme, loc).with_value(TokenValue::Invalid(reason))
            }
        }
    }

    fn consume_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, start: usize, loc: SourceLocation) -> Token {
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }

        let ident = self.lexeme_from(start);

        // Keywords are case-sensitive
        let keyword = match ident.as_str() {
            "Start" => Some(Symbol::Start),
            "end" => Some(Symbol::End),
            "var" => Some(Symbol::Var),
            "if" => Some(Symbol::If),
            "then" => Some(Symbol::Then),
            "else" => Some(Symbol::Else),
            "while" => Some(Symbol::While),
            "do" => Some(Symbol::Do),
            "function" => Some(Symbol::Function),
            "begin" => Some(Symbol::Begin),
            "return" => Some(Symbol::Return),
            "int" => Some(Symbol::Int),
            "float" => Some(Symbol::Float),
            "string" => Some(Symbol::String),
            "bool" => Some(Symbol::Bool),
            "and" => Some(Symbol::And),
            "or" => Some(Symbol::Or),
            "not" => Some(Symbol::Not),
            "true" | "false" => None,
            _ => {
                let name = ident.clone();
                return Token::new(Symbol::Identifier, ident, loc)
                    .with_value(TokenValue::Name(name));
            }
        };

        match keyword {
            Some(symbol) => Token::new(symbol, ident, loc),
            None => {
                let value = ident == "true";
                let symbol = if value { Symbol::True } else { Symbol::False };
                Token::new(symbol, ident, loc).with_value(TokenValue::Boolean(value))
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\r' | '\n')) {
            self.advance();
        }
    }

    fn lexeme_from(&self, start: usize) -> String {
        self.input[start..self.position].iter().collect()
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(source: &str) -> Vec<Symbol> {
        Lexer::new(source)
            .tokenize()
            .iter()
            .map(|t| t.symbol)
            .collect()
    }

    #[test]
    fn test_simple_program() {
        let tokens = Lexer::new("Start x := 1; end").tokenize();

        assert_eq!(tokens[0].symbol, Symbol::Start);
        assert_eq!(tokens[1].symbol, Symbol::Identifier);
        assert_eq!(tokens[1].value, Some(TokenValue::Name("x".to_string())));
        assert_eq!(tokens[2].symbol, Symbol::Assign);
        assert_eq!(tokens[3].value, Some(TokenValue::Integer(1)));
        assert_eq!(tokens[4].symbol, Symbol::Semi);
        assert_eq!(tokens[5].symbol, Symbol::End);
        assert_eq!(tokens[6].symbol, Symbol::Eof);
        assert_eq!(tokens[6].location, SourceLocation::new(1, 18));
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            symbols(": := = <> < > + - * / ( ) , ;"),
            vec![
                Symbol::Colon,
                Symbol::Assign,
                Symbol::Eq,
                Symbol::Neq,
                Symbol::Lt,
                Symbol::Gt,
                Symbol::Plus,
                Symbol::Minus,
                Symbol::Times,
                Symbol::Divide,
                Symbol::LParen,
                Symbol::RParen,
                Symbol::Comma,
                Symbol::Semi,
                Symbol::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(
            symbols("Start start and or not true"),
            vec![
                Symbol::Start,
                Symbol::Identifier,
                Symbol::And,
                Symbol::Or,
                Symbol::Not,
                Symbol::True,
                Symbol::Eof,
            ]
        );
    }

    #[test]
    fn test_locations_span_lines() {
        let tokens = Lexer::new("Start\n  var x: int;\nend").tokenize();

        assert_eq!(tokens[1].location, SourceLocation::new(2, 3));
        assert_eq!(tokens[2].location, SourceLocation::new(2, 7));
        assert_eq!(tokens[6].location, SourceLocation::new(3, 1));
    }

    #[test]
    fn test_numbers() {
        let tokens = Lexer::new("42 3.25 7.").tokenize();

        assert_eq!(tokens[0].value, Some(TokenValue::Integer(42)));
        assert_eq!(tokens[1].value, Some(TokenValue::Float(3.25)));
        assert_eq!(tokens[1].lexeme, "3.25");
        // A trailing dot is not part of the number
        assert_eq!(tokens[2].value, Some(TokenValue::Integer(7)));
        assert_eq!(tokens[3].symbol, Symbol::Error);
    }

    #[test]
    fn test_integer_out_of_range() {
        let tokens = Lexer::new("99999999999999999999").tokenize();

        assert_eq!(tokens[0].symbol, Symbol::Error);
        assert!(tokens[0].invalid_reason().unwrap().contains("out of range"));
    }

    #[test]
    fn test_string_literal() {
        let tokens = Lexer::new(r#""say \"hi\"\n\tnow""#).tokenize();

        assert_eq!(tokens[0].symbol, Symbol::StringLiteral);
        assert_eq!(
            tokens[0].value,
            Some(TokenValue::Text("say \"hi\"\n\tnow".to_string()))
        );
        assert_eq!(tokens[1].symbol, Symbol::Eof);
    }

    #[test]
    fn test_bad_strings_become_error_tokens() {
        let tokens = Lexer::new("\"open\nx").tokenize();
        assert_eq!(tokens[0].symbol, Symbol::Error);
        assert_eq!(tokens[0].lexeme, "\"open");
        assert_eq!(tokens[1].symbol, Symbol::Identifier);

        let tokens = Lexer::new(r#""a\qb" y"#).tokenize();
        assert_eq!(tokens[0].symbol, Symbol::Error);
        assert_eq!(tokens[0].invalid_reason(), Some("unknown escape sequence '\\q'"));
        assert_eq!(tokens[1].symbol, Symbol::Identifier);
    }

    #[test]
    fn test_unexpected_character_continues() {
        let tokens = Lexer::new("x @ y").tokenize();

        assert_eq!(tokens[1].symbol, Symbol::Error);
        assert_eq!(tokens[1].to_string(), "invalid input '@'");
        assert_eq!(tokens[1].location, SourceLocation::new(1, 3));
        assert_eq!(tokens[2].symbol, Symbol::Identifier);
        assert_eq!(tokens[3].symbol, Symbol::Eof);
    }

    #[test]
    fn test_well_formed() {
        let loc = SourceLocation::new(1, 1);
        assert!(Token::new(Symbol::Semi, ";", loc).is_well_formed());
        assert!(!Token::new(Symbol::Identifier, "x", loc).is_well_formed());
        assert!(!Token::new(Symbol::Whitespace, " ", loc).is_well_formed());
        assert!(!Token::new(Symbol::Factor, "x", loc).is_well_formed());
    }
}
