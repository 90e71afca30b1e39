// ABOUTME: Converts source text into a token stream, reporting but not halting on bad input

use crate::error::LexError;
use crate::token::{keyword_kind, Literal, Token, TokenKind};

/// A lexer error tagged with the line it occurred on, ready to hand to a
/// diagnostic sink.
#[derive(Debug, Clone)]
pub struct LexErrorAt {
    pub line: usize,
    pub error: LexError,
}

pub struct Lexer {
    chars: Vec<char>,
    start: usize,
    current: usize,
    line: usize,
    tokens: Vec<Token>,
    errors: Vec<LexErrorAt>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            chars: source.chars().collect(),
            start: 0,
            current: 0,
            line: 1,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Scans the whole source, accumulating every token it can and reporting
    /// every lexical error it hits, without stopping at the first one.
    pub fn scan_tokens(mut self) -> (Vec<Token>, Vec<LexErrorAt>) {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }
        self.tokens.push(Token::eof(self.line));
        (self.tokens, self.errors)
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.current];
        self.current += 1;
        c
    }

    fn peek(&self) -> char {
        self.chars.get(self.current).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.chars.get(self.current + 1).copied().unwrap_or('\0')
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.chars[self.current] != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn lexeme(&self) -> String {
        self.chars[self.start..self.current].iter().collect()
    }

    fn add_token(&mut self, kind: TokenKind) {
        self.add_token_literal(kind, None);
    }

    fn add_token_literal(&mut self, kind: TokenKind, literal: Option<Literal>) {
        let lexeme = self.lexeme();
        self.tokens.push(Token::new(kind, lexeme, literal, self.line));
    }

    fn error(&mut self, error: LexError) {
        self.errors.push(LexErrorAt { line: self.line, error });
    }

    fn scan_token(&mut self) {
        let c = self.advance();
        match c {
            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),
            '{' => self.add_token(TokenKind::LeftBrace),
            '}' => self.add_token(TokenKind::RightBrace),
            '[' => self.add_token(TokenKind::LeftBracket),
            ']' => self.add_token(TokenKind::RightBracket),
            ',' => self.add_token(TokenKind::Comma),
            '.' => self.add_token(TokenKind::Dot),
            ';' => self.add_token(TokenKind::Semicolon),
            '+' => self.add_token(TokenKind::Plus),
            '-' => self.add_token(TokenKind::Minus),
            '*' => self.add_token(TokenKind::Star),
            '!' => {
                let kind = if self.matches('=') { TokenKind::BangEqual } else { TokenKind::Bang };
                self.add_token(kind);
            }
            '=' => {
                let kind = if self.matches('=') { TokenKind::EqualEqual } else { TokenKind::Equal };
                self.add_token(kind);
            }
            '<' => {
                let kind = if self.matches('=') { TokenKind::LessEqual } else { TokenKind::Less };
                self.add_token(kind);
            }
            '>' => {
                let kind = if self.matches('=') { TokenKind::GreaterEqual } else { TokenKind::Greater };
                self.add_token(kind);
            }
            '&' => {
                if self.matches('&') {
                    self.add_token(TokenKind::AmpAmp);
                } else {
                    self.error(LexError::LoneAmpersand);
                }
            }
            '|' => {
                if self.matches('|') {
                    self.add_token(TokenKind::PipePipe);
                } else {
                    self.error(LexError::LonePipe);
                }
            }
            '/' => {
                if self.matches('/') {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else {
                    self.add_token(TokenKind::Slash);
                }
            }
            ' ' | '\r' | '\t' => {}
            '\n' => self.line += 1,
            '"' => self.string(),
            '\'' => self.character(),
            _ if c.is_ascii_digit() => self.number(),
            _ if c.is_alphabetic() || c == '_' => self.identifier(),
            other => self.error(LexError::UnexpectedChar(other)),
        }
    }

    fn string(&mut self) {
        let mut value = String::new();
        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            value.push(self.advance());
        }
        if self.is_at_end() {
            self.error(LexError::UnterminatedString);
            return;
        }
        self.advance(); // closing quote
        self.add_token_literal(TokenKind::String, Some(Literal::String(value)));
    }

    fn character(&mut self) {
        if self.is_at_end() || self.peek() == '\'' {
            self.error(LexError::InvalidChar);
            return;
        }
        let ch = self.advance();
        if self.peek() != '\'' {
            self.error(LexError::UnterminatedChar);
            return;
        }
        self.advance(); // closing quote
        self.add_token_literal(TokenKind::Char, Some(Literal::Char(ch)));
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        let mut is_float = false;
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            is_float = true;
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }
        let text = self.lexeme();
        if is_float {
            let value: f64 = text.parse().expect("lexer only admits valid float digits");
            self.add_token_literal(TokenKind::Number, Some(Literal::Float(value)));
        } else {
            let value: i64 = text.parse().expect("lexer only admits valid integer digits");
            self.add_token_literal(TokenKind::Number, Some(Literal::Integer(value)));
        }
    }

    fn identifier(&mut self) {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }
        let text = self.lexeme();
        match keyword_kind(&text) {
            Some(TokenKind::True) => self.add_token_literal(TokenKind::True, Some(Literal::Bool(true))),
            Some(TokenKind::False) => self.add_token_literal(TokenKind::False, Some(Literal::Bool(false))),
            Some(kind) => self.add_token(kind),
            None => self.add_token(TokenKind::Identifier),
        }
    }
}
