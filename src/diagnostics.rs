// ABOUTME: Diagnostic sink abstraction — decouples error content from error destination
// Default sink matches the exact wire format mandated for lexer/parser/runtime diagnostics

use crate::error::{LexError, ParseError, RuntimeError};
use crate::token::{Token, TokenKind};
use std::fmt;

/// A single reported diagnostic, already classified by pipeline stage.
#[derive(Debug, Clone)]
pub enum Diagnostic {
    Lex {
        file: String,
        line: usize,
        error: LexError,
    },
    Parse {
        token: Option<Token>,
        error: ParseError,
    },
    Runtime {
        file: String,
        line: Option<usize>,
        error: RuntimeError,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Lex { file, line, error } => {
                write!(f, "Lexer Error in {} at line {}: {}", file, line, error)
            }
            Diagnostic::Parse { token, error } => match token {
                None => write!(f, "Parse Error at end: {}", error),
                Some(t) if t.kind == TokenKind::Eof => {
                    write!(f, "Parse Error at end: {}", error)
                }
                Some(t) => write!(f, "Parse Error at '{}': {}", t.lexeme, error),
            },
            Diagnostic::Runtime { file, line, error } => {
                let line_str = line
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                write!(f, "Error in {} at line {}: {}", file, line_str, error)
            }
        }
    }
}

/// Pluggable destination for diagnostics raised anywhere in the pipeline.
///
/// The default implementation writes to stdout, matching the language's documented
/// behavior (diagnostics are intentionally not on stderr, so downstream tooling that
/// captures a script's stdout sees its own errors inline).
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// The default sink: writes each diagnostic's `Display` form to stdout, one per line.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl DiagnosticSink for StdoutSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        println!("{}", diagnostic);
    }
}

/// A sink that collects diagnostics in memory instead of printing them, for tests
/// and embedders that want to inspect or re-render errors themselves.
///
/// Cloning shares the same backing list, so a caller can clone a handle before
/// handing the sink's `Box<dyn DiagnosticSink>` off to an `Interpreter` and
/// still inspect what was reported afterward.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    diagnostics: std::rc::Rc<std::cell::RefCell<Vec<Diagnostic>>>,
}

impl DiagnosticSink for CollectingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rendered(&self) -> Vec<String> {
        self.diagnostics.borrow().iter().map(|d| d.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_diagnostic_format() {
        let d = Diagnostic::Lex {
            file: "main.ms".to_string(),
            line: 3,
            error: LexError::UnterminatedString,
        };
        assert_eq!(
            d.to_string(),
            "Lexer Error in main.ms at line 3: Unterminated string"
        );
    }

    #[test]
    fn parse_diagnostic_at_eof() {
        let d = Diagnostic::Parse {
            token: None,
            error: ParseError::ExpectExpression,
        };
        assert_eq!(d.to_string(), "Parse Error at end: Expect expression.");
    }

    #[test]
    fn parse_diagnostic_at_token() {
        let token = Token::new(TokenKind::Semicolon, ";", None, 1);
        let d = Diagnostic::Parse {
            token: Some(Token::new(TokenKind::RightParen, ")", None, 2)),
            error: ParseError::ExpectToken(";".to_string()),
        };
        assert_eq!(d.to_string(), "Parse Error at ')': Expect ';'.");
        let _ = token;
    }

    #[test]
    fn runtime_diagnostic_without_line() {
        let d = Diagnostic::Runtime {
            file: "main.ms".to_string(),
            line: None,
            error: RuntimeError::UndefinedVariable("x".to_string()),
        };
        assert_eq!(
            d.to_string(),
            "Error in main.ms at unknown: Undefined variable 'x'."
        );
    }

    #[test]
    fn collecting_sink_records_diagnostics() {
        let mut sink = CollectingSink::new();
        sink.report(Diagnostic::Runtime {
            file: "f".to_string(),
            line: Some(5),
            error: RuntimeError::DivisionByZero,
        });
        assert_eq!(sink.rendered(), vec!["Error in f at line 5: Division by zero."]);
    }
}
