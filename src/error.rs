// ABOUTME: Structured error types for the lexer, parser, and evaluator
// Display impls produce the message fragment; callers wrap it with file/line via DiagnosticSink

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("Unterminated string")]
    UnterminatedString,

    #[error("Unterminated character literal")]
    UnterminatedChar,

    #[error("Character literal must contain exactly one character")]
    InvalidChar,

    #[error("Unexpected character '{0}'")]
    UnexpectedChar(char),

    #[error("Expected '&' to form '&&'")]
    LoneAmpersand,

    #[error("Expected '|' to form '||'")]
    LonePipe,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Expect expression.")]
    ExpectExpression,

    #[error("Expect '{0}'.")]
    ExpectToken(String),

    #[error("Expect variable name.")]
    ExpectVariableName,

    #[error("Expect function name.")]
    ExpectFunctionName,

    #[error("Expect parameter name.")]
    ExpectParameterName,

    #[error("Invalid assignment target.")]
    InvalidAssignmentTarget,

    #[error("Can't have more than 255 {0}.")]
    TooMany(&'static str),

    #[error("Expect import path string.")]
    ExpectImportPath,
}

#[derive(Error, Debug, Clone)]
pub enum RuntimeError {
    #[error("Undefined variable '{0}'.")]
    UndefinedVariable(String),

    #[error("Operand must be a number.")]
    OperandMustBeNumber,

    #[error("Operands must be numbers.")]
    OperandsMustBeNumbers,

    #[error("Division by zero.")]
    DivisionByZero,

    #[error("Can only index into a list.")]
    NotIndexable,

    #[error("List index must be an integer.")]
    IndexMustBeInteger,

    #[error("Index out of range.")]
    IndexOutOfRange,

    #[error("Can only call functions and native callables.")]
    NotCallable,

    #[error("Expected {expected} arguments but got {actual}.")]
    ArityMismatch { expected: String, actual: usize },

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Cannot find module: {0}")]
    ModuleNotFound(String),

    #[error("Cannot import module: import cycle detected for {0}")]
    ImportCycle(String),

    #[error("Cannot open file {path}: {message}")]
    FileError { path: String, message: String },

    #[error("{0}")]
    Custom(String),
}

impl RuntimeError {
    pub fn arity(expected: impl Into<String>, actual: usize) -> Self {
        RuntimeError::ArityMismatch {
            expected: expected.into(),
            actual,
        }
    }
}
