//! Parse error types

use tsdual_ast::Span;
use std::fmt;

/// A syntax error, carrying the TypeScript diagnostic code that describes
/// it (`1005` for "'x' expected.", `1109` for "Expression expected.", ...).
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
    pub code: u32,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span, code: u32) -> Self {
        Self {
            message: message.into(),
            span,
            code,
        }
    }

    /// `'x' expected.`
    pub fn expected(what: &str, span: Span) -> Self {
        Self::new(format!("'{}' expected.", what), span, 1005)
    }

    /// Lexer error tokens carry their message; map it back to a code.
    pub fn from_lexer(message: &str, span: Span) -> Self {
        let code = match message {
            "Unterminated string literal." => 1002,
            "'*/' expected." => 1010,
            "Unterminated template literal." => 1160,
            "Unterminated regular expression literal." => 1161,
            _ => 1127,
        };
        let message = if code == 1127 { "Invalid character." } else { message };
        Self::new(message, span, code)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TS{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;
