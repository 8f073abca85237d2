//! TypeScript tokenizer.
//!
//! Tokens carry a `newline_before` flag so the parser can apply automatic
//! semicolon insertion. Whether `/` starts a regular expression is decided
//! from the token before it.

pub mod lexer;
pub mod token;

pub use lexer::Lexer;
pub use token::{Token, TokenKind};
