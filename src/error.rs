// ABOUTME: Error types for the lex/parse/resolve/evaluate phases

use crate::token::Token;
use thiserror::Error;

/// Renders a diagnostic the way every phase below reports one: a line number,
/// a location (`end` or a lexeme), and a message.
pub fn report(line: usize, location: &str, message: &str) -> String {
    format!("[line {line}] Error{location}: {message}")
}

fn at_token(token: &Token) -> String {
    if token.lexeme.is_empty() {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

#[derive(Error, Debug, Clone)]
#[error("{text}", text = report(self.line, "", &self.message))]
pub struct LexError {
    pub line: usize,
    pub message: String,
}

impl LexError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        LexError {
            line,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Clone)]
#[error("{text}", text = report(self.token.line, &at_token(&self.token), &self.message))]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

impl ParseError {
    pub fn new(token: Token, message: impl Into<String>) -> Self {
        ParseError {
            token,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Clone)]
#[error("{text}", text = report(self.token.line, &at_token(&self.token), &self.message))]
pub struct ResolveError {
    pub token: Token,
    pub message: String,
}

impl ResolveError {
    pub fn new(token: Token, message: impl Into<String>) -> Self {
        ResolveError {
            token,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Clone)]
#[error("{message}\n[line {line}]")]
pub struct RuntimeError {
    pub line: usize,
    pub message: String,
}

impl RuntimeError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        RuntimeError {
            line,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Literal, TokenKind};

    #[test]
    fn lex_error_formats_with_line() {
        let err = LexError::new(3, "Unexpected character.");
        assert_eq!(err.to_string(), "[line 3] Error: Unexpected character.");
    }

    #[test]
    fn parse_error_formats_at_lexeme() {
        let token = Token::new(TokenKind::Plus, "+", Literal::None, 1);
        let err = ParseError::new(token, "Expect expression.");
        assert_eq!(err.to_string(), "[line 1] Error at '+': Expect expression.");
    }

    #[test]
    fn parse_error_formats_at_end() {
        let token = Token::new(TokenKind::Eof, "", Literal::None, 5);
        let err = ParseError::new(token, "Expect ';' after value.");
        assert_eq!(
            err.to_string(),
            "[line 5] Error at end: Expect ';' after value."
        );
    }

    #[test]
    fn runtime_error_includes_line_suffix() {
        let err = RuntimeError::new(7, "Undefined variable 'x'.");
        assert_eq!(
            err.to_string(),
            "Undefined variable 'x'.\n[line 7]"
        );
    }
}
