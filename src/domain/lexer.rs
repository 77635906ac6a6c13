//! Lexer for domain text.

use winnow::ascii::multispace0;
use winnow::combinator::{alt, delimited};
use winnow::prelude::*;
use winnow::token::take_while;

use super::error::SyntaxError;

/// Half-open byte range into the lexed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    LBracket, // [
    RBracket, // ]
    LParen,   // (
    RParen,   // )
    Comma,    // ,

    /// Contents of a `'...'` literal, quotes stripped.
    Quoted(String),

    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

// Manually define PResult for resilience against winnow version changes
type PResult<T> = Result<T, winnow::error::ErrMode<winnow::error::ContextError>>;

fn lex_quoted(input: &mut &str) -> PResult<TokenKind> {
    delimited('\'', take_while(0.., |c: char| c != '\''), '\'')
        .map(|s: &str| TokenKind::Quoted(s.to_string()))
        .parse_next(input)
}

fn lex_token(input: &mut &str) -> PResult<TokenKind> {
    alt((
        '['.value(TokenKind::LBracket),
        ']'.value(TokenKind::RBracket),
        '('.value(TokenKind::LParen),
        ')'.value(TokenKind::RParen),
        ','.value(TokenKind::Comma),
        lex_quoted,
    ))
    .parse_next(input)
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Tokenize the entire input, ending with an `Eof` token.
///
/// Whitespace is only allowed between tokens; leading or trailing
/// whitespace (including whitespace-only input) is an error.
pub fn tokenize(input: &str) -> Result<Vec<Token>, SyntaxError> {
    if input.starts_with(is_space) {
        return Err(SyntaxError::new(0, "leading whitespace"));
    }
    if input.ends_with(is_space) {
        let end = input.trim_end_matches(is_space).len();
        return Err(SyntaxError::new(end, "trailing whitespace"));
    }

    let mut remaining = input;
    let mut tokens = Vec::new();

    loop {
        let _ = multispace0::<_, winnow::error::ContextError>.parse_next(&mut remaining);
        let start = input.len() - remaining.len();

        if remaining.is_empty() {
            tokens.push(Token {
                kind: TokenKind::Eof,
                span: Span { start, end: start },
            });
            return Ok(tokens);
        }

        // `alt` leaves `remaining` advanced when its last branch fails
        let before = remaining;
        match lex_token(&mut remaining) {
            Ok(kind) => tokens.push(Token {
                kind,
                span: Span {
                    start,
                    end: input.len() - remaining.len(),
                },
            }),
            Err(_) if before.starts_with('\'') => {
                return Err(SyntaxError::new(start, "unterminated quoted string"));
            }
            Err(_) => {
                let found = before.chars().next().unwrap_or_default();
                return Err(SyntaxError::new(
                    start,
                    format!("unexpected character '{found}'"),
                ));
            }
        }
    }
}
