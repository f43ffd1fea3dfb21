//! Tokenizer for formula expressions.

use logos::Logos;
use std::fmt;

/// Token type for formula expressions.
///
/// Function names and variable paths are both `Ident`; the parser tells
/// them apart by a following `(`.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Numeric literal.
    Number(f64),
    /// Identifier or dotted variable path (`abilities.dex.modifier`).
    Ident(String),
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Ident(name) => write!(f, "{name}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
        }
    }
}

/// Internal logos token, converted to an owned `Token` after lexing.
#[derive(Logos, Debug)]
#[logos(skip r"[ \t\r\n]+")]
enum RawToken {
    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(",")]
    Comma,

    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*")]
    Ident,
}

/// A lexer error with source location.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    /// Byte range of the erroneous input.
    pub span: std::ops::Range<usize>,
    /// Human-readable description.
    pub message: String,
}

/// Lex an expression into `(Token, Span)` pairs.
///
/// Lexing continues past errors so every bad character is reported.
pub fn lex(source: &str) -> (Vec<(Token, std::ops::Range<usize>)>, Vec<LexError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let token = match result {
            Ok(RawToken::Plus) => Token::Plus,
            Ok(RawToken::Minus) => Token::Minus,
            Ok(RawToken::Star) => Token::Star,
            Ok(RawToken::Slash) => Token::Slash,
            Ok(RawToken::LParen) => Token::LParen,
            Ok(RawToken::RParen) => Token::RParen,
            Ok(RawToken::Comma) => Token::Comma,
            Ok(RawToken::Number) => match lexer.slice().parse::<f64>() {
                Ok(n) => Token::Number(n),
                Err(_) => {
                    errors.push(LexError {
                        span,
                        message: format!("invalid number: {}", lexer.slice()),
                    });
                    continue;
                }
            },
            Ok(RawToken::Ident) => Token::Ident(lexer.slice().to_string()),
            Err(()) => {
                errors.push(LexError {
                    span,
                    message: format!("unexpected character: {:?}", lexer.slice()),
                });
                continue;
            }
        };
        tokens.push((token, span));
    }

    (tokens, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        let (tokens, errors) = lex(source);
        assert!(errors.is_empty(), "lex errors: {errors:?}");
        tokens.into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn lex_arithmetic() {
        assert_eq!(
            kinds("10 + 2*3"),
            vec![
                Token::Number(10.0),
                Token::Plus,
                Token::Number(2.0),
                Token::Star,
                Token::Number(3.0),
            ]
        );
    }

    #[test]
    fn lex_dotted_paths() {
        assert_eq!(
            kinds("abilities.dex.modifier"),
            vec![Token::Ident("abilities.dex.modifier".to_string())]
        );
    }

    #[test]
    fn lex_function_call() {
        assert_eq!(
            kinds("max(1, level)"),
            vec![
                Token::Ident("max".to_string()),
                Token::LParen,
                Token::Number(1.0),
                Token::Comma,
                Token::Ident("level".to_string()),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn lex_decimal() {
        assert_eq!(kinds("0.5"), vec![Token::Number(0.5)]);
    }

    #[test]
    fn lex_rejects_code() {
        let (_, errors) = lex("level; alert(1)");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].span, 5..6);
    }

    #[test]
    fn lex_preserves_spans() {
        let (tokens, _) = lex("1 + level");
        assert_eq!(tokens[2].1, 4..9);
    }
}
