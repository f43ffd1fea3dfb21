//! Chumsky parser from formula tokens to an [`Expr`](crate::ast::Expr) tree.

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::ast::{BinOp, Expr};
use crate::lexer::Token;

type Span = SimpleSpan;

/// Parse error with source span.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Byte range of the offending token.
    pub span: std::ops::Range<usize>,
    /// Human-readable description.
    pub message: String,
}

/// Build the expression parser.
///
/// Precedence, loosest first: `+ -`, `* /`, unary `-`/`+`, atoms. Both
/// binary tiers are left-associative.
fn expr_parser<'a, I>() -> impl Parser<'a, I, Expr, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = Span>,
{
    recursive(|expr| {
        let number = select! { Token::Number(n) => Expr::Number(n) }.labelled("number");
        let ident = select! { Token::Ident(name) => name }.labelled("identifier");

        let call = ident
            .then(
                expr.clone()
                    .separated_by(just(Token::Comma))
                    .collect::<Vec<_>>()
                    .delimited_by(just(Token::LParen), just(Token::RParen)),
            )
            .map_with(|(name, args), e| {
                let span: Span = e.span();
                Expr::Call {
                    name,
                    args,
                    span: span.into_range(),
                }
            });

        let var = ident.map_with(|name, e| {
            let span: Span = e.span();
            Expr::Var {
                name,
                span: span.into_range(),
            }
        });

        let atom = choice((
            number,
            call,
            var,
            expr.delimited_by(just(Token::LParen), just(Token::RParen)),
        ));

        let sign = choice((just(Token::Minus).to(true), just(Token::Plus).to(false)));
        let unary = sign.repeated().foldr(atom, |negate, rhs| {
            if negate { Expr::Neg(Box::new(rhs)) } else { rhs }
        });

        let product = unary.clone().foldl(
            choice((
                just(Token::Star).to(BinOp::Mul),
                just(Token::Slash).to(BinOp::Div),
            ))
            .then(unary)
            .repeated(),
            |lhs, (op, rhs)| Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
        );

        product.clone().foldl(
            choice((
                just(Token::Plus).to(BinOp::Add),
                just(Token::Minus).to(BinOp::Sub),
            ))
            .then(product)
            .repeated(),
            |lhs, (op, rhs)| Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
        )
    })
    .then_ignore(end())
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse a token stream into an expression tree.
pub fn parse(tokens: &[(Token, std::ops::Range<usize>)]) -> Result<Expr, Vec<ParseError>> {
    let token_iter = tokens
        .iter()
        .map(|(tok, span)| (tok.clone(), Span::from(span.clone())));

    let len = tokens.last().map_or(0, |(_, s)| s.end);
    let eoi: Span = (len..len).into();
    let stream = Stream::from_iter(token_iter).map(eoi, |(t, s): (_, _)| (t, s));

    let (output, errors) = expr_parser().parse(stream).into_output_errors();

    if let Some(expr) = output
        && errors.is_empty()
    {
        return Ok(expr);
    }

    Err(errors
        .into_iter()
        .map(|e| {
            let span = e.span();
            ParseError {
                span: span.into_range(),
                message: e.to_string(),
            }
        })
        .collect())
}
