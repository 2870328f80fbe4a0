//! Parser for query strings using chumsky.
//!
//! Precedence, loosest first: OR (explicit or implied by adjacency), AND,
//! prefix NOT / `-`. Both binary operators associate to the right.

use chumsky::input::ValueInput;
use chumsky::prelude::*;

use super::ast::{Expr, Range};
use super::lexer::Token;

/// Resolve `\x` escapes.
pub(crate) fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// True if `s` holds an unescaped `*` or `?`.
pub(crate) fn has_wildcard(s: &str) -> bool {
    let mut escaped = false;
    for c in s.chars() {
        match c {
            '\\' if !escaped => escaped = true,
            '*' | '?' if !escaped => return true,
            _ => escaped = false,
        }
    }
    false
}

fn term(raw: &str) -> Expr {
    if has_wildcard(raw) {
        Expr::wildcard("", unescape(raw))
    } else {
        Expr::matches("", unescape(raw))
    }
}

/// A range bound with whether it was quoted.
#[derive(Debug, Clone)]
struct Bound {
    text: String,
    quoted: bool,
}

fn range(start: Option<Bound>, end: Option<Bound>, include_start: bool, include_end: bool) -> Expr {
    let quoted = start.iter().chain(end.iter()).any(|b| b.quoted);
    let r = Range {
        field: String::new(),
        start: start.map(|b| b.text),
        end: end.map(|b| b.text),
        include_start,
        include_end,
    };
    if quoted {
        Expr::TimeRange(r)
    } else {
        Expr::NumberRange(r)
    }
}

/// Fold `[a, b, c]` into `f(a, f(b, c))`.
fn fold_right(items: Vec<Expr>, f: fn(Expr, Expr) -> Expr) -> Expr {
    let mut rev = items.into_iter().rev();
    match rev.next() {
        Some(last) => rev.fold(last, |acc, e| f(e, acc)),
        // separated lists always hold at least one item
        None => Expr::matches("", "*"),
    }
}

/// Create the query-string parser.
///
/// The parser is generic over the input type, accepting any `ValueInput`
/// that produces `Token` values with `SimpleSpan` spans.
pub fn parser<'tokens, 'src: 'tokens, I>(
) -> impl Parser<'tokens, I, Expr, extra::Err<Rich<'tokens, Token<'src>, SimpleSpan>>>
where
    I: ValueInput<'tokens, Token = Token<'src>, Span = SimpleSpan>,
{
    // ==========================================================================
    // Leaf token parsers
    // ==========================================================================

    let field = select! {
        Token::Word(w) => unescape(w),
    }
    .labelled("field name");

    let bound = select! {
        Token::Word(w) => Bound { text: unescape(w), quoted: false },
        Token::Quoted(q) => Bound { text: unescape(q), quoted: true },
    }
    .labelled("range bound");

    let value = select! {
        Token::Word(w) => term(w),
        Token::Quoted(q) => term(q),
        Token::Regex(r) => Expr::Regexp { field: String::new(), value: r.to_string() },
    }
    .labelled("term");

    // ==========================================================================
    // Ranges: [a TO b], {a TO b}, and mixed brackets
    // ==========================================================================

    let bracket_range = choice((just(Token::LBracket).to(true), just(Token::LBrace).to(false)))
        .then(bound.clone())
        .then_ignore(just(Token::To))
        .then(bound.clone())
        .then(choice((just(Token::RBracket).to(true), just(Token::RBrace).to(false))))
        .map(|(((include_start, start), end), include_end)| {
            range(Some(start), Some(end), include_start, include_end)
        });

    // Comparisons: >v, >=v, <v, <=v
    let comparison = select! {
        Token::Gt => (true, false),
        Token::Gte => (true, true),
        Token::Lt => (false, false),
        Token::Lte => (false, true),
    }
    .then(bound)
    .map(|((is_lower, inclusive), b)| {
        if is_lower {
            range(Some(b), None, inclusive, false)
        } else {
            range(None, Some(b), false, inclusive)
        }
    });

    recursive(|expr| {
        let group = expr.delimited_by(just(Token::LParen), just(Token::RParen));

        let field_value = choice((
            group.clone(),
            bracket_range.clone(),
            comparison.clone(),
            value.clone(),
        ));

        // name: value, name:(group), name: [a TO b], name: >v
        let fielded = field
            .clone()
            .then_ignore(just(Token::Colon))
            .then(field_value.clone())
            .map(|(f, e)| e.with_field(&f));

        // name > v, without a colon
        let bare_comparison = field
            .clone()
            .then(comparison.clone())
            .map(|(f, e)| e.with_field(&f));

        let primary = just(Token::Plus)
            .or_not()
            .ignore_then(choice((fielded, bare_comparison, field_value)));

        let unary = choice((just(Token::Not), just(Token::Minus)))
            .repeated()
            .collect::<Vec<_>>()
            .then(primary)
            .map(|(nots, e)| nots.into_iter().fold(e, |acc, _| Expr::not(acc)));

        let and = unary
            .clone()
            .then(
                just(Token::And)
                    .ignore_then(unary)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .map(|(first, rest)| {
                let mut items = vec![first];
                items.extend(rest);
                fold_right(items, Expr::and)
            });

        and.clone()
            .then(
                just(Token::Or)
                    .or_not()
                    .ignore_then(and)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .map(|(first, rest)| {
                let mut items = vec![first];
                items.extend(rest);
                fold_right(items, Expr::or)
            })
    })
    .then_ignore(end())
}
