//! Free-text query-string parsing.
//!
//! Accepts the search-box syntax users type against log indices:
//!
//! - **Terms**: `error`, `"error occurred"`, `bro*`, `/joh?n/`
//! - **Fields**: `level:error`, `level:(error OR warn)`, `ms: >500`, `ms >= 500`
//! - **Ranges**: `count:[1 TO 5}`, `time:["2020-01-01" TO *]`
//! - **Boolean**: `AND`/`&&`, `OR`/`||`, `NOT`/`!`/`-`, implicit OR between terms
//!
//! # Example
//!
//! ```ignore
//! use prism::querystring;
//!
//! let expr = querystring::parse("level:error AND -service:web*")?;
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::{Expr, Range};

use std::fmt;
use std::ops::Range as Span;

/// A located parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub span: Span<usize>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at {:?})", self.message, self.span)
    }
}

/// All diagnostics produced for one query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub source: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "query string parse error in {:?}", self.source)?;
        for diag in &self.diagnostics {
            write!(f, ": {}", diag)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Parse a query string.
///
/// Returns `Ok(None)` for an empty input or a lone `*`, both of which mean
/// "no filter".
pub fn parse(source: &str) -> Result<Option<Expr>, ParseError> {
    use chumsky::error::Rich;
    use chumsky::input::Input;
    use chumsky::span::SimpleSpan;
    use chumsky::span::Span as _;
    use chumsky::Parser as _;

    // Step 1: Lexical analysis
    let (tokens, lex_errs) = lexer::lexer().parse(source).into_output_errors();

    let mut diagnostics: Vec<Diagnostic> = lex_errs
        .into_iter()
        .map(|e: Rich<'_, char>| {
            let span = e.span();
            Diagnostic {
                span: span.start()..span.end(),
                message: e.to_string(),
            }
        })
        .collect();

    let tokens: Vec<(lexer::Token<'_>, SimpleSpan)> = match tokens {
        Some(t) if diagnostics.is_empty() => t,
        _ => {
            return Err(ParseError {
                source: source.to_string(),
                diagnostics,
            })
        }
    };

    if tokens.is_empty() {
        return Ok(None);
    }

    // Step 2: Parsing
    let len = source.len();
    let eoi: SimpleSpan = (len..len).into();
    let token_stream = tokens.as_slice().map(
        eoi,
        |(tok, span): &(lexer::Token<'_>, SimpleSpan)| (tok, span),
    );

    let (expr, parse_errs) = parser::parser().parse(token_stream).into_output_errors();

    diagnostics.extend(
        parse_errs
            .into_iter()
            .map(|e: Rich<'_, lexer::Token<'_>, SimpleSpan>| {
                let span = e.span();
                Diagnostic {
                    span: span.start()..span.end(),
                    message: e.to_string(),
                }
            }),
    );

    match expr {
        Some(expr) if diagnostics.is_empty() => {
            if expr.is_match_all() {
                Ok(None)
            } else {
                Ok(Some(expr))
            }
        }
        _ => Err(ParseError {
            source: source.to_string(),
            diagnostics,
        }),
    }
}
