//! Lexer for free-text query strings.
//!
//! Converts source text into a sequence of tokens with span information.
//! Escapes (`\x`) are kept verbatim in token slices and resolved by the parser.

use chumsky::prelude::*;

/// A token in a query string.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    // ========================================================================
    // Keywords
    // ========================================================================
    And,
    Or,
    Not,
    To,

    // ========================================================================
    // Terms
    // ========================================================================
    Word(&'src str),
    /// Phrase between double quotes, quotes stripped.
    Quoted(&'src str),
    /// Pattern between slashes, slashes stripped.
    Regex(&'src str),

    // ========================================================================
    // Symbols
    // ========================================================================
    Colon,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Minus,
    Plus,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl std::fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::And => write!(f, "AND"),
            Token::Or => write!(f, "OR"),
            Token::Not => write!(f, "NOT"),
            Token::To => write!(f, "TO"),
            Token::Word(s) => write!(f, "{}", s),
            Token::Quoted(s) => write!(f, "\"{}\"", s),
            Token::Regex(s) => write!(f, "/{}/", s),
            Token::Colon => write!(f, ":"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::Minus => write!(f, "-"),
            Token::Plus => write!(f, "+"),
            Token::Gt => write!(f, ">"),
            Token::Gte => write!(f, ">="),
            Token::Lt => write!(f, "<"),
            Token::Lte => write!(f, "<="),
        }
    }
}

/// Characters that always end a bare word.
fn is_reserved(c: char) -> bool {
    c.is_whitespace() || matches!(c, ':' | '(' | ')' | '[' | ']' | '{' | '}' | '"' | '<' | '>')
}

/// Characters a bare word may contain but not start with.
fn is_prefix_operator(c: char) -> bool {
    matches!(c, '-' | '+' | '!' | '/')
}

fn keyword_or_word(s: &str) -> Token<'_> {
    match s {
        "AND" | "and" => Token::And,
        "OR" | "or" => Token::Or,
        "NOT" => Token::Not,
        "TO" => Token::To,
        _ => Token::Word(s),
    }
}

/// Create the lexer.
pub fn lexer<'src>(
) -> impl Parser<'src, &'src str, Vec<(Token<'src>, SimpleSpan)>, extra::Err<Rich<'src, char>>> {
    // Backslash escapes any single character
    let escape = just('\\').then(any()).ignored();

    // Bare words: everything up to a reserved character
    let word = escape
        .clone()
        .or(any()
            .filter(|c: &char| !is_reserved(*c) && !is_prefix_operator(*c))
            .ignored())
        .then(
            escape
                .clone()
                .or(any().filter(|c: &char| !is_reserved(*c)).ignored())
                .repeated(),
        )
        .to_slice()
        .map(keyword_or_word);

    // Phrases: "..."
    let quoted = just('"')
        .ignore_then(
            escape
                .clone()
                .or(none_of("\\\"").ignored())
                .repeated()
                .to_slice(),
        )
        .then_ignore(just('"'))
        .map(Token::Quoted);

    // Regular expressions: /.../
    let regex = just('/')
        .ignore_then(
            just("\\/")
                .ignored()
                .or(none_of('/').ignored())
                .repeated()
                .to_slice(),
        )
        .then_ignore(just('/'))
        .map(Token::Regex);

    // Symbols (multi-char first, then single-char)
    let symbol = choice((
        just("&&").to(Token::And),
        just("||").to(Token::Or),
        just(">=").to(Token::Gte),
        just("<=").to(Token::Lte),
        just('>').to(Token::Gt),
        just('<').to(Token::Lt),
        just('!').to(Token::Not),
        just(':').to(Token::Colon),
        just('(').to(Token::LParen),
        just(')').to(Token::RParen),
        just('[').to(Token::LBracket),
        just(']').to(Token::RBracket),
        just('{').to(Token::LBrace),
        just('}').to(Token::RBrace),
        just('-').to(Token::Minus),
        just('+').to(Token::Plus),
    ));

    let token = choice((quoted, regex, symbol, word)).map_with(|tok, e| (tok, e.span()));

    token.padded().repeated().collect().padded().then_ignore(end())
}

/// Lex a source string into tokens.
pub fn lex(source: &str) -> Result<Vec<(Token<'_>, SimpleSpan)>, Vec<Rich<'_, char>>> {
    let (tokens, errs) = lexer().parse(source).into_output_errors();
    if errs.is_empty() {
        Ok(tokens.unwrap_or_default())
    } else {
        Err(errs)
    }
}
