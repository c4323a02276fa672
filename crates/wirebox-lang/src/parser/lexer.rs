//! Tokenization of configuration source text using `nom`.
//!
//! Produces a stream of positioned [`Token`]s from raw input for the parser
//! to consume. Whitespace, `//` and `#` line comments, and `/* */` block
//! comments are discarded between tokens.

use std::fmt;

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, multispace1, not_line_ending},
    combinator::{opt, recognize, value},
    multi::many0,
    sequence::{pair, preceded},
};
use wirebox_common::error::{Result, WireboxError};

/// The kind of a token in the configuration language.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// `import` keyword.
    Import,
    /// `override` modifier.
    Override,
    /// `transient` modifier (unshared service).
    Transient,
    /// Boolean literal `true`.
    True,
    /// Boolean literal `false`.
    False,
    /// `null` literal.
    Null,
    /// An identifier: service, parameter, class, method, or unit name.
    Identifier(String),
    /// A single- or double-quoted string literal.
    StringLiteral(String),
    /// Magnitude of an integer literal; a leading `-` is its own token.
    Integer(u64),
    /// A floating point literal.
    Float(f64),
    /// `:` parameter sigil and definition separator.
    Colon,
    /// `@` service sigil.
    At,
    /// `(` opening parenthesis.
    ParenOpen,
    /// `)` closing parenthesis.
    ParenClose,
    /// `{` opening brace.
    BraceOpen,
    /// `}` closing brace.
    BraceClose,
    /// `,` separator.
    Comma,
    /// `-` method call marker and number sign.
    Minus,
    /// `=` metadata marker.
    Equals,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Import => write!(f, "`import`"),
            Self::Override => write!(f, "`override`"),
            Self::Transient => write!(f, "`transient`"),
            Self::True => write!(f, "`true`"),
            Self::False => write!(f, "`false`"),
            Self::Null => write!(f, "`null`"),
            Self::Identifier(name) => write!(f, "identifier `{name}`"),
            Self::StringLiteral(s) => write!(f, "string {s:?}"),
            Self::Integer(n) => write!(f, "number {n}"),
            Self::Float(x) => write!(f, "number {x}"),
            Self::Colon => write!(f, "`:`"),
            Self::At => write!(f, "`@`"),
            Self::ParenOpen => write!(f, "`(`"),
            Self::ParenClose => write!(f, "`)`"),
            Self::BraceOpen => write!(f, "`{{`"),
            Self::BraceClose => write!(f, "`}}`"),
            Self::Comma => write!(f, "`,`"),
            Self::Minus => write!(f, "`-`"),
            Self::Equals => write!(f, "`=`"),
        }
    }
}

/// A 1-based line/column location in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Line number.
    pub line: usize,
    /// Column number, counted in characters.
    pub column: usize,
}

impl Position {
    /// Position of the first character of a source.
    #[must_use]
    pub const fn start() -> Self {
        Self { line: 1, column: 1 }
    }

    fn advance(&mut self, consumed: &str) {
        for c in consumed.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }
}

/// A token together with the position of its first character.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What was recognized.
    pub kind: TokenKind,
    /// Where it starts.
    pub position: Position,
}

fn block_comment(input: &str) -> IResult<&str, ()> {
    let start = input;
    let (input, _) = tag("/*")(input)?;
    input.find("*/").map_or_else(
        || {
            Err(nom::Err::Failure(nom::error::Error::new(
                start,
                nom::error::ErrorKind::TakeUntil,
            )))
        },
        |end| Ok((&input[end + 2..], ())),
    )
}

/// Skippable items: whitespace and comments.
fn skip_trivia(input: &str) -> IResult<&str, ()> {
    let line_comment = value((), preceded(alt((tag("//"), tag("#"))), not_line_ending));
    let ws = value((), multispace1);
    let (input, _) = many0(alt((ws, line_comment, block_comment))).parse(input)?;
    Ok((input, ()))
}

/// Parses a single- or double-quoted string literal with escape support.
fn string_literal(input: &str) -> IResult<&str, TokenKind> {
    let start = input;
    let (input, quote) = alt((char('"'), char('\''))).parse(input)?;
    let mut result = String::new();
    let mut chars = input.char_indices();
    loop {
        match chars.next() {
            Some((idx, c)) if c == quote => {
                let remaining = &input[idx + c.len_utf8()..];
                return Ok((remaining, TokenKind::StringLiteral(result)));
            }
            Some((_, '\\')) => match chars.next() {
                Some((_, 'n')) => result.push('\n'),
                Some((_, 't')) => result.push('\t'),
                Some((_, '\\')) => result.push('\\'),
                Some((_, '"')) => result.push('"'),
                Some((_, '\'')) => result.push('\''),
                Some((_, c)) => {
                    result.push('\\');
                    result.push(c);
                }
                None => break,
            },
            Some((_, c)) => result.push(c),
            None => break,
        }
    }
    Err(nom::Err::Failure(nom::error::Error::new(
        start,
        nom::error::ErrorKind::Char,
    )))
}

/// Parses an integer or float literal. Signs are separate tokens.
fn number_literal(input: &str) -> IResult<&str, TokenKind> {
    let start = input;
    let (input, text) = recognize(pair(digit1, opt(preceded(char('.'), digit1)))).parse(input)?;
    let invalid = |kind| nom::Err::Failure(nom::error::Error::new(start, kind));
    let token = if text.contains('.') {
        TokenKind::Float(
            text.parse()
                .map_err(|_| invalid(nom::error::ErrorKind::Float))?,
        )
    } else {
        TokenKind::Integer(
            text.parse()
                .map_err(|_| invalid(nom::error::ErrorKind::Digit))?,
        )
    };
    Ok((input, token))
}

const fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

const fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '\\' | '/')
}

/// Parses an identifier or keyword.
fn identifier_or_keyword(input: &str) -> IResult<&str, TokenKind> {
    let (input, word) = recognize(pair(
        take_while1(is_ident_start),
        take_while(is_ident_continue),
    ))
    .parse(input)?;
    let token = match word {
        "import" => TokenKind::Import,
        "override" => TokenKind::Override,
        "transient" => TokenKind::Transient,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        _ => TokenKind::Identifier(word.to_owned()),
    };
    Ok((input, token))
}

/// Parses a punctuation token.
fn symbol(input: &str) -> IResult<&str, TokenKind> {
    alt((
        value(TokenKind::Colon, char(':')),
        value(TokenKind::At, char('@')),
        value(TokenKind::ParenOpen, char('(')),
        value(TokenKind::ParenClose, char(')')),
        value(TokenKind::BraceOpen, char('{')),
        value(TokenKind::BraceClose, char('}')),
        value(TokenKind::Comma, char(',')),
        value(TokenKind::Minus, char('-')),
        value(TokenKind::Equals, char('=')),
    ))
    .parse(input)
}

/// Parses a single token (after trivia has been skipped).
fn single_token(input: &str) -> IResult<&str, TokenKind> {
    alt((string_literal, symbol, number_literal, identifier_or_keyword)).parse(input)
}

fn describe_failure(remaining: &str) -> String {
    match remaining.chars().next() {
        Some('"' | '\'') => "unterminated string literal".to_owned(),
        Some(c) if c.is_ascii_digit() => "invalid number literal".to_owned(),
        Some(c) => format!("unexpected character '{c}'"),
        None => "unexpected end of input".to_owned(),
    }
}

/// Computes the position of `at`, a suffix of `remaining`, given the
/// position of `remaining`.
fn position_of(mut base: Position, remaining: &str, at: &str) -> Position {
    let offset = remaining.len().saturating_sub(at.len());
    base.advance(&remaining[..offset]);
    base
}

/// Tokenizes a source string into a vector of positioned tokens.
///
/// # Errors
///
/// Returns [`WireboxError::Lex`] on an unterminated string or block comment,
/// or on a character that starts no token.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    tracing::debug!(bytes = input.len(), "tokenizing source");
    let mut tokens = Vec::new();
    let mut remaining = input;
    let mut position = Position::start();

    loop {
        let (rest, ()) = skip_trivia(remaining).map_err(|e| {
            let at = match &e {
                nom::Err::Error(err) | nom::Err::Failure(err) => {
                    position_of(position, remaining, err.input)
                }
                nom::Err::Incomplete(_) => position,
            };
            WireboxError::Lex {
                line: at.line,
                column: at.column,
                message: "unterminated block comment".into(),
            }
        })?;
        position.advance(&remaining[..remaining.len() - rest.len()]);
        remaining = rest;

        if remaining.is_empty() {
            break;
        }

        let (rest, kind) = single_token(remaining).map_err(|_| WireboxError::Lex {
            line: position.line,
            column: position.column,
            message: describe_failure(remaining),
        })?;
        tokens.push(Token { kind, position });
        position.advance(&remaining[..remaining.len() - rest.len()]);
        remaining = rest;
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .expect("should tokenize")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn tokenize_keywords() {
        assert_eq!(
            kinds("import override transient true false null"),
            vec![
                TokenKind::Import,
                TokenKind::Override,
                TokenKind::Transient,
                TokenKind::True,
                TokenKind::False,
                TokenKind::Null,
            ]
        );
    }

    #[test]
    fn tokenize_symbols() {
        assert_eq!(
            kinds(": @ ( ) { } , - ="),
            vec![
                TokenKind::Colon,
                TokenKind::At,
                TokenKind::ParenOpen,
                TokenKind::ParenClose,
                TokenKind::BraceOpen,
                TokenKind::BraceClose,
                TokenKind::Comma,
                TokenKind::Minus,
                TokenKind::Equals,
            ]
        );
    }

    #[test]
    fn tokenize_dotted_identifiers() {
        assert_eq!(
            kinds("db.host_main app\\Logger shared/logging"),
            vec![
                TokenKind::Identifier("db.host_main".into()),
                TokenKind::Identifier("app\\Logger".into()),
                TokenKind::Identifier("shared/logging".into()),
            ]
        );
    }

    #[test]
    fn tokenize_both_quote_styles_with_escapes() {
        assert_eq!(
            kinds(r#"'it\'s' "say \"hi\"\n""#),
            vec![
                TokenKind::StringLiteral("it's".into()),
                TokenKind::StringLiteral("say \"hi\"\n".into()),
            ]
        );
    }

    #[test]
    fn tokenize_numbers() {
        assert_eq!(
            kinds("8080 3.25 -1"),
            vec![
                TokenKind::Integer(8080),
                TokenKind::Float(3.25),
                TokenKind::Minus,
                TokenKind::Integer(1),
            ]
        );
    }

    #[test]
    fn tokenize_parameter_definition() {
        assert_eq!(
            kinds(":db.host: 'localhost'"),
            vec![
                TokenKind::Colon,
                TokenKind::Identifier("db.host".into()),
                TokenKind::Colon,
                TokenKind::StringLiteral("localhost".into()),
            ]
        );
    }

    #[test]
    fn tokenize_skips_all_comment_styles() {
        let input = "// header\n# hash comment\n/* block\n comment */ @db";
        assert_eq!(
            kinds(input),
            vec![TokenKind::At, TokenKind::Identifier("db".into())]
        );
    }

    #[test]
    fn tokenize_records_positions() {
        let tokens = tokenize("@a: X\n  - run()").expect("should tokenize");
        assert_eq!(tokens[0].position, Position { line: 1, column: 1 });
        assert_eq!(tokens[3].position, Position { line: 1, column: 5 });
        assert_eq!(tokens[4].kind, TokenKind::Minus);
        assert_eq!(tokens[4].position, Position { line: 2, column: 3 });
    }

    #[test]
    fn tokenize_empty_input() {
        assert!(kinds("").is_empty());
        assert!(kinds("   \n// only a comment").is_empty());
    }

    #[test]
    fn tokenize_error_on_unterminated_string() {
        let err = tokenize(":a: 'open").expect_err("should fail");
        match err {
            WireboxError::Lex {
                line,
                column,
                message,
            } => {
                assert_eq!((line, column), (1, 5));
                assert!(message.contains("unterminated string"), "got: {message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn tokenize_error_on_unterminated_block_comment() {
        let err = tokenize("@a: X\n/* never closed").expect_err("should fail");
        match err {
            WireboxError::Lex {
                line,
                column,
                message,
            } => {
                assert_eq!((line, column), (2, 1));
                assert!(message.contains("block comment"), "got: {message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn tokenize_error_on_invalid_char() {
        let err = tokenize("@svc: $Bad").expect_err("should fail");
        assert!(err.to_string().contains("'$'"), "got: {err}");
    }
}
