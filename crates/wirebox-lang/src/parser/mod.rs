//! Configuration-language parser built on `nom`.
//!
//! Transforms raw source text into a [`ScopeNode`] through lexing and
//! recursive-descent parsing. The parser is purely syntactic: duplicate
//! definitions, override rules, and import targets are checked later by the
//! interpreter.

pub mod ast;
pub mod lexer;

use wirebox_common::error::{Result, WireboxError};
use wirebox_common::types::Value;

use self::ast::{
    AliasDefNode, ArgumentNode, ImportNode, MetadataNode, MethodCallNode, ParameterDefNode,
    ScopeNode, ServiceDefNode, Statement,
};
use self::lexer::{Position, Token, TokenKind};

/// Cursor into a token stream for recursive-descent parsing.
struct TokenCursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokenCursor<'a> {
    const fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'a TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    /// Position of the next token, or of the last token at end of input.
    fn position(&self) -> Position {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or_else(Position::start, |t| t.position)
    }

    /// Line of the most recently consumed token.
    fn previous_line(&self) -> Option<usize> {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.position.line)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == Some(kind) {
            let _ = self.advance();
            true
        } else {
            false
        }
    }

    fn expect_token(&mut self, expected: &TokenKind) -> Result<()> {
        let position = self.position();
        match self.advance() {
            Some(tok) if &tok.kind == expected => Ok(()),
            other => Err(unexpected(position, &expected.to_string(), other)),
        }
    }

    fn expect_identifier(&mut self, what: &str) -> Result<String> {
        let position = self.position();
        match self.advance() {
            Some(Token {
                kind: TokenKind::Identifier(name),
                ..
            }) => Ok(name.clone()),
            other => Err(unexpected(position, what, other)),
        }
    }
}

const fn parse_err(position: Position, message: String) -> WireboxError {
    WireboxError::Parse {
        line: position.line,
        column: position.column,
        message,
    }
}

fn unexpected(position: Position, expected: &str, got: Option<&Token>) -> WireboxError {
    let got = got.map_or_else(|| "end of input".to_owned(), |t| t.kind.to_string());
    parse_err(position, format!("expected {expected}, got {got}"))
}

/// Parses source text into a scope.
///
/// # Errors
///
/// Returns a lex or parse error if the input is malformed.
pub fn parse_source(input: &str) -> Result<ScopeNode> {
    let tokens = lexer::tokenize(input)?;
    parse(&tokens)
}

/// Parses a token stream into a scope.
///
/// # Errors
///
/// Returns [`WireboxError::Parse`] at the first token that does not fit the
/// grammar.
pub fn parse(tokens: &[Token]) -> Result<ScopeNode> {
    tracing::debug!(tokens = tokens.len(), "parsing scope");
    let mut cursor = TokenCursor::new(tokens);
    let mut scope = ScopeNode::default();

    while let Some(kind) = cursor.peek() {
        let statement = match kind {
            TokenKind::Import => parse_import(&mut cursor)?,
            TokenKind::Override | TokenKind::Transient | TokenKind::Colon | TokenKind::At => {
                parse_definition(&mut cursor)?
            }
            other => {
                return Err(parse_err(
                    cursor.position(),
                    format!("expected `import`, a parameter, or a service definition, got {other}"),
                ));
            }
        };
        scope.nodes.push(statement);
    }

    Ok(scope)
}

fn parse_import(cursor: &mut TokenCursor<'_>) -> Result<Statement> {
    cursor.expect_token(&TokenKind::Import)?;
    let position = cursor.position();
    let path = match cursor.advance() {
        Some(Token {
            kind: TokenKind::Identifier(s) | TokenKind::StringLiteral(s),
            ..
        }) => s.clone(),
        other => return Err(unexpected(position, "unit name after `import`", other)),
    };
    Ok(Statement::Import(ImportNode { path }))
}

fn parse_definition(cursor: &mut TokenCursor<'_>) -> Result<Statement> {
    let is_override = cursor.eat(&TokenKind::Override);
    let transient_at = cursor.position();
    let is_transient = cursor.eat(&TokenKind::Transient);

    match cursor.peek() {
        Some(TokenKind::Colon) if is_transient => Err(parse_err(
            transient_at,
            "`transient` only applies to service definitions".into(),
        )),
        Some(TokenKind::Colon) => parse_parameter(cursor, is_override),
        Some(TokenKind::At) => {
            parse_service_or_alias(cursor, is_override, is_transient, transient_at)
        }
        _ => Err(unexpected(
            cursor.position(),
            "`:` or `@` to start a definition",
            cursor.tokens.get(cursor.pos),
        )),
    }
}

fn parse_parameter(cursor: &mut TokenCursor<'_>, is_override: bool) -> Result<Statement> {
    cursor.expect_token(&TokenKind::Colon)?;
    let name = cursor.expect_identifier("parameter name")?;
    cursor.expect_token(&TokenKind::Colon)?;
    let value = parse_value(cursor)?;
    Ok(Statement::Parameter(ParameterDefNode {
        name,
        value,
        is_override,
    }))
}

fn parse_service_or_alias(
    cursor: &mut TokenCursor<'_>,
    is_override: bool,
    is_transient: bool,
    transient_at: Position,
) -> Result<Statement> {
    cursor.expect_token(&TokenKind::At)?;
    let name = cursor.expect_identifier("service name")?;
    cursor.expect_token(&TokenKind::Colon)?;

    if cursor.eat(&TokenKind::At) {
        if is_transient {
            return Err(parse_err(
                transient_at,
                "`transient` only applies to service definitions".into(),
            ));
        }
        let target = cursor.expect_identifier("alias target")?;
        return Ok(Statement::Alias(AliasDefNode {
            name,
            target,
            is_override,
        }));
    }

    let class_name = cursor.expect_identifier("class name")?;
    let arguments = if cursor.peek() == Some(&TokenKind::ParenOpen) {
        parse_arguments(cursor)?
    } else {
        Vec::new()
    };

    let mut service = ServiceDefNode {
        name,
        class_name,
        arguments,
        is_override,
        is_shared: !is_transient,
        method_calls: Vec::new(),
        metadata: Vec::new(),
    };

    loop {
        match cursor.peek() {
            Some(TokenKind::Minus) => {
                let _ = cursor.advance();
                let name = cursor.expect_identifier("method name")?;
                let arguments = parse_arguments(cursor)?;
                service.method_calls.push(MethodCallNode { name, arguments });
            }
            Some(TokenKind::Equals) => {
                let _ = cursor.advance();
                service.metadata.push(parse_metadata(cursor)?);
            }
            _ => break,
        }
    }

    Ok(Statement::Service(service))
}

/// Parses `tag` or `tag: value, ...`. The payload colon must sit on the tag's
/// line, otherwise it starts the next parameter definition.
fn parse_metadata(cursor: &mut TokenCursor<'_>) -> Result<MetadataNode> {
    let tag = cursor.expect_identifier("metadata tag")?;
    let tag_line = cursor.previous_line();
    let mut payload = Vec::new();

    if cursor.peek() == Some(&TokenKind::Colon) && Some(cursor.position().line) == tag_line {
        let _ = cursor.advance();
        payload.push(parse_value(cursor)?);
        while cursor.eat(&TokenKind::Comma) {
            payload.push(parse_value(cursor)?);
        }
    }

    Ok(MetadataNode { tag, payload })
}

fn parse_arguments(cursor: &mut TokenCursor<'_>) -> Result<Vec<ArgumentNode>> {
    cursor.expect_token(&TokenKind::ParenOpen)?;
    let mut arguments = Vec::new();
    if cursor.eat(&TokenKind::ParenClose) {
        return Ok(arguments);
    }

    loop {
        arguments.push(parse_argument(cursor)?);
        if cursor.eat(&TokenKind::Comma) {
            if cursor.eat(&TokenKind::ParenClose) {
                break;
            }
            continue;
        }
        cursor.expect_token(&TokenKind::ParenClose)?;
        break;
    }

    Ok(arguments)
}

fn parse_argument(cursor: &mut TokenCursor<'_>) -> Result<ArgumentNode> {
    if cursor.eat(&TokenKind::Colon) {
        return Ok(ArgumentNode::ParameterRef(
            cursor.expect_identifier("parameter name")?,
        ));
    }
    if cursor.eat(&TokenKind::At) {
        return Ok(ArgumentNode::ServiceRef(
            cursor.expect_identifier("service name")?,
        ));
    }
    Ok(ArgumentNode::ValueRef(parse_value(cursor)?))
}

fn parse_value(cursor: &mut TokenCursor<'_>) -> Result<Value> {
    let position = cursor.position();
    let token = cursor.advance();
    match token.map(|t| &t.kind) {
        Some(TokenKind::StringLiteral(s)) => Ok(Value::String(s.clone())),
        Some(TokenKind::Integer(n)) => i64::try_from(*n)
            .map(Value::Int)
            .map_err(|_| parse_err(position, format!("integer literal {n} is out of range"))),
        Some(TokenKind::Float(x)) => Ok(Value::Float(*x)),
        Some(TokenKind::True) => Ok(Value::Bool(true)),
        Some(TokenKind::False) => Ok(Value::Bool(false)),
        Some(TokenKind::Null) => Ok(Value::Null),
        Some(TokenKind::Minus) => {
            let position = cursor.position();
            match cursor.advance() {
                Some(Token {
                    kind: TokenKind::Integer(n),
                    ..
                }) => 0_i64
                    .checked_sub_unsigned(*n)
                    .map(Value::Int)
                    .ok_or_else(|| {
                        parse_err(position, format!("integer literal -{n} is out of range"))
                    }),
                Some(Token {
                    kind: TokenKind::Float(x),
                    ..
                }) => Ok(Value::Float(-x)),
                other => Err(unexpected(position, "number after `-`", other)),
            }
        }
        Some(TokenKind::BraceOpen) => parse_list(cursor),
        _ => Err(unexpected(position, "a value", token)),
    }
}

fn parse_list(cursor: &mut TokenCursor<'_>) -> Result<Value> {
    let mut items = Vec::new();
    if cursor.eat(&TokenKind::BraceClose) {
        return Ok(Value::List(items));
    }

    loop {
        items.push(parse_value(cursor)?);
        if cursor.eat(&TokenKind::Comma) {
            if cursor.eat(&TokenKind::BraceClose) {
                break;
            }
            continue;
        }
        cursor.expect_token(&TokenKind::BraceClose)?;
        break;
    }

    Ok(Value::List(items))
}
