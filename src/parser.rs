//! Recursive-descent parser over the token stream.
//!
//! The grammar, sketched (`ws` is handled entirely by the lexer):
//!
//! ```text
//! document   := (terminator* node)* terminator* eof
//! node       := type-annot? name entry* children?
//! name       := identifier | string
//! entry      := slashdash? (prop | arg)
//! prop       := type-annot? (identifier | string) '=' type-annot? value
//! arg        := type-annot? value
//! children   := '{' document '}'
//! type-annot := '(' (identifier | string) ')'
//! terminator := newline | ';'
//! ```
//!
//! A slashdash suppresses exactly one following element: a node, an
//! argument, a property, or a children block. Errors are fatal: the first
//! one is reported with its span and nothing else is returned.

use std::sync::Arc;

use indexmap::IndexMap;
use miette::SourceSpan;

use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};
use crate::{decode, KdlDocument, KdlEntry, KdlError, KdlErrorKind, KdlNode, KdlTransforms};

/// Parses a KDL 2.0 source string into a [`KdlDocument`].
///
/// Equivalent to [`parse_with`] with no transformers.
pub fn parse(source: &str) -> Result<KdlDocument, KdlError> {
    parse_with(source, &KdlTransforms::default())
}

/// Parses a KDL 2.0 source string, applying the given
/// [`KdlTransforms`](crate::KdlTransforms) along the way.
pub fn parse_with(source: &str, transforms: &KdlTransforms) -> Result<KdlDocument, KdlError> {
    let input = Arc::new(source.to_string());
    let tokens = Lexer::with_input(source, input.clone()).lex_all()?;
    let mut parser = Parser {
        input,
        source_len: source.len(),
        tokens,
        pos: 0,
        transforms,
    };
    parser.document()
}

struct Parser<'t> {
    input: Arc<String>,
    source_len: usize,
    tokens: Vec<Token>,
    pos: usize,
    transforms: &'t KdlTransforms,
}

impl Parser<'_> {
    fn peek(&self) -> &Token {
        // The token stream always ends with Eof.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// End offset of the most recently consumed token.
    fn prev_end(&self) -> usize {
        let token = &self.tokens[self.pos.saturating_sub(1)];
        token.span.offset() + token.span.len()
    }

    fn error(
        &self,
        span: SourceSpan,
        kind: KdlErrorKind,
        label: Option<&'static str>,
        help: Option<&'static str>,
    ) -> KdlError {
        KdlError {
            input: self.input.clone(),
            span,
            label,
            help,
            kind,
        }
    }

    fn skip_newlines(&mut self) {
        while self.peek().kind == TokenKind::Newline {
            self.advance();
        }
    }

    fn skip_terminators(&mut self) {
        while matches!(self.peek().kind, TokenKind::Newline | TokenKind::Semicolon) {
            self.advance();
        }
    }

    fn document(&mut self) -> Result<KdlDocument, KdlError> {
        let nodes = self.nodes(true)?;
        Ok(KdlDocument {
            nodes,
            span: SourceSpan::from(0..self.source_len),
        })
    }

    /// The node sequence of a document or children block. At the top level
    /// this consumes up to (and including) Eof; in a children block it stops
    /// *at* the closing `}` without consuming it.
    fn nodes(&mut self, top: bool) -> Result<Vec<KdlNode>, KdlError> {
        let mut nodes = Vec::new();
        loop {
            self.skip_terminators();
            match &self.peek().kind {
                TokenKind::Eof => {
                    if top {
                        return Ok(nodes);
                    }
                    let span = self.peek().span;
                    return Err(self.error(
                        span,
                        KdlErrorKind::UnexpectedEof,
                        Some("expected '}'"),
                        None,
                    ));
                }
                TokenKind::RBrace => {
                    if top {
                        let span = self.peek().span;
                        return Err(self.error(
                            span,
                            KdlErrorKind::UnexpectedToken,
                            Some("no matching '{'"),
                            None,
                        ));
                    }
                    return Ok(nodes);
                }
                TokenKind::Slashdash => {
                    let slashdash = self.advance();
                    self.skip_newlines();
                    if matches!(
                        self.peek().kind,
                        TokenKind::Eof | TokenKind::RBrace | TokenKind::Semicolon
                    ) {
                        return Err(self.error(
                            slashdash.span,
                            KdlErrorKind::DanglingSlashdash,
                            Some("nothing to discard here"),
                            None,
                        ));
                    }
                    let _ = self.node(false)?;
                    self.expect_terminator()?;
                }
                _ => {
                    let node = self.node(true)?;
                    nodes.push(node);
                    self.expect_terminator()?;
                }
            }
        }
    }

    /// After a node, the next token must end it. The terminator itself is
    /// left for the caller (`}` belongs to the children block; newlines and
    /// semicolons get skipped on the next loop).
    fn expect_terminator(&self) -> Result<(), KdlError> {
        match self.peek().kind {
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof | TokenKind::RBrace => {
                Ok(())
            }
            _ => Err(self.error(
                self.peek().span,
                KdlErrorKind::UnexpectedToken,
                Some("expected the node to end here"),
                Some("nodes end at a newline, ';', '}', or end of input"),
            )),
        }
    }

    /// `'(' (identifier | string) ')'`, or nothing.
    fn annotation(&mut self) -> Result<Option<String>, KdlError> {
        if self.peek().kind != TokenKind::LParen {
            return Ok(None);
        }
        self.advance();
        let token = self.advance();
        let name = match token.kind {
            TokenKind::Ident(s) | TokenKind::Str(s) => s,
            TokenKind::Keyword(_) => {
                return Err(self.error(
                    token.span,
                    KdlErrorKind::DuplicateBareIdentifierKeyword,
                    Some("keywords cannot be annotations"),
                    None,
                ))
            }
            TokenKind::Eof => {
                return Err(self.error(
                    token.span,
                    KdlErrorKind::UnexpectedEof,
                    Some("expected an annotation name"),
                    None,
                ))
            }
            _ => {
                return Err(self.error(
                    token.span,
                    KdlErrorKind::UnexpectedToken,
                    Some("expected an annotation name"),
                    None,
                ))
            }
        };
        let close = self.advance();
        match close.kind {
            TokenKind::RParen => Ok(Some(name)),
            TokenKind::Eof => Err(self.error(
                close.span,
                KdlErrorKind::UnexpectedEof,
                Some("expected ')'"),
                None,
            )),
            _ => Err(self.error(
                close.span,
                KdlErrorKind::UnexpectedToken,
                Some("expected ')'"),
                None,
            )),
        }
    }

    /// One full node, starting at its annotation or name. When
    /// `apply_transform` is false (the node is slashdashed) its node
    /// transformer is skipped.
    fn node(&mut self, apply_transform: bool) -> Result<KdlNode, KdlError> {
        let start = self.peek().span.offset();
        let ty = self.annotation()?;
        let token = self.advance();
        let name = match token.kind {
            TokenKind::Ident(s) | TokenKind::Str(s) => s,
            TokenKind::Keyword(_) => {
                return Err(self.error(
                    token.span,
                    KdlErrorKind::DuplicateBareIdentifierKeyword,
                    Some("keywords cannot be node names"),
                    Some("quote the name to use it as a string"),
                ))
            }
            TokenKind::Eof => {
                return Err(self.error(
                    token.span,
                    KdlErrorKind::UnexpectedEof,
                    Some("expected a node name"),
                    None,
                ))
            }
            _ => {
                return Err(self.error(
                    token.span,
                    KdlErrorKind::UnexpectedToken,
                    Some("expected a node name"),
                    None,
                ))
            }
        };

        let mut node = KdlNode {
            ty,
            name,
            args: Vec::new(),
            props: IndexMap::new(),
            children: None,
            span: SourceSpan::from(start..start),
        };

        loop {
            match &self.peek().kind {
                TokenKind::Newline
                | TokenKind::Semicolon
                | TokenKind::Eof
                | TokenKind::RBrace => break,
                TokenKind::Ident(_)
                | TokenKind::Str(_)
                | TokenKind::Number(_)
                | TokenKind::Keyword(_)
                | TokenKind::LParen => {
                    if node.children.is_some() {
                        return Err(self.error(
                            self.peek().span,
                            KdlErrorKind::UnexpectedToken,
                            Some("arguments cannot follow a children block"),
                            None,
                        ));
                    }
                    self.entry(&mut node, false)?;
                }
                TokenKind::LBrace => {
                    if node.children.is_some() {
                        return Err(self.error(
                            self.peek().span,
                            KdlErrorKind::UnexpectedToken,
                            Some("node already has a children block"),
                            None,
                        ));
                    }
                    node.children = Some(self.children_block()?);
                }
                TokenKind::Slashdash => {
                    let slashdash = self.advance();
                    self.skip_newlines();
                    match &self.peek().kind {
                        TokenKind::LBrace => {
                            let _ = self.children_block()?;
                        }
                        TokenKind::Ident(_)
                        | TokenKind::Str(_)
                        | TokenKind::Number(_)
                        | TokenKind::Keyword(_)
                        | TokenKind::LParen
                            if node.children.is_none() =>
                        {
                            self.entry(&mut node, true)?;
                        }
                        _ => {
                            return Err(self.error(
                                slashdash.span,
                                KdlErrorKind::DanglingSlashdash,
                                Some("nothing to discard here"),
                                None,
                            ))
                        }
                    }
                }
                TokenKind::Equals => {
                    return Err(self.error(
                        self.peek().span,
                        KdlErrorKind::UnexpectedToken,
                        Some("'=' must directly follow a property name"),
                        None,
                    ))
                }
                TokenKind::RParen => {
                    return Err(self.error(
                        self.peek().span,
                        KdlErrorKind::UnexpectedToken,
                        Some("unexpected ')'"),
                        None,
                    ))
                }
            }
        }

        node.span = SourceSpan::from(start..self.prev_end());
        if apply_transform {
            if let Some(transform) = self.transforms.nodes.get(&node.name) {
                let span = node.span;
                node = transform(node).map_err(|message| {
                    self.error(
                        span,
                        KdlErrorKind::TransformError(message),
                        Some("node transform failed"),
                        None,
                    )
                })?;
            }
        }
        Ok(node)
    }

    /// One argument or property. When `suppressed` is true (slashdashed) it
    /// is parsed for validity but not attached, and no transformer runs.
    fn entry(&mut self, node: &mut KdlNode, suppressed: bool) -> Result<(), KdlError> {
        let start = self.peek().span.offset();
        let annotation = self.annotation()?;
        let token = self.advance();

        if self.peek().kind == TokenKind::Equals {
            let key = match token.kind {
                TokenKind::Ident(s) | TokenKind::Str(s) => s,
                TokenKind::Number(_) | TokenKind::Keyword(_) => {
                    return Err(self.error(
                        token.span,
                        KdlErrorKind::BadPropertyKey,
                        Some("property keys must be identifiers or strings"),
                        None,
                    ))
                }
                _ => {
                    return Err(self.error(
                        token.span,
                        KdlErrorKind::UnexpectedToken,
                        Some("expected a value"),
                        None,
                    ))
                }
            };
            self.advance(); // '='
            let value_annotation = self.annotation()?;
            if annotation.is_some() && value_annotation.is_some() {
                return Err(self.error(
                    SourceSpan::from(start..self.prev_end()),
                    KdlErrorKind::UnexpectedToken,
                    Some("value has two type annotations"),
                    None,
                ));
            }
            let value_token = self.advance();
            let value = self.value(value_token)?;
            let entry = KdlEntry {
                // An annotation in front of a property key belongs to the
                // value after the '='.
                ty: annotation.or(value_annotation),
                value,
                span: SourceSpan::from(start..self.prev_end()),
            };
            if !suppressed {
                let entry = self.apply_value_transform(entry)?;
                node.insert_prop(key, entry);
            }
        } else {
            let value = self.value(token)?;
            let entry = KdlEntry {
                ty: annotation,
                value,
                span: SourceSpan::from(start..self.prev_end()),
            };
            if !suppressed {
                let entry = self.apply_value_transform(entry)?;
                node.args.push(entry);
            }
        }
        Ok(())
    }

    /// Decodes a value-position token.
    fn value(&mut self, token: Token) -> Result<crate::KdlValue, KdlError> {
        match token.kind {
            TokenKind::Ident(s) | TokenKind::Str(s) => Ok(crate::KdlValue::String(s)),
            TokenKind::Number(text) => decode::number(&text, token.span, &self.input),
            TokenKind::Keyword(keyword) => Ok(decode::keyword(keyword)),
            TokenKind::Eof => Err(self.error(
                token.span,
                KdlErrorKind::UnexpectedEof,
                Some("expected a value"),
                None,
            )),
            _ => Err(self.error(
                token.span,
                KdlErrorKind::UnexpectedToken,
                Some("expected a value"),
                None,
            )),
        }
    }

    fn apply_value_transform(&self, entry: KdlEntry) -> Result<KdlEntry, KdlError> {
        let KdlEntry { ty, value, span } = entry;
        let transform = ty.as_deref().and_then(|t| self.transforms.values.get(t));
        let value = match transform {
            Some(f) => f(value).map_err(|message| {
                self.error(
                    span,
                    KdlErrorKind::TransformError(message),
                    Some("value transform failed"),
                    None,
                )
            })?,
            None => value,
        };
        Ok(KdlEntry { ty, value, span })
    }

    /// `'{' nodes '}'`. The opening brace has not been consumed yet.
    fn children_block(&mut self) -> Result<KdlDocument, KdlError> {
        let open = self.advance();
        debug_assert_eq!(open.kind, TokenKind::LBrace);
        let nodes = self.nodes(false)?;
        let close = self.advance();
        debug_assert_eq!(close.kind, TokenKind::RBrace);
        Ok(KdlDocument {
            nodes,
            span: SourceSpan::from(open.span.offset()..self.prev_end()),
        })
    }
}
