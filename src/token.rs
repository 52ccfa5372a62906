use miette::SourceSpan;

/// A single lexical element of a KDL document, with its source location.
///
/// Tokens are ephemeral: they exist between the [`Lexer`](crate::Lexer) and
/// the parser, and are not retained in the parsed document.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What was scanned.
    pub kind: TokenKind,
    /// Offset and length of the token in the source text.
    pub span: SourceSpan,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, span: impl Into<SourceSpan>) -> Self {
        Token {
            kind,
            span: span.into(),
        }
    }
}

/// The kinds of token the lexer produces.
///
/// Comments and line continuations are consumed by the lexer and never
/// surface here; `/-` does, because it participates in the grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A bare identifier, usable as a node name, property key, or string
    /// value.
    Ident(String),
    /// A quoted, raw, or multi-line string, fully decoded (escapes applied,
    /// dedent done).
    Str(String),
    /// A number literal. The raw text is kept; decoding to a value happens
    /// in [`decode`](crate::decode) so that shape and value errors stay
    /// separate.
    Number(String),
    /// `#true`, `#false`, `#null`, `#inf`, `#-inf`, or `#nan`.
    Keyword(Keyword),
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `=`
    Equals,
    /// `;`
    Semicolon,
    /// Any single line break (`\r\n` counts as one).
    Newline,
    /// `/-`
    Slashdash,
    /// End of input.
    Eof,
}

/// The `#`-prefixed keyword literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// `#true`
    True,
    /// `#false`
    False,
    /// `#null`
    Null,
    /// `#inf`
    Inf,
    /// `#-inf`
    NegInf,
    /// `#nan`
    Nan,
}
