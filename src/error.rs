use std::sync::Arc;

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// The error type for KDL parsing: returned whenever a source string fails
/// to lex, parse, or transform.
///
/// This diagnostic implements [`miette::Diagnostic`] and can be used to
/// display detailed, pretty-printed diagnostic messages when using
/// [`miette::Result`] and the `"fancy"` feature flag for `miette`:
///
/// ```no_run
/// fn main() -> miette::Result<()> {
///     "foo 1.".parse::<kuddle::KdlDocument>()?;
///     Ok(())
/// }
/// ```
///
/// This will display a message like:
/// ```text
/// Error:
///   × Malformed number.
///    ╭────
///  1 │ foo 1.
///    ·     ─┬
///    ·      ╰── number ends with a dot
///    ╰────
///   help: Floating point numbers must have digits after the decimal point.
/// ```
#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
#[error("{kind}")]
pub struct KdlError {
    /// Original input that this failure came from.
    #[source_code]
    pub input: Arc<String>,

    /// Offset and length of the offending source text.
    #[label("{}", label.unwrap_or("here"))]
    pub span: SourceSpan,

    /// Label text for this span. Defaults to `"here"`.
    pub label: Option<&'static str>,

    /// Suggestion for fixing the error.
    #[help]
    pub help: Option<&'static str>,

    /// Specific error kind for this failure.
    pub kind: KdlErrorKind,
}

/// A type representing additional information specific to the type of error
/// being returned. The set is closed: every failure the lexer, parser, or
/// transform layer can report is one of these.
#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
pub enum KdlErrorKind {
    /// A string literal was still open when its line (or the input) ended.
    #[error("Unterminated string.")]
    #[diagnostic(code(kuddle::lex::unterminated_string))]
    UnterminatedString,

    /// A `/* ... */` comment was still open at the end of input.
    #[error("Unterminated block comment.")]
    #[diagnostic(code(kuddle::lex::unterminated_comment))]
    UnterminatedComment,

    /// A backslash escape that isn't part of the KDL escape table.
    #[error("Invalid escape sequence.")]
    #[diagnostic(code(kuddle::lex::invalid_escape))]
    InvalidEscape,

    /// A `\u{...}` escape that does not name a Unicode scalar value.
    #[error("Invalid unicode scalar in escape.")]
    #[diagnostic(code(kuddle::lex::invalid_hex_scalar))]
    InvalidHexScalar,

    /// A code point that may never appear in KDL source.
    #[error("Code point not allowed in KDL source.")]
    #[diagnostic(code(kuddle::lex::disallowed_char))]
    DisallowedChar,

    /// A number literal with an invalid shape.
    #[error("Malformed number.")]
    #[diagnostic(code(kuddle::lex::malformed_number))]
    MalformedNumber,

    /// A line of a multi-line string does not start with the closing line's
    /// whitespace prefix.
    #[error("Multi-line string indentation does not match its closing line.")]
    #[diagnostic(code(kuddle::lex::bad_block_string_indent))]
    BadBlockStringIndent,

    /// `true`, `false`, `null`, `inf`, `-inf`, or `nan` written as a bare
    /// identifier.
    #[error("Reserved keyword used as a bare identifier.")]
    #[diagnostic(code(kuddle::lex::reserved_identifier))]
    ReservedIdentifier,

    /// Valid token in an invalid position.
    #[error("Unexpected token.")]
    #[diagnostic(code(kuddle::parse::unexpected_token))]
    UnexpectedToken,

    /// Input ended in the middle of a grammatical element.
    #[error("Unexpected end of input.")]
    #[diagnostic(code(kuddle::parse::unexpected_eof))]
    UnexpectedEof,

    /// Something other than an identifier or string on the left of `=`.
    #[error("Invalid property key.")]
    #[diagnostic(code(kuddle::parse::bad_property_key))]
    BadPropertyKey,

    /// A `#`-keyword literal where an identifier is required.
    #[error("Keyword literal used where an identifier is expected.")]
    #[diagnostic(code(kuddle::parse::keyword_as_identifier))]
    DuplicateBareIdentifierKeyword,

    /// A `/-` with no following element to discard.
    #[error("Slashdash with nothing to discard.")]
    #[diagnostic(code(kuddle::parse::dangling_slashdash))]
    DanglingSlashdash,

    /// A user-supplied transformer returned an error.
    #[error("Transform failed: {0}")]
    #[diagnostic(code(kuddle::transform::failed))]
    TransformError(String),
}
