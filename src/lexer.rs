use std::sync::Arc;

use miette::SourceSpan;

use crate::chars;
use crate::token::{Keyword, Token, TokenKind};
use crate::{KdlError, KdlErrorKind};

/// A hand-written scanner over a UTF-8 source string.
///
/// Call [`Lexer::next_token`] repeatedly until it yields
/// [`TokenKind::Eof`]. The lexer skips whitespace, comments (`//` and
/// nestable `/* */`), and line continuations internally; everything else
/// surfaces as a [`Token`] with a source span.
#[derive(Debug)]
pub struct Lexer<'s> {
    source: &'s str,
    input: Arc<String>,
    /// Current byte offset.
    pos: usize,
    /// False immediately after a value-like token: the next character must
    /// separate it (whitespace, newline, or a closing delimiter).
    ready: bool,
}

impl<'s> Lexer<'s> {
    /// Creates a lexer for `source`. A leading BOM is skipped.
    pub fn new(source: &'s str) -> Self {
        Self::with_input(source, Arc::new(source.to_string()))
    }

    pub(crate) fn with_input(source: &'s str, input: Arc<String>) -> Self {
        let mut lexer = Lexer {
            source,
            input,
            pos: 0,
            ready: true,
        };
        if source.starts_with('\u{FEFF}') {
            lexer.pos = '\u{FEFF}'.len_utf8();
        }
        lexer
    }

    /// Scans the next token.
    ///
    /// After `Eof` has been returned once, further calls keep returning
    /// `Eof`. Errors are fatal: the lexer is not left in a resumable state.
    pub fn next_token(&mut self) -> Result<Token, KdlError> {
        self.skip_trivia()?;
        let start = self.pos;
        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(Token::new(TokenKind::Eof, start..start)),
        };

        if chars::is_newline(c) {
            self.eat_newline();
            self.ready = true;
            return Ok(Token::new(TokenKind::Newline, start..self.pos));
        }

        if !self.ready && !matches!(c, ')' | '}' | ';' | '=') {
            self.bump();
            if chars::is_disallowed(c) {
                return Err(self.error(start, KdlErrorKind::DisallowedChar, None, None));
            }
            return Err(self.error(
                start,
                KdlErrorKind::UnexpectedToken,
                Some("expected whitespace after value"),
                None,
            ));
        }

        match c {
            '{' => Ok(self.punct(start, TokenKind::LBrace, true)),
            '}' => Ok(self.punct(start, TokenKind::RBrace, false)),
            '(' => Ok(self.punct(start, TokenKind::LParen, true)),
            ')' => Ok(self.punct(start, TokenKind::RParen, true)),
            '=' => Ok(self.punct(start, TokenKind::Equals, true)),
            ';' => Ok(self.punct(start, TokenKind::Semicolon, true)),
            '/' => {
                // `//` and `/*` were consumed as trivia, so this is either
                // a slashdash or a stray slash.
                self.bump();
                if self.peek() == Some('-') {
                    self.bump();
                    self.ready = true;
                    Ok(Token::new(TokenKind::Slashdash, start..self.pos))
                } else {
                    Err(self.error(
                        start,
                        KdlErrorKind::UnexpectedToken,
                        Some("unexpected '/'"),
                        Some("did you mean a '//' comment or a '/-' slashdash?"),
                    ))
                }
            }
            '#' => self.hash(start),
            '"' => self.quoted_string(start),
            c if c.is_ascii_digit() => self.number(start),
            '+' | '-' if self.looks_numeric() => self.number(start),
            c if chars::is_identifier_char(c) => self.bare_identifier(start),
            c => {
                self.bump();
                if chars::is_disallowed(c) {
                    Err(self.error(start, KdlErrorKind::DisallowedChar, None, None))
                } else {
                    Err(self.error(
                        start,
                        KdlErrorKind::UnexpectedToken,
                        Some("reserved character"),
                        None,
                    ))
                }
            }
        }
    }

    /// Collects every token, Eof included.
    pub(crate) fn lex_all(mut self) -> Result<Vec<Token>, KdlError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut iter = self.source[self.pos..].chars();
        iter.next();
        iter.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.source[self.pos..].starts_with(prefix)
    }

    /// Consumes one line break, folding `\r\n` into a single break.
    fn eat_newline(&mut self) {
        if self.starts_with("\r\n") {
            self.pos += 2;
        } else {
            self.bump();
        }
    }

    fn error(
        &self,
        start: usize,
        kind: KdlErrorKind,
        label: Option<&'static str>,
        help: Option<&'static str>,
    ) -> KdlError {
        let available = self.source.len().saturating_sub(start);
        let len = self.pos.saturating_sub(start).max(1).min(available);
        KdlError {
            input: self.input.clone(),
            span: SourceSpan::new(start.into(), len),
            label,
            help,
            kind,
        }
    }

    fn punct(&mut self, start: usize, kind: TokenKind, ready: bool) -> Token {
        self.bump();
        self.ready = ready;
        Token::new(kind, start..self.pos)
    }

    /// True when a leading `+`/`-` begins a number rather than an identifier.
    fn looks_numeric(&self) -> bool {
        match self.peek_second() {
            Some(c) if c.is_ascii_digit() => true,
            Some('.') => {
                let mut iter = self.source[self.pos..].chars();
                iter.next();
                iter.next();
                iter.next().map_or(false, |c| c.is_ascii_digit())
            }
            _ => false,
        }
    }

    /// Skips inline whitespace, comments, and line continuations.
    fn skip_trivia(&mut self) -> Result<(), KdlError> {
        loop {
            let c = match self.peek() {
                Some(c) => c,
                None => return Ok(()),
            };
            if chars::is_unicode_space(c) {
                self.bump();
                self.ready = true;
            } else if self.starts_with("//") {
                while let Some(c) = self.peek() {
                    if chars::is_newline(c) {
                        break;
                    }
                    self.bump();
                }
                self.ready = true;
            } else if self.starts_with("/*") {
                self.block_comment()?;
                self.ready = true;
            } else if c == '\\' {
                self.line_continuation()?;
                self.ready = true;
            } else {
                return Ok(());
            }
        }
    }

    /// `/* ... */`, nestable.
    fn block_comment(&mut self) -> Result<(), KdlError> {
        let start = self.pos;
        self.pos += 2;
        let mut depth = 1usize;
        while depth > 0 {
            if self.starts_with("*/") {
                self.pos += 2;
                depth -= 1;
            } else if self.starts_with("/*") {
                self.pos += 2;
                depth += 1;
            } else if self.bump().is_none() {
                return Err(self.error(start, KdlErrorKind::UnterminatedComment, None, None));
            }
        }
        Ok(())
    }

    /// `\` + optional whitespace + optional `//` comment + newline (or EOF):
    /// suppresses the line break entirely.
    fn line_continuation(&mut self) -> Result<(), KdlError> {
        let start = self.pos;
        self.bump();
        loop {
            match self.peek() {
                Some(c) if chars::is_unicode_space(c) => {
                    self.bump();
                }
                Some(c) if chars::is_newline(c) => {
                    self.eat_newline();
                    return Ok(());
                }
                Some('/') if self.starts_with("//") => {
                    while let Some(c) = self.peek() {
                        if chars::is_newline(c) {
                            break;
                        }
                        self.bump();
                    }
                }
                None => return Ok(()),
                Some(_) => {
                    self.bump();
                    return Err(self.error(
                        start,
                        KdlErrorKind::InvalidEscape,
                        Some("line continuation must be followed by a newline"),
                        None,
                    ));
                }
            }
        }
    }

    /// `#`: either a keyword literal or a raw string.
    fn hash(&mut self, start: usize) -> Result<Token, KdlError> {
        let mut hashes = 0usize;
        while self.peek() == Some('#') {
            self.bump();
            hashes += 1;
        }
        if self.peek() == Some('"') {
            return self.raw_string(start, hashes);
        }
        if hashes > 1 {
            return Err(self.error(
                start,
                KdlErrorKind::UnexpectedToken,
                Some("unexpected '#'"),
                None,
            ));
        }
        let word_start = self.pos;
        while self.peek().map_or(false, chars::is_identifier_char) {
            self.bump();
        }
        let keyword = match &self.source[word_start..self.pos] {
            "true" => Keyword::True,
            "false" => Keyword::False,
            "null" => Keyword::Null,
            "inf" => Keyword::Inf,
            "-inf" => Keyword::NegInf,
            "nan" => Keyword::Nan,
            _ => {
                return Err(self.error(
                    start,
                    KdlErrorKind::UnexpectedToken,
                    Some("unknown keyword"),
                    Some("expected #true, #false, #null, #inf, #-inf, or #nan"),
                ))
            }
        };
        self.ready = false;
        Ok(Token::new(TokenKind::Keyword(keyword), start..self.pos))
    }

    /// `"`: a single-line quoted string, or a multi-line one if a newline
    /// immediately follows the opening quote.
    fn quoted_string(&mut self, start: usize) -> Result<Token, KdlError> {
        self.bump();
        if self.peek().map_or(false, chars::is_newline) {
            self.eat_newline();
            return self.block_quoted(start);
        }
        let mut value = String::new();
        loop {
            let c = match self.peek() {
                Some(c) => c,
                None => return Err(self.error(start, KdlErrorKind::UnterminatedString, None, None)),
            };
            if chars::is_newline(c) {
                return Err(self.error(
                    start,
                    KdlErrorKind::UnterminatedString,
                    Some("string opened here"),
                    Some("a multi-line string needs a newline right after the opening quote"),
                ));
            }
            match c {
                '"' => {
                    self.bump();
                    break;
                }
                '\\' => self.escape(&mut value)?,
                c if chars::is_disallowed(c) => {
                    let at = self.pos;
                    self.bump();
                    return Err(self.error(at, KdlErrorKind::DisallowedChar, None, None));
                }
                c => {
                    value.push(c);
                    self.bump();
                }
            }
        }
        self.ready = false;
        Ok(Token::new(TokenKind::Str(value), start..self.pos))
    }

    /// One escape sequence inside a single-line quoted string.
    fn escape(&mut self, out: &mut String) -> Result<(), KdlError> {
        let start = self.pos;
        self.bump();
        let c = match self.peek() {
            Some(c) => c,
            None => return Err(self.error(start, KdlErrorKind::InvalidEscape, None, None)),
        };
        match c {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            'b' => out.push('\u{0008}'),
            'f' => out.push('\u{000C}'),
            's' => out.push(' '),
            'u' => {
                self.bump();
                out.push(self.unicode_escape(start)?);
                return Ok(());
            }
            c if chars::is_unicode_space(c) || chars::is_newline(c) => {
                // Whitespace escape: the backslash deletes the entire
                // following run of whitespace and newlines.
                while self
                    .peek()
                    .map_or(false, |c| chars::is_unicode_space(c) || chars::is_newline(c))
                {
                    self.bump();
                }
                return Ok(());
            }
            _ => {
                self.bump();
                return Err(self.error(start, KdlErrorKind::InvalidEscape, None, None));
            }
        }
        self.bump();
        Ok(())
    }

    /// The `{1-6 hex digits}` tail of a `\u` escape. The cursor sits on `{`.
    fn unicode_escape(&mut self, start: usize) -> Result<char, KdlError> {
        if self.peek() != Some('{') {
            self.bump();
            return Err(self.error(start, KdlErrorKind::InvalidEscape, None, None));
        }
        self.bump();
        let digits_start = self.pos;
        while self.peek().map_or(false, |c| c.is_ascii_hexdigit()) {
            self.bump();
        }
        let digits = &self.source[digits_start..self.pos];
        if self.peek() != Some('}') || digits.is_empty() || digits.len() > 6 {
            self.bump();
            return Err(self.error(
                start,
                KdlErrorKind::InvalidHexScalar,
                Some("expected 1-6 hex digits"),
                None,
            ));
        }
        self.bump();
        let value = u32::from_str_radix(digits, 16).expect("already validated as hex");
        char::from_u32(value).ok_or_else(|| {
            self.error(
                start,
                KdlErrorKind::InvalidHexScalar,
                Some("not a unicode scalar value"),
                None,
            )
        })
    }

    /// The body of a multi-line quoted string. The cursor sits just past the
    /// newline that followed the opening quote.
    fn block_quoted(&mut self, start: usize) -> Result<Token, KdlError> {
        let (raw_lines, prefix) = self.block_body(start, None)?;
        let body = self.dedent(start, raw_lines, &prefix)?;
        let value = self.decode_block_escapes(start, &body)?;
        self.ready = false;
        Ok(Token::new(TokenKind::Str(value), start..self.pos))
    }

    /// `#"`: raw strings. `hashes` is the number of leading `#`; the cursor
    /// sits on the opening quote.
    fn raw_string(&mut self, start: usize, hashes: usize) -> Result<Token, KdlError> {
        self.bump();
        if self.peek().map_or(false, chars::is_newline) {
            self.eat_newline();
            let (raw_lines, prefix) = self.block_body(start, Some(hashes))?;
            let value = self.dedent(start, raw_lines, &prefix)?;
            self.ready = false;
            return Ok(Token::new(TokenKind::Str(value), start..self.pos));
        }
        let closer: String = format!("\"{}", "#".repeat(hashes));
        let mut value = String::new();
        loop {
            let c = match self.peek() {
                Some(c) => c,
                None => return Err(self.error(start, KdlErrorKind::UnterminatedString, None, None)),
            };
            if chars::is_newline(c) {
                return Err(self.error(start, KdlErrorKind::UnterminatedString, None, None));
            }
            if self.starts_with(&closer) {
                self.pos += closer.len();
                break;
            }
            if chars::is_disallowed(c) {
                let at = self.pos;
                self.bump();
                return Err(self.error(at, KdlErrorKind::DisallowedChar, None, None));
            }
            value.push(c);
            self.bump();
        }
        self.ready = false;
        Ok(Token::new(TokenKind::Str(value), start..self.pos))
    }

    /// Collects the physical lines of a multi-line string up to (and
    /// consuming) its closing line, returning the raw lines and the closing
    /// line's whitespace prefix.
    ///
    /// For quoted blocks (`raw_hashes == None`) a backslash escapes the
    /// next character, so `\"` does not close; escape *decoding* happens
    /// after dedent.
    fn block_body(
        &mut self,
        start: usize,
        raw_hashes: Option<usize>,
    ) -> Result<(Vec<String>, String), KdlError> {
        let mut lines = Vec::new();
        let mut cur = String::new();
        let mut escaped = false;
        loop {
            let c = match self.peek() {
                Some(c) => c,
                None => return Err(self.error(start, KdlErrorKind::UnterminatedString, None, None)),
            };
            if chars::is_newline(c) {
                self.eat_newline();
                lines.push(std::mem::take(&mut cur));
                escaped = false;
                continue;
            }
            if escaped {
                cur.push(c);
                self.bump();
                escaped = false;
                continue;
            }
            if raw_hashes.is_none() && c == '\\' {
                cur.push(c);
                self.bump();
                escaped = true;
                continue;
            }
            if c == '"' {
                let at_line_start = cur.chars().all(chars::is_unicode_space);
                match raw_hashes {
                    None if at_line_start => {
                        self.bump();
                        return Ok((lines, cur));
                    }
                    None => {
                        let at = self.pos;
                        self.bump();
                        return Err(self.error(
                            at,
                            KdlErrorKind::UnexpectedToken,
                            Some("unescaped quote in multi-line string"),
                            Some("write it as \\\""),
                        ));
                    }
                    Some(hashes) => {
                        let closer: String = format!("\"{}", "#".repeat(hashes));
                        if at_line_start && self.starts_with(&closer) {
                            self.pos += closer.len();
                            return Ok((lines, cur));
                        }
                        cur.push(c);
                        self.bump();
                        continue;
                    }
                }
            }
            if chars::is_disallowed(c) {
                let at = self.pos;
                self.bump();
                return Err(self.error(at, KdlErrorKind::DisallowedChar, None, None));
            }
            cur.push(c);
            self.bump();
        }
    }

    /// Strips the closing line's whitespace prefix from every body line.
    /// Lines that are entirely whitespace are exempt and become empty.
    fn dedent(
        &self,
        start: usize,
        lines: Vec<String>,
        prefix: &str,
    ) -> Result<String, KdlError> {
        let mut out = Vec::with_capacity(lines.len());
        for line in &lines {
            if let Some(rest) = line.strip_prefix(prefix) {
                out.push(rest);
            } else if line.chars().all(chars::is_unicode_space) {
                out.push("");
            } else {
                return Err(self.error(
                    start,
                    KdlErrorKind::BadBlockStringIndent,
                    Some("every line must start with the closing line's indentation"),
                    None,
                ));
            }
        }
        Ok(out.join("\n"))
    }

    /// Applies the escape table to an already-dedented multi-line body.
    fn decode_block_escapes(&self, start: usize, raw: &str) -> Result<String, KdlError> {
        let mut out = String::with_capacity(raw.len());
        let mut iter = raw.chars().peekable();
        while let Some(c) = iter.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match iter.next() {
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some('\\') => out.push('\\'),
                Some('"') => out.push('"'),
                Some('b') => out.push('\u{0008}'),
                Some('f') => out.push('\u{000C}'),
                Some('s') => out.push(' '),
                Some('u') => {
                    if iter.next() != Some('{') {
                        return Err(self.error(start, KdlErrorKind::InvalidEscape, None, None));
                    }
                    let mut digits = String::new();
                    loop {
                        match iter.next() {
                            Some('}') => break,
                            Some(c) if c.is_ascii_hexdigit() && digits.len() < 6 => digits.push(c),
                            _ => {
                                return Err(self.error(
                                    start,
                                    KdlErrorKind::InvalidHexScalar,
                                    Some("expected 1-6 hex digits"),
                                    None,
                                ))
                            }
                        }
                    }
                    if digits.is_empty() {
                        return Err(self.error(
                            start,
                            KdlErrorKind::InvalidHexScalar,
                            Some("expected 1-6 hex digits"),
                            None,
                        ));
                    }
                    let value = u32::from_str_radix(&digits, 16).expect("validated hex");
                    match char::from_u32(value) {
                        Some(c) => out.push(c),
                        None => {
                            return Err(self.error(
                                start,
                                KdlErrorKind::InvalidHexScalar,
                                Some("not a unicode scalar value"),
                                None,
                            ))
                        }
                    }
                }
                Some(c) if chars::is_unicode_space(c) || c == '\n' => {
                    while iter
                        .peek()
                        .map_or(false, |&c| chars::is_unicode_space(c) || c == '\n')
                    {
                        iter.next();
                    }
                }
                _ => return Err(self.error(start, KdlErrorKind::InvalidEscape, None, None)),
            }
        }
        Ok(out)
    }

    /// A number literal. Shape is validated here; conversion happens in
    /// [`decode`](crate::decode).
    fn number(&mut self, start: usize) -> Result<Token, KdlError> {
        if matches!(self.peek(), Some('+') | Some('-')) {
            self.bump();
        }
        if self.starts_with("0x") {
            self.pos += 2;
            self.digit_run(start, 16, "base prefix")?;
        } else if self.starts_with("0o") {
            self.pos += 2;
            self.digit_run(start, 8, "base prefix")?;
        } else if self.starts_with("0b") {
            self.pos += 2;
            self.digit_run(start, 2, "base prefix")?;
        } else {
            self.decimal(start)?;
        }
        // A number must be directly followed by something that can separate
        // it from the next element.
        match self.peek() {
            None => {}
            Some(c)
                if chars::is_unicode_space(c)
                    || chars::is_newline(c)
                    || matches!(c, ';' | ')' | '}' | '=' | '\\' | '/') => {}
            Some(_) => {
                self.bump();
                return Err(self.error(
                    start,
                    KdlErrorKind::MalformedNumber,
                    Some("number runs into the next element"),
                    Some("numbers must be followed by whitespace or a terminator"),
                ));
            }
        }
        self.ready = false;
        Ok(Token::new(
            TokenKind::Number(self.source[start..self.pos].to_string()),
            start..self.pos,
        ))
    }

    /// `digit (digit | '_')*` in the given radix. Returns the last consumed
    /// character so callers can reject `_` adjacent to `.` or an exponent.
    fn digit_run(&mut self, start: usize, radix: u32, after: &'static str) -> Result<char, KdlError> {
        match self.peek() {
            Some(c) if c.is_digit(radix) => {}
            Some('_') => {
                self.bump();
                return Err(self.error(
                    start,
                    KdlErrorKind::MalformedNumber,
                    Some("underscore must follow a digit"),
                    None,
                ));
            }
            _ => {
                self.bump();
                return Err(self.error(
                    start,
                    KdlErrorKind::MalformedNumber,
                    Some("expected a digit"),
                    Some(match after {
                        "base prefix" => "0x, 0o, and 0b must be followed by at least one digit",
                        _ => "numbers must start with a digit",
                    }),
                ));
            }
        }
        let mut last = '0';
        while let Some(c) = self.peek() {
            if c == '_' || c.is_digit(radix) {
                last = c;
                self.bump();
            } else {
                break;
            }
        }
        Ok(last)
    }

    /// Decimal: integer part, optional `.digits`, optional exponent.
    fn decimal(&mut self, start: usize) -> Result<(), KdlError> {
        let mut last = self.digit_run(start, 10, "sign")?;
        if self.peek() == Some('.') && self.peek_second().map_or(false, |c| c.is_ascii_digit()) {
            if last == '_' {
                self.bump();
                return Err(self.error(
                    start,
                    KdlErrorKind::MalformedNumber,
                    Some("underscore next to decimal point"),
                    None,
                ));
            }
            self.bump();
            last = self.digit_run(start, 10, "decimal point")?;
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            if last == '_' {
                self.bump();
                return Err(self.error(
                    start,
                    KdlErrorKind::MalformedNumber,
                    Some("underscore next to exponent"),
                    None,
                ));
            }
            self.bump();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.bump();
            }
            if self.peek() == Some('_') {
                self.bump();
                return Err(self.error(
                    start,
                    KdlErrorKind::MalformedNumber,
                    Some("underscore next to exponent"),
                    None,
                ));
            }
            self.digit_run(start, 10, "exponent")?;
        }
        Ok(())
    }

    /// A bare identifier.
    fn bare_identifier(&mut self, start: usize) -> Result<Token, KdlError> {
        while self.peek().map_or(false, chars::is_identifier_char) {
            self.bump();
        }
        let text = &self.source[start..self.pos];
        let mut cs = text.chars();
        let first = cs.next().expect("identifier has at least one char");
        if first == '.' && cs.next().map_or(false, |c| c.is_ascii_digit()) {
            return Err(self.error(
                start,
                KdlErrorKind::MalformedNumber,
                Some("looks like a number"),
                Some("identifiers cannot start with '.' followed by a digit"),
            ));
        }
        if chars::RESERVED_IDENTIFIERS.contains(&text) {
            return Err(self.error(
                start,
                KdlErrorKind::ReservedIdentifier,
                Some("must be quoted"),
                Some("write #true/#false/#null/#inf/#-inf/#nan for the keyword, or quote it for the string"),
            ));
        }
        self.ready = false;
        Ok(Token::new(
            TokenKind::Ident(text.to_string()),
            start..self.pos,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .lex_all()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn kind_err(src: &str) -> KdlErrorKind {
        Lexer::new(src).lex_all().unwrap_err().kind
    }

    #[test]
    fn basic_tokens() {
        assert_eq!(
            kinds("node 1 two=3 {"),
            vec![
                TokenKind::Ident("node".into()),
                TokenKind::Number("1".into()),
                TokenKind::Ident("two".into()),
                TokenKind::Equals,
                TokenKind::Number("3".into()),
                TokenKind::LBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comments_and_continuations() {
        assert_eq!(
            kinds("a // rest\nb /* x /* nested */ y */ c \\\n  d"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Newline,
                TokenKind::Ident("b".into()),
                TokenKind::Ident("c".into()),
                TokenKind::Ident("d".into()),
                TokenKind::Eof,
            ]
        );
        assert_eq!(kind_err("/* open"), KdlErrorKind::UnterminatedComment);
    }

    #[test]
    fn strings() {
        assert_eq!(
            kinds(r#""a\tb\u{1F600}""#),
            vec![TokenKind::Str("a\tb\u{1F600}".into()), TokenKind::Eof]
        );
        assert_eq!(
            kinds(r##"#"raw\nnot-escaped"#"##),
            vec![TokenKind::Str(r"raw\nnot-escaped".into()), TokenKind::Eof]
        );
        assert_eq!(
            kinds("##\"has \"# inside\"##"),
            vec![TokenKind::Str("has \"# inside".into()), TokenKind::Eof]
        );
        assert_eq!(kind_err("\"open"), KdlErrorKind::UnterminatedString);
        assert_eq!(kind_err(r#""bad \q""#), KdlErrorKind::InvalidEscape);
        assert_eq!(kind_err(r#""\u{110000}""#), KdlErrorKind::InvalidHexScalar);
    }

    #[test]
    fn block_strings() {
        let src = "\"\n    line 1\n    line 2\n    \"";
        assert_eq!(kinds(src), vec![TokenKind::Str("line 1\nline 2".into()), TokenKind::Eof]);

        // Whitespace-only lines don't need the prefix.
        let src = "\"\n    one\n\n    two\n    \"";
        assert_eq!(kinds(src), vec![TokenKind::Str("one\n\ntwo".into()), TokenKind::Eof]);

        let src = "\"\n    ok\n  short\n    \"";
        assert_eq!(kind_err(src), KdlErrorKind::BadBlockStringIndent);

        // Raw block: no escape processing, dedent still applies.
        let src = "#\"\n  a\\n\n  b\n  \"#";
        assert_eq!(kinds(src), vec![TokenKind::Str("a\\n\nb".into()), TokenKind::Eof]);
    }

    #[test]
    fn numbers() {
        assert_eq!(
            kinds("0xdead_beef 0o17 0b10_01 -12 +4 1_000.5e-2"),
            vec![
                TokenKind::Number("0xdead_beef".into()),
                TokenKind::Number("0o17".into()),
                TokenKind::Number("0b10_01".into()),
                TokenKind::Number("-12".into()),
                TokenKind::Number("+4".into()),
                TokenKind::Number("1_000.5e-2".into()),
                TokenKind::Eof,
            ]
        );
        assert_eq!(kind_err("0x_FF"), KdlErrorKind::MalformedNumber);
        assert_eq!(kind_err("0x"), KdlErrorKind::MalformedNumber);
        assert_eq!(kind_err("1._5"), KdlErrorKind::MalformedNumber);
        assert_eq!(kind_err("1_.5"), KdlErrorKind::MalformedNumber);
        assert_eq!(kind_err("1e_5"), KdlErrorKind::MalformedNumber);
        assert_eq!(kind_err("1."), KdlErrorKind::MalformedNumber);
        assert_eq!(kind_err("1abc"), KdlErrorKind::MalformedNumber);
        assert_eq!(kind_err(".5"), KdlErrorKind::MalformedNumber);
    }

    #[test]
    fn keywords_and_reserved() {
        assert_eq!(
            kinds("#true #false #null #inf #-inf #nan"),
            vec![
                TokenKind::Keyword(Keyword::True),
                TokenKind::Keyword(Keyword::False),
                TokenKind::Keyword(Keyword::Null),
                TokenKind::Keyword(Keyword::Inf),
                TokenKind::Keyword(Keyword::NegInf),
                TokenKind::Keyword(Keyword::Nan),
                TokenKind::Eof,
            ]
        );
        assert_eq!(kind_err("true"), KdlErrorKind::ReservedIdentifier);
        assert_eq!(kind_err("-inf"), KdlErrorKind::ReservedIdentifier);
        assert_eq!(kind_err("#TRUE"), KdlErrorKind::UnexpectedToken);
    }

    #[test]
    fn value_separation() {
        assert_eq!(kind_err("1\"two\""), KdlErrorKind::MalformedNumber);
        assert_eq!(kind_err("\"a\"\"b\""), KdlErrorKind::UnexpectedToken);
        // Closers and '=' do not need separation.
        assert_eq!(
            kinds("a=1;"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Equals,
                TokenKind::Number("1".into()),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn bom_and_disallowed() {
        assert_eq!(kinds("\u{FEFF}node"), vec![TokenKind::Ident("node".into()), TokenKind::Eof]);
        assert_eq!(kind_err("a \u{FEFF}b"), KdlErrorKind::DisallowedChar);
        assert_eq!(kind_err("a \u{0007}"), KdlErrorKind::DisallowedChar);
        assert_eq!(kind_err("a \u{202E}b"), KdlErrorKind::DisallowedChar);
    }
}
