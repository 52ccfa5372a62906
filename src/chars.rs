//! Character class predicates from the [KDL 2.0
//! spec](https://github.com/kdl-org/kdl/blob/main/SPEC.md) tables.

/// `unicode-space`: inline whitespace, not line-terminating. The BOM is only
/// permitted at start-of-stream and is handled separately by the lexer.
pub(crate) fn is_unicode_space(c: char) -> bool {
    matches!(
        c,
        '\u{0009}'
            | '\u{0020}'
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
    )
}

/// `newline`: every line-terminating code point. `\r\n` is folded into a
/// single break by the lexer before this is consulted.
pub(crate) fn is_newline(c: char) -> bool {
    matches!(
        c,
        '\u{000A}' | '\u{000B}' | '\u{000C}' | '\u{000D}' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}

/// `disallowed-literal-code-points`:
/// * `U+0000-0008` and `U+000E-001F` (control characters)
/// * `U+007F` (Delete)
/// * `U+200E-200F`, `U+202A-202E`, `U+2066-2069` (direction controls)
/// * `U+FEFF` (ZWNBSP/BOM), except as the first code point of a document
///
/// Lone surrogates can't occur in a `&str`, so they need no predicate.
pub(crate) fn is_disallowed(c: char) -> bool {
    matches!(
        c,
        '\u{0000}'..='\u{0008}'
            | '\u{000E}'..='\u{001F}'
            | '\u{007F}'
            | '\u{200E}'
            | '\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2066}'..='\u{2069}'
            | '\u{FEFF}'
    )
}

/// `identifier-char`: anything that isn't whitespace, a newline, disallowed,
/// or one of the reserved punctuation characters.
pub(crate) fn is_identifier_char(c: char) -> bool {
    !(is_unicode_space(c)
        || is_newline(c)
        || is_disallowed(c)
        || matches!(
            c,
            '\\' | '/' | '(' | ')' | '{' | '}' | ';' | '[' | ']' | '"' | '#' | '=' | ','
        ))
}

/// Keyword-like names that must be quoted to be used as identifiers.
pub(crate) const RESERVED_IDENTIFIERS: &[&str] =
    &["true", "false", "null", "inf", "-inf", "+inf", "nan"];

/// Whether `s` can be written as a bare (unquoted) identifier.
///
/// Rules out empty strings, number-like prefixes, reserved keywords, and any
/// non-identifier character.
pub fn is_bare_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    if first.is_ascii_digit() || !is_identifier_char(first) {
        return false;
    }
    let second = s.chars().nth(1);
    let third = s.chars().nth(2);
    let digit = |c: Option<char>| c.map_or(false, |c| c.is_ascii_digit());
    // Anything that would lex as (the start of) a number must be quoted.
    if matches!(first, '+' | '-') && (digit(second) || (second == Some('.') && digit(third))) {
        return false;
    }
    if first == '.' && digit(second) {
        return false;
    }
    if RESERVED_IDENTIFIERS.contains(&s) {
        return false;
    }
    chars.all(is_identifier_char)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_identifiers() {
        assert!(is_bare_identifier("foo"));
        assert!(is_bare_identifier("foo123"));
        assert!(is_bare_identifier("-"));
        assert!(is_bare_identifier("--"));
        assert!(is_bare_identifier("-foo"));
        assert!(is_bare_identifier(".well-known"));
        assert!(is_bare_identifier("ノード"));

        assert!(!is_bare_identifier(""));
        assert!(!is_bare_identifier("123"));
        assert!(!is_bare_identifier("-1"));
        assert!(!is_bare_identifier("-.5"));
        assert!(!is_bare_identifier(".5"));
        assert!(!is_bare_identifier("true"));
        assert!(!is_bare_identifier("-inf"));
        assert!(!is_bare_identifier("two words"));
        assert!(!is_bare_identifier("semi;colon"));
        assert!(!is_bare_identifier("hash#"));
        assert!(!is_bare_identifier("comma,"));
    }

    #[test]
    fn newline_classes() {
        for c in ['\n', '\r', '\u{0085}', '\u{000B}', '\u{000C}', '\u{2028}', '\u{2029}'] {
            assert!(is_newline(c), "{c:?} should be a newline");
            assert!(!is_unicode_space(c), "{c:?} should not be inline space");
        }
    }
}
