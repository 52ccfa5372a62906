//! Conversion of number and keyword tokens into [`KdlValue`]s.
//!
//! The lexer validates the *shape* of a number and hands the raw text over;
//! this module turns it into a value. Keeping the steps separate means shape
//! errors point at the malformed character while range errors cover the
//! whole literal.

use std::sync::Arc;

use miette::SourceSpan;

use crate::token::Keyword;
use crate::{KdlError, KdlErrorKind, KdlValue};

/// Decodes a validated number literal.
///
/// Integers decode to [`KdlValue::Integer`]; the presence of a `.` or an
/// exponent makes the literal a [`KdlValue::Float`]. Magnitudes that do not
/// fit in an `i128` are an error rather than silently promoting or wrapping.
pub(crate) fn number(
    text: &str,
    span: SourceSpan,
    input: &Arc<String>,
) -> Result<KdlValue, KdlError> {
    let text = text.replace('_', "");
    let (negative, magnitude) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(&text)),
    };

    let radix = match magnitude.get(..2) {
        Some("0x") => Some(16),
        Some("0o") => Some(8),
        Some("0b") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let value = i128::from_str_radix(&magnitude[2..], radix)
            .map_err(|_| overflow(span, input))?;
        return Ok(KdlValue::Integer(if negative { -value } else { value }));
    }

    if magnitude.contains(['.', 'e', 'E']) {
        let value: f64 = text.parse().expect("lexer validated the float shape");
        return Ok(KdlValue::Float(value));
    }

    let value: i128 = text.parse().map_err(|_| overflow(span, input))?;
    Ok(KdlValue::Integer(value))
}

fn overflow(span: SourceSpan, input: &Arc<String>) -> KdlError {
    KdlError {
        input: input.clone(),
        span,
        label: Some("does not fit in an integer"),
        help: Some("integers are limited to 128 bits; use a float for larger magnitudes"),
        kind: KdlErrorKind::MalformedNumber,
    }
}

/// Decodes a keyword token.
pub(crate) fn keyword(keyword: Keyword) -> KdlValue {
    match keyword {
        Keyword::True => KdlValue::Bool(true),
        Keyword::False => KdlValue::Bool(false),
        Keyword::Null => KdlValue::Null,
        Keyword::Inf => KdlValue::Float(f64::INFINITY),
        Keyword::NegInf => KdlValue::Float(f64::NEG_INFINITY),
        Keyword::Nan => KdlValue::Float(f64::NAN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(text: &str) -> KdlValue {
        let input = Arc::new(text.to_string());
        number(text, (0..text.len()).into(), &input).unwrap()
    }

    #[test]
    fn integers() {
        assert_eq!(num("1_234"), KdlValue::Integer(1234));
        assert_eq!(num("-42"), KdlValue::Integer(-42));
        assert_eq!(num("0xdead_beef"), KdlValue::Integer(0xdeadbeef));
        assert_eq!(num("-0x10"), KdlValue::Integer(-16));
        assert_eq!(num("0o777"), KdlValue::Integer(0o777));
        assert_eq!(num("0b1010"), KdlValue::Integer(10));
    }

    #[test]
    fn floats() {
        assert_eq!(num("1.5"), KdlValue::Float(1.5));
        assert_eq!(num("12_34.56"), KdlValue::Float(1234.56));
        assert_eq!(num("1e3"), KdlValue::Float(1000.0));
        assert_eq!(num("-2.5E-2"), KdlValue::Float(-0.025));
    }

    #[test]
    fn overflow_is_an_error() {
        let text = "170141183460469231731687303715884105728"; // i128::MAX + 1
        let input = Arc::new(text.to_string());
        let err = number(text, (0..text.len()).into(), &input).unwrap_err();
        assert_eq!(err.kind, KdlErrorKind::MalformedNumber);
    }
}
