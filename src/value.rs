use std::fmt::Display;

use crate::emit;

/// A specific [KDL Value](https://github.com/kdl-org/kdl/blob/main/SPEC.md#value).
///
/// Values are a closed sum: every literal a KDL document can contain decodes
/// to exactly one of these. Type annotations are carried next to the value
/// by [`KdlEntry`](crate::KdlEntry), not inside it.
#[derive(Debug, Clone, PartialOrd)]
pub enum KdlValue {
    /// A [KDL String](https://github.com/kdl-org/kdl/blob/main/SPEC.md#string),
    /// from any of the six string shapes or a bare identifier in value
    /// position.
    String(String),

    /// A non-float [KDL Number](https://github.com/kdl-org/kdl/blob/main/SPEC.md#number),
    /// from any of the four bases.
    Integer(i128),

    /// A floating point [KDL
    /// Number](https://github.com/kdl-org/kdl/blob/main/SPEC.md#number):
    /// a decimal literal with a fraction or exponent, or `#inf`/`#-inf`/`#nan`.
    Float(f64),

    /// `#true` or `#false`.
    Bool(bool),

    /// `#null`.
    Null,
}

impl Eq for KdlValue {}

impl PartialEq for KdlValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(l), Self::String(r)) => l == r,
            (Self::Integer(l), Self::Integer(r)) => l == r,
            // All NaNs compare equal so that documents containing #nan
            // still satisfy semantic round-trip equality.
            (Self::Float(l), Self::Float(r)) => (l.is_nan() && r.is_nan()) || l == r,
            (Self::Bool(l), Self::Bool(r)) => l == r,
            (Self::Null, Self::Null) => true,
            _ => false,
        }
    }
}

impl std::hash::Hash for KdlValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            KdlValue::String(val) => val.hash(state),
            KdlValue::Integer(val) => val.hash(state),
            KdlValue::Float(val) => {
                // Must agree with Eq: one bucket for every NaN, one for
                // both zeros.
                let bits = if val.is_nan() {
                    f64::NAN.to_bits()
                } else if *val == 0.0 {
                    0
                } else {
                    val.to_bits()
                };
                bits.hash(state);
            }
            KdlValue::Bool(val) => val.hash(state),
            KdlValue::Null => {}
        }
    }
}

impl KdlValue {
    /// Returns `true` if the value is a [`KdlValue::String`].
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(..))
    }

    /// Returns `true` if the value is a [`KdlValue::Integer`].
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Integer(..))
    }

    /// Returns `true` if the value is a [`KdlValue::Float`].
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float(..))
    }

    /// Returns `true` if the value is a [`KdlValue::Bool`].
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(..))
    }

    /// Returns `true` if the value is a [`KdlValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `Some(&str)` if the `KdlValue` is a [`KdlValue::String`],
    /// otherwise returns `None`.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `Some(i128)` if the `KdlValue` is a [`KdlValue::Integer`],
    /// otherwise returns `None`.
    pub fn as_integer(&self) -> Option<i128> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns `Some(f64)` if the `KdlValue` is a [`KdlValue::Float`],
    /// otherwise returns `None`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns `Some(bool)` if the `KdlValue` is a [`KdlValue::Bool`],
    /// otherwise returns `None`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl Display for KdlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        emit::write_value(f, self)
    }
}

impl From<i128> for KdlValue {
    fn from(value: i128) -> Self {
        KdlValue::Integer(value)
    }
}

impl From<i64> for KdlValue {
    fn from(value: i64) -> Self {
        KdlValue::Integer(value.into())
    }
}

impl From<i32> for KdlValue {
    fn from(value: i32) -> Self {
        KdlValue::Integer(value.into())
    }
}

impl From<f64> for KdlValue {
    fn from(value: f64) -> Self {
        KdlValue::Float(value)
    }
}

impl From<&str> for KdlValue {
    fn from(value: &str) -> Self {
        KdlValue::String(value.to_string())
    }
}

impl From<String> for KdlValue {
    fn from(value: String) -> Self {
        KdlValue::String(value)
    }
}

impl From<bool> for KdlValue {
    fn from(value: bool) -> Self {
        KdlValue::Bool(value)
    }
}

impl<T> From<Option<T>> for KdlValue
where
    T: Into<KdlValue>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => KdlValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatting() {
        assert_eq!(format!("{}", KdlValue::String("foo\n".into())), r#""foo\n""#);
        assert_eq!(format!("{}", KdlValue::String("foo".into())), "foo");
        assert_eq!(format!("{}", KdlValue::Integer(1234567890)), "1234567890");
        assert_eq!(format!("{}", KdlValue::Float(10.0)), "10.0");
        assert_eq!(format!("{}", KdlValue::Float(f64::INFINITY)), "#inf");
        assert_eq!(format!("{}", KdlValue::Float(f64::NAN)), "#nan");
        assert_eq!(format!("{}", KdlValue::Bool(true)), "#true");
        assert_eq!(format!("{}", KdlValue::Null), "#null");
    }

    #[test]
    fn nan_equality() {
        assert_eq!(KdlValue::Float(f64::NAN), KdlValue::Float(f64::NAN));
        assert_ne!(KdlValue::Float(f64::NAN), KdlValue::Float(0.0));
        assert_eq!(KdlValue::Float(0.0), KdlValue::Float(-0.0));
    }
}
