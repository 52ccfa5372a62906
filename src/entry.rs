use std::fmt::Display;

use miette::SourceSpan;

use crate::{emit, KdlValue};

/// A value plus its optional type annotation.
///
/// Entries are what nodes actually hold for both
/// [`Argument`s](https://github.com/kdl-org/kdl/blob/main/SPEC.md#argument)
/// and the value side of
/// [`Property`s](https://github.com/kdl-org/kdl/blob/main/SPEC.md#property).
/// The annotation survives parsing — and any transformer that ran — as
/// metadata.
#[derive(Debug, Clone)]
pub struct KdlEntry {
    pub(crate) ty: Option<String>,
    pub(crate) value: KdlValue,
    pub(crate) span: SourceSpan,
}

impl KdlEntry {
    /// Creates a new entry without a type annotation.
    pub fn new(value: impl Into<KdlValue>) -> Self {
        KdlEntry {
            ty: None,
            value: value.into(),
            span: SourceSpan::from(0..0),
        }
    }

    /// Creates a new entry with a type annotation, e.g. `(u8)231`.
    pub fn new_typed(ty: impl Into<String>, value: impl Into<KdlValue>) -> Self {
        KdlEntry {
            ty: Some(ty.into()),
            value: value.into(),
            span: SourceSpan::from(0..0),
        }
    }

    /// Gets this entry's type annotation, if any.
    pub fn ty(&self) -> Option<&str> {
        self.ty.as_deref()
    }

    /// Sets this entry's type annotation.
    pub fn set_ty(&mut self, ty: impl Into<String>) {
        self.ty = Some(ty.into());
    }

    /// Gets the entry's value.
    pub fn value(&self) -> &KdlValue {
        &self.value
    }

    /// Gets a mutable reference to this entry's value.
    pub fn value_mut(&mut self) -> &mut KdlValue {
        &mut self.value
    }

    /// Sets the entry's value.
    pub fn set_value(&mut self, value: impl Into<KdlValue>) {
        self.value = value.into();
    }

    /// Gets this entry's span.
    ///
    /// This value is properly initialized when the entry came out of a
    /// parse, and zero otherwise.
    pub fn span(&self) -> SourceSpan {
        self.span
    }
}

impl PartialEq for KdlEntry {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty && self.value == other.value
        // Intentionally omitted: self.span == other.span
    }
}

impl Eq for KdlEntry {}

impl std::hash::Hash for KdlEntry {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.ty.hash(state);
        self.value.hash(state);
        // Intentionally omitted: self.span.hash(state)
    }
}

impl Display for KdlEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        emit::write_entry(f, self)
    }
}

impl<T> From<T> for KdlEntry
where
    T: Into<KdlValue>,
{
    fn from(value: T) -> Self {
        KdlEntry::new(value)
    }
}
