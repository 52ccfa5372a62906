//! Declarative schema descriptors for binding documents to typed objects.
//!
//! A [`NodeSchema`] describes one node class: an ordered list of [`Slot`]s
//! classifying the node's arguments, properties, and children. A
//! [`DocumentSchema`] names the group of node classes recognized at the top
//! level. Descriptors are built explicitly through [`NodeSchema::builder`] —
//! there is no runtime reflection — and are cheap handles over shared
//! storage, so a class builds its descriptor once (typically in a
//! `LazyLock`) and clones it freely.
//!
//! ```
//! use std::sync::LazyLock;
//! use kuddle::{NodeSchema, ValueType};
//!
//! static PERSON: LazyLock<NodeSchema> = LazyLock::new(|| {
//!     NodeSchema::builder("person")
//!         .argument("name", ValueType::String)
//!         .optional_property("age", ValueType::Integer, 0)
//!         .build()
//! });
//! ```
//!
//! Builder misuse (duplicate fields, a required argument after an optional
//! one, two catch-alls of one kind) is a bug in the embedding program, not
//! in its input, and panics.

use std::sync::Arc;

use crate::KdlValue;

/// The scalar shape a slot expects.
///
/// Coercion is deliberately narrow: beyond exact matches, an `Integer`
/// argument satisfies a `Float` slot, and a `String` satisfies `Date` or
/// `DateTime` slots when it parses as ISO 8601. Everything else is a
/// [`TypeMismatch`](crate::BindErrorKind::TypeMismatch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Any value at all.
    Any,
    /// A KDL string.
    String,
    /// A KDL integer.
    Integer,
    /// A KDL float; integers widen.
    Float,
    /// A KDL boolean.
    Bool,
    /// An ISO 8601 calendar date, from a string.
    Date,
    /// An ISO 8601 date and time, from a string.
    DateTime,
}

impl ValueType {
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            ValueType::Any => "any value",
            ValueType::String => "a string",
            ValueType::Integer => "an integer",
            ValueType::Float => "a float",
            ValueType::Bool => "a boolean",
            ValueType::Date => "an ISO 8601 date",
            ValueType::DateTime => "an ISO 8601 date-time",
        }
    }
}

/// What a [`Slot`] classifies.
#[derive(Debug, Clone)]
pub enum SlotKind {
    /// One positional argument. A default makes it optional; optional
    /// arguments must trail required ones.
    Argument {
        /// Expected value shape.
        ty: ValueType,
        /// Value used when the argument is absent; `None` means required.
        default: Option<KdlValue>,
    },
    /// One named property.
    Property {
        /// The property key in KDL source (the field name unless renamed).
        key: String,
        /// Expected value shape.
        ty: ValueType,
        /// Value used when the property is absent; `None` means required.
        default: Option<KdlValue>,
    },
    /// Exactly one child node of the given class.
    Child(NodeSchema),
    /// Every child node whose class is in the union, in appearance order.
    Children(Vec<NodeSchema>),
    /// Catch-all for positional arguments no `Argument` slot consumed.
    OtherArguments,
    /// Catch-all for properties no `Property` slot consumed.
    OtherProperties,
    /// Catch-all for children no child slot accepted, kept as raw nodes.
    OtherChildren,
}

/// One field of a node class.
#[derive(Debug, Clone)]
pub struct Slot {
    pub(crate) field: String,
    pub(crate) kind: SlotKind,
}

impl Slot {
    /// The field name this slot binds into.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// What the slot classifies.
    pub fn kind(&self) -> &SlotKind {
        &self.kind
    }
}

#[derive(Debug)]
pub(crate) struct SchemaInner {
    pub(crate) name: String,
    pub(crate) slots: Vec<Slot>,
}

/// The descriptor for one node class. Cheap to clone; all clones share the
/// same slot storage.
#[derive(Debug, Clone)]
pub struct NodeSchema {
    pub(crate) inner: Arc<SchemaInner>,
}

impl NodeSchema {
    /// Starts building a descriptor for nodes named `name`.
    ///
    /// The name doubles as the class name; pick a different `name` here to
    /// recognize a different KDL node name than your type's.
    pub fn builder(name: impl Into<String>) -> NodeSchemaBuilder {
        NodeSchemaBuilder {
            name: name.into(),
            slots: Vec::new(),
            has_optional_argument: false,
        }
    }

    /// The KDL node name this class matches.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The class's slots, in declaration order.
    pub fn slots(&self) -> &[Slot] {
        &self.inner.slots
    }
}

/// Builder for [`NodeSchema`]. See the [module docs](self) for an example.
#[derive(Debug)]
pub struct NodeSchemaBuilder {
    name: String,
    slots: Vec<Slot>,
    has_optional_argument: bool,
}

impl NodeSchemaBuilder {
    fn push(&mut self, field: impl Into<String>, kind: SlotKind) {
        let field = field.into();
        assert!(
            !self.slots.iter().any(|s| s.field == field),
            "schema {:?} declares field {field:?} twice",
            self.name
        );
        if let SlotKind::OtherArguments | SlotKind::OtherProperties | SlotKind::OtherChildren =
            kind
        {
            assert!(
                !self
                    .slots
                    .iter()
                    .any(|s| std::mem::discriminant(&s.kind) == std::mem::discriminant(&kind)),
                "schema {:?} declares two catch-alls of the same kind",
                self.name
            );
        }
        self.slots.push(Slot { field, kind });
    }

    /// A required positional argument.
    pub fn argument(mut self, field: impl Into<String>, ty: ValueType) -> Self {
        assert!(
            !self.has_optional_argument,
            "schema {:?}: required arguments must come before optional ones",
            self.name
        );
        self.push(field, SlotKind::Argument { ty, default: None });
        self
    }

    /// An optional positional argument with a default.
    pub fn optional_argument(
        mut self,
        field: impl Into<String>,
        ty: ValueType,
        default: impl Into<KdlValue>,
    ) -> Self {
        self.has_optional_argument = true;
        self.push(
            field,
            SlotKind::Argument {
                ty,
                default: Some(default.into()),
            },
        );
        self
    }

    /// A required property, keyed by the field name.
    pub fn property(self, field: impl Into<String>, ty: ValueType) -> Self {
        let field = field.into();
        let key = field.clone();
        self.property_as(field, key, ty)
    }

    /// A required property with an explicit KDL key.
    pub fn property_as(
        mut self,
        field: impl Into<String>,
        key: impl Into<String>,
        ty: ValueType,
    ) -> Self {
        self.push(
            field,
            SlotKind::Property {
                key: key.into(),
                ty,
                default: None,
            },
        );
        self
    }

    /// An optional property with a default, keyed by the field name.
    pub fn optional_property(
        self,
        field: impl Into<String>,
        ty: ValueType,
        default: impl Into<KdlValue>,
    ) -> Self {
        let field = field.into();
        let key = field.clone();
        self.optional_property_as(field, key, ty, default)
    }

    /// An optional property with an explicit KDL key and a default.
    pub fn optional_property_as(
        mut self,
        field: impl Into<String>,
        key: impl Into<String>,
        ty: ValueType,
        default: impl Into<KdlValue>,
    ) -> Self {
        self.push(
            field,
            SlotKind::Property {
                key: key.into(),
                ty,
                default: Some(default.into()),
            },
        );
        self
    }

    /// Exactly one child of the given class.
    pub fn child(mut self, field: impl Into<String>, class: &NodeSchema) -> Self {
        self.push(field, SlotKind::Child(class.clone()));
        self
    }

    /// All children whose class is in the union, collected in appearance
    /// order.
    pub fn children<'a>(
        mut self,
        field: impl Into<String>,
        classes: impl IntoIterator<Item = &'a NodeSchema>,
    ) -> Self {
        self.push(
            field,
            SlotKind::Children(classes.into_iter().cloned().collect()),
        );
        self
    }

    /// Catch-all for arguments not consumed by `argument` slots.
    pub fn other_arguments(mut self, field: impl Into<String>) -> Self {
        self.push(field, SlotKind::OtherArguments);
        self
    }

    /// Catch-all for properties not consumed by `property` slots.
    pub fn other_properties(mut self, field: impl Into<String>) -> Self {
        self.push(field, SlotKind::OtherProperties);
        self
    }

    /// Catch-all for children not accepted by any child slot.
    pub fn other_children(mut self, field: impl Into<String>) -> Self {
        self.push(field, SlotKind::OtherChildren);
        self
    }

    /// Finishes the descriptor.
    pub fn build(self) -> NodeSchema {
        NodeSchema {
            inner: Arc::new(SchemaInner {
                name: self.name,
                slots: self.slots,
            }),
        }
    }
}

/// The top-level schema: which node classes a document may contain.
#[derive(Debug, Clone, Default)]
pub struct DocumentSchema {
    pub(crate) group: Vec<NodeSchema>,
    pub(crate) keep_unknown: bool,
}

impl DocumentSchema {
    /// Creates a document schema over the given node group.
    pub fn new<'a>(group: impl IntoIterator<Item = &'a NodeSchema>) -> Self {
        DocumentSchema {
            group: group.into_iter().cloned().collect(),
            keep_unknown: false,
        }
    }

    /// Keep top-level nodes whose names aren't in the group as raw nodes
    /// instead of failing with
    /// [`UnknownNode`](crate::BindErrorKind::UnknownNode).
    pub fn allow_other_children(mut self) -> Self {
        self.keep_unknown = true;
        self
    }

    /// The node classes this document recognizes.
    pub fn group(&self) -> &[NodeSchema] {
        &self.group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "declares field \"x\" twice")]
    fn duplicate_field_panics() {
        let _ = NodeSchema::builder("n")
            .argument("x", ValueType::Integer)
            .property("x", ValueType::String);
    }

    #[test]
    #[should_panic(expected = "required arguments must come before optional ones")]
    fn required_after_optional_panics() {
        let _ = NodeSchema::builder("n")
            .optional_argument("a", ValueType::Integer, 0)
            .argument("b", ValueType::Integer);
    }

    #[test]
    #[should_panic(expected = "two catch-alls of the same kind")]
    fn double_catch_all_panics() {
        let _ = NodeSchema::builder("n")
            .other_children("rest")
            .other_children("more");
    }
}
