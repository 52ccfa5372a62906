//! The binder: reduces a parsed document against schema descriptors,
//! producing a typed object graph, and serializes that graph back to KDL.
//!
//! Binding is top-down and fail-fast: the first mismatch is reported with
//! the span of the offending node or entry and nothing is returned.

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::schema::{DocumentSchema, NodeSchema, SlotKind, ValueType};
use crate::{parser, KdlDocument, KdlError, KdlNode, KdlValue};

/// A failed binding of a document or node against a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{kind}")]
pub struct KdlBindError {
    /// Location of the offending node or entry in the source document.
    #[label("{}", label.unwrap_or("here"))]
    pub span: SourceSpan,

    /// Label text for this span. Defaults to `"here"`.
    pub label: Option<&'static str>,

    /// Suggestion for fixing the mismatch.
    #[help]
    pub help: Option<String>,

    /// Which binding rule was violated.
    pub kind: BindErrorKind,
}

/// The closed set of ways a document can fail to match a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum BindErrorKind {
    /// A node whose name is not in the current node group.
    #[error("No class in the node group matches {0:?}.")]
    #[diagnostic(code(kuddle::bind::unknown_node))]
    UnknownNode(String),

    /// A required positional argument was absent.
    #[error("Node {node:?} is missing its {field:?} argument.")]
    #[diagnostic(code(kuddle::bind::missing_argument))]
    MissingArgument {
        /// Node class name.
        node: String,
        /// Field the argument binds into.
        field: String,
    },

    /// More positional arguments than argument slots, and no catch-all.
    #[error("Too many arguments for node {node:?}.")]
    #[diagnostic(code(kuddle::bind::extra_argument))]
    ExtraArgument {
        /// Node class name.
        node: String,
    },

    /// A required property was absent.
    #[error("Node {node:?} is missing required property {key:?}.")]
    #[diagnostic(code(kuddle::bind::missing_property))]
    MissingProperty {
        /// Node class name.
        node: String,
        /// The missing property key.
        key: String,
    },

    /// A property no slot accepts, and no catch-all.
    #[error("Node {node:?} does not accept property {key:?}.")]
    #[diagnostic(code(kuddle::bind::extra_property))]
    ExtraProperty {
        /// Node class name.
        node: String,
        /// The unexpected property key.
        key: String,
    },

    /// A single-child slot with no matching child.
    #[error("Node {node:?} requires a {child:?} child.")]
    #[diagnostic(code(kuddle::bind::missing_child))]
    MissingChild {
        /// Node class name.
        node: String,
        /// The required child class.
        child: String,
    },

    /// A single-child slot matched by more than one child.
    #[error("Node {node:?} can only have one {child:?} child.")]
    #[diagnostic(code(kuddle::bind::duplicate_child))]
    DuplicateChild {
        /// Node class name.
        node: String,
        /// The duplicated child class.
        child: String,
    },

    /// A child no slot accepts, and no catch-all.
    #[error("Node {node:?} cannot have a {child:?} child.")]
    #[diagnostic(code(kuddle::bind::unexpected_child))]
    UnexpectedChild {
        /// Node class name.
        node: String,
        /// The rejected child's name.
        child: String,
    },

    /// A value that neither matches the declared type nor coerces to it.
    #[error("Field {field:?} of {node:?} expected {expected}, got {found}.")]
    #[diagnostic(code(kuddle::bind::type_mismatch))]
    TypeMismatch {
        /// Node class name.
        node: String,
        /// Field the value was bound to.
        field: String,
        /// Description of the declared type.
        expected: &'static str,
        /// Description of the actual value.
        found: &'static str,
    },
}

/// Parse-or-bind failure from [`DocumentSchema::parse_document`].
#[derive(Debug, Error, Diagnostic)]
pub enum KdlSchemaError {
    /// The source didn't parse.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] KdlError),

    /// The document didn't match the schema.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Bind(#[from] KdlBindError),
}

/// One bound field of a [`BoundNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    /// A scalar that matched its declared type.
    Value(KdlValue),
    /// A string coerced into a calendar date.
    Date(NaiveDate),
    /// A string coerced into a date-time.
    DateTime(NaiveDateTime),
    /// The single child of a `Child` slot.
    Node(BoundNode),
    /// The children collected by a `Children` slot, in appearance order.
    Nodes(Vec<BoundNode>),
    /// Arguments swept up by `OtherArguments`.
    Values(Vec<KdlValue>),
    /// Properties swept up by `OtherProperties`, in preserved order.
    Map(IndexMap<String, KdlValue>),
    /// Children swept up by `OtherChildren`, kept as raw nodes.
    RawNodes(Vec<KdlNode>),
}

impl BoundValue {
    /// The scalar value, if this is a `Value`.
    pub fn as_value(&self) -> Option<&KdlValue> {
        match self {
            BoundValue::Value(v) => Some(v),
            _ => None,
        }
    }

    /// The date, if this is a `Date`.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            BoundValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// The date-time, if this is a `DateTime`.
    pub fn as_date_time(&self) -> Option<NaiveDateTime> {
        match self {
            BoundValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// The bound child, if this is a `Node`.
    pub fn as_node(&self) -> Option<&BoundNode> {
        match self {
            BoundValue::Node(n) => Some(n),
            _ => None,
        }
    }

    /// The bound children, if this is a `Nodes`.
    pub fn as_nodes(&self) -> Option<&[BoundNode]> {
        match self {
            BoundValue::Nodes(n) => Some(n),
            _ => None,
        }
    }

    /// The collected arguments, if this is a `Values`.
    pub fn as_values(&self) -> Option<&[KdlValue]> {
        match self {
            BoundValue::Values(v) => Some(v),
            _ => None,
        }
    }

    /// The collected properties, if this is a `Map`.
    pub fn as_map(&self) -> Option<&IndexMap<String, KdlValue>> {
        match self {
            BoundValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// The raw leftover children, if this is a `RawNodes`.
    pub fn as_raw_nodes(&self) -> Option<&[KdlNode]> {
        match self {
            BoundValue::RawNodes(n) => Some(n),
            _ => None,
        }
    }
}

/// A node reduced against its [`NodeSchema`]: every slot resolved to a
/// [`BoundValue`], keyed by field name.
#[derive(Debug, Clone)]
pub struct BoundNode {
    schema: NodeSchema,
    fields: IndexMap<String, BoundValue>,
}

impl BoundNode {
    /// The class (node) name this node bound as.
    pub fn class(&self) -> &str {
        self.schema.name()
    }

    /// The schema this node bound against.
    pub fn schema(&self) -> &NodeSchema {
        &self.schema
    }

    /// Looks a bound field up by name.
    pub fn get(&self, field: &str) -> Option<&BoundValue> {
        self.fields.get(field)
    }

    /// Shorthand for `get(field).and_then(BoundValue::as_value)`.
    pub fn get_value(&self, field: &str) -> Option<&KdlValue> {
        self.get(field).and_then(BoundValue::as_value)
    }

    /// Iterates `(field, value)` pairs. Use [`NodeSchema::slots`] when slot
    /// declaration order matters; this iterates in binding order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &BoundValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Reconstructs a semantic [`KdlNode`] from this bound node, walking the
    /// schema's slots in declaration order.
    pub fn to_node(&self) -> KdlNode {
        let mut node = KdlNode::new(self.schema.name());
        for slot in self.schema.slots() {
            let value = match self.fields.get(slot.field()) {
                Some(value) => value,
                None => continue,
            };
            match (&slot.kind, value) {
                (SlotKind::Argument { .. }, value) => {
                    node.push_arg(scalar_of(value));
                }
                (SlotKind::Property { key, .. }, value) => {
                    node.insert_prop(key.clone(), scalar_of(value));
                }
                (SlotKind::Child(_), BoundValue::Node(child)) => {
                    node.ensure_children().push(child.to_node());
                }
                (SlotKind::Children(_), BoundValue::Nodes(children)) => {
                    for child in children {
                        node.ensure_children().push(child.to_node());
                    }
                }
                (SlotKind::OtherArguments, BoundValue::Values(values)) => {
                    for value in values {
                        node.push_arg(value.clone());
                    }
                }
                (SlotKind::OtherProperties, BoundValue::Map(map)) => {
                    for (key, value) in map {
                        node.insert_prop(key.clone(), value.clone());
                    }
                }
                (SlotKind::OtherChildren, BoundValue::RawNodes(children)) => {
                    for child in children {
                        node.ensure_children().push(child.clone());
                    }
                }
                _ => {}
            }
        }
        node
    }
}

impl PartialEq for BoundNode {
    fn eq(&self, other: &Self) -> bool {
        self.class() == other.class()
            && self.fields.len() == other.fields.len()
            && self.fields.iter().eq(other.fields.iter())
    }
}

impl std::fmt::Display for BoundNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_node())
    }
}

fn scalar_of(value: &BoundValue) -> KdlValue {
    match value {
        BoundValue::Value(v) => v.clone(),
        BoundValue::Date(d) => KdlValue::String(d.to_string()),
        BoundValue::DateTime(dt) => {
            KdlValue::String(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
        }
        _ => KdlValue::Null,
    }
}

fn value_kind(value: &KdlValue) -> &'static str {
    match value {
        KdlValue::String(_) => "a string",
        KdlValue::Integer(_) => "an integer",
        KdlValue::Float(_) => "a float",
        KdlValue::Bool(_) => "a boolean",
        KdlValue::Null => "null",
    }
}

/// Exact match, then one documented widening per declared type.
fn coerce(
    node: &str,
    field: &str,
    value: &KdlValue,
    span: SourceSpan,
    ty: ValueType,
) -> Result<BoundValue, KdlBindError> {
    let mismatch = || KdlBindError {
        span,
        label: Some("wrong type"),
        help: None,
        kind: BindErrorKind::TypeMismatch {
            node: node.into(),
            field: field.into(),
            expected: ty.describe(),
            found: value_kind(value),
        },
    };
    match (ty, value) {
        (ValueType::Any, v) => Ok(BoundValue::Value(v.clone())),
        (ValueType::String, KdlValue::String(_)) => Ok(BoundValue::Value(value.clone())),
        (ValueType::Integer, KdlValue::Integer(_)) => Ok(BoundValue::Value(value.clone())),
        (ValueType::Float, KdlValue::Float(_)) => Ok(BoundValue::Value(value.clone())),
        (ValueType::Float, KdlValue::Integer(i)) => {
            Ok(BoundValue::Value(KdlValue::Float(*i as f64)))
        }
        (ValueType::Bool, KdlValue::Bool(_)) => Ok(BoundValue::Value(value.clone())),
        (ValueType::Date, KdlValue::String(s)) => s
            .parse::<NaiveDate>()
            .map(BoundValue::Date)
            .map_err(|_| mismatch()),
        (ValueType::DateTime, KdlValue::String(s)) => s
            .parse::<NaiveDateTime>()
            .map(BoundValue::DateTime)
            .map_err(|_| mismatch()),
        _ => Err(mismatch()),
    }
}

impl NodeSchema {
    /// Binds one parsed node against this class.
    ///
    /// Children are dispatched first, then positional arguments in slot
    /// order, then properties; leftovers go to catch-all slots or fail.
    pub fn bind(&self, node: &KdlNode) -> Result<BoundNode, KdlBindError> {
        if node.name() != self.name() {
            return Err(KdlBindError {
                span: node.span(),
                label: Some("wrong node name"),
                help: Some(format!("this class binds nodes named {:?}", self.name())),
                kind: BindErrorKind::UnknownNode(node.name().into()),
            });
        }
        let mut fields: IndexMap<String, BoundValue> = IndexMap::new();

        // Children first: slot order decides which slot claims a name when
        // several could.
        let mut other_children: Vec<KdlNode> = Vec::new();
        let has_child_catch_all = self
            .slots()
            .iter()
            .any(|s| matches!(s.kind, SlotKind::OtherChildren));
        if let Some(children) = node.children() {
            'child: for child in children.nodes() {
                for slot in self.slots() {
                    match &slot.kind {
                        SlotKind::Child(class) if class.name() == child.name() => {
                            if fields.contains_key(slot.field()) {
                                return Err(KdlBindError {
                                    span: child.span(),
                                    label: Some("second occurrence"),
                                    help: None,
                                    kind: BindErrorKind::DuplicateChild {
                                        node: self.name().into(),
                                        child: child.name().into(),
                                    },
                                });
                            }
                            let bound = class.bind(child)?;
                            fields.insert(slot.field().into(), BoundValue::Node(bound));
                            continue 'child;
                        }
                        SlotKind::Children(classes) => {
                            if let Some(class) =
                                classes.iter().find(|c| c.name() == child.name())
                            {
                                let bound = class.bind(child)?;
                                match fields
                                    .entry(slot.field().into())
                                    .or_insert_with(|| BoundValue::Nodes(Vec::new()))
                                {
                                    BoundValue::Nodes(nodes) => nodes.push(bound),
                                    _ => unreachable!("children slots only hold Nodes"),
                                }
                                continue 'child;
                            }
                        }
                        _ => {}
                    }
                }
                if has_child_catch_all {
                    other_children.push(child.clone());
                } else {
                    return Err(KdlBindError {
                        span: child.span(),
                        label: Some("not accepted here"),
                        help: Some(format!(
                            "declare a child slot for {:?} or an OtherChildren catch-all",
                            child.name()
                        )),
                        kind: BindErrorKind::UnexpectedChild {
                            node: self.name().into(),
                            child: child.name().into(),
                        },
                    });
                }
            }
        }
        for slot in self.slots() {
            match &slot.kind {
                SlotKind::Child(class) => {
                    if !fields.contains_key(slot.field()) {
                        return Err(KdlBindError {
                            span: node.span(),
                            label: Some("child missing"),
                            help: None,
                            kind: BindErrorKind::MissingChild {
                                node: self.name().into(),
                                child: class.name().into(),
                            },
                        });
                    }
                }
                SlotKind::Children(_) => {
                    fields
                        .entry(slot.field().into())
                        .or_insert_with(|| BoundValue::Nodes(Vec::new()));
                }
                SlotKind::OtherChildren => {
                    fields.insert(
                        slot.field().into(),
                        BoundValue::RawNodes(std::mem::take(&mut other_children)),
                    );
                }
                _ => {}
            }
        }

        // Positional arguments, in slot declaration order.
        let mut next = 0usize;
        for slot in self.slots() {
            if let SlotKind::Argument { ty, default } = &slot.kind {
                if let Some(entry) = node.args().get(next) {
                    next += 1;
                    let bound =
                        coerce(self.name(), slot.field(), entry.value(), entry.span(), *ty)?;
                    fields.insert(slot.field().into(), bound);
                } else if let Some(default) = default {
                    let bound = coerce(self.name(), slot.field(), default, node.span(), *ty)?;
                    fields.insert(slot.field().into(), bound);
                } else {
                    return Err(KdlBindError {
                        span: node.span(),
                        label: Some("argument missing"),
                        help: Some(format!("expected at position {next}")),
                        kind: BindErrorKind::MissingArgument {
                            node: self.name().into(),
                            field: slot.field().into(),
                        },
                    });
                }
            }
        }
        let rest: Vec<KdlValue> = node.args()[next.min(node.args().len())..]
            .iter()
            .map(|e| e.value().clone())
            .collect();
        match self
            .slots()
            .iter()
            .find(|s| matches!(s.kind, SlotKind::OtherArguments))
        {
            Some(slot) => {
                fields.insert(slot.field().into(), BoundValue::Values(rest));
            }
            None if !rest.is_empty() => {
                return Err(KdlBindError {
                    span: node.args()[next].span(),
                    label: Some("no slot for this argument"),
                    help: None,
                    kind: BindErrorKind::ExtraArgument {
                        node: self.name().into(),
                    },
                });
            }
            None => {}
        }

        // Properties, by key.
        let mut remaining = node.props().clone();
        for slot in self.slots() {
            if let SlotKind::Property { key, ty, default } = &slot.kind {
                if let Some(entry) = remaining.shift_remove(key) {
                    let bound =
                        coerce(self.name(), slot.field(), entry.value(), entry.span(), *ty)?;
                    fields.insert(slot.field().into(), bound);
                } else if let Some(default) = default {
                    let bound = coerce(self.name(), slot.field(), default, node.span(), *ty)?;
                    fields.insert(slot.field().into(), bound);
                } else {
                    return Err(KdlBindError {
                        span: node.span(),
                        label: Some("property missing"),
                        help: None,
                        kind: BindErrorKind::MissingProperty {
                            node: self.name().into(),
                            key: key.clone(),
                        },
                    });
                }
            }
        }
        match self
            .slots()
            .iter()
            .find(|s| matches!(s.kind, SlotKind::OtherProperties))
        {
            Some(slot) => {
                let map: IndexMap<String, KdlValue> = remaining
                    .iter()
                    .map(|(k, e)| (k.clone(), e.value().clone()))
                    .collect();
                fields.insert(slot.field().into(), BoundValue::Map(map));
            }
            None => {
                if let Some((key, entry)) = remaining.first() {
                    return Err(KdlBindError {
                        span: entry.span(),
                        label: Some("no slot for this property"),
                        help: None,
                        kind: BindErrorKind::ExtraProperty {
                            node: self.name().into(),
                            key: key.clone(),
                        },
                    });
                }
            }
        }

        Ok(BoundNode {
            schema: self.clone(),
            fields,
        })
    }

    /// Parses `source` and binds its single top-level node against this
    /// class.
    pub fn parse_node(&self, source: &str) -> Result<BoundNode, KdlSchemaError> {
        let node: KdlNode = source.parse()?;
        Ok(self.bind(&node)?)
    }
}

/// A document reduced against a [`DocumentSchema`].
#[derive(Debug, Clone, PartialEq)]
pub struct BoundDocument {
    roots: Vec<BoundNode>,
    extras: Vec<KdlNode>,
}

impl BoundDocument {
    /// The bound top-level nodes, in document order.
    pub fn roots(&self) -> &[BoundNode] {
        &self.roots
    }

    /// The first bound root of the given class.
    pub fn get(&self, class: &str) -> Option<&BoundNode> {
        self.roots.iter().find(|n| n.class() == class)
    }

    /// Top-level nodes kept raw because their names weren't in the node
    /// group (only with
    /// [`allow_other_children`](DocumentSchema::allow_other_children)).
    pub fn extras(&self) -> &[KdlNode] {
        &self.extras
    }

    /// Reconstructs a semantic document: bound roots first, then extras.
    pub fn to_document(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();
        for root in &self.roots {
            doc.push(root.to_node());
        }
        for extra in &self.extras {
            doc.push(extra.clone());
        }
        doc
    }
}

impl std::fmt::Display for BoundDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_document())
    }
}

impl DocumentSchema {
    /// Binds every top-level node of a parsed document against the node
    /// group.
    pub fn bind(&self, doc: &KdlDocument) -> Result<BoundDocument, KdlBindError> {
        let mut roots = Vec::new();
        let mut extras = Vec::new();
        for node in doc.nodes() {
            match self.group.iter().find(|s| s.name() == node.name()) {
                Some(schema) => roots.push(schema.bind(node)?),
                None if self.keep_unknown => extras.push(node.clone()),
                None => {
                    return Err(KdlBindError {
                        span: node.span(),
                        label: Some("not in the node group"),
                        help: Some("add this class to the document schema's group".into()),
                        kind: BindErrorKind::UnknownNode(node.name().into()),
                    })
                }
            }
        }
        Ok(BoundDocument { roots, extras })
    }

    /// Parses `source` and binds the result in one step.
    pub fn parse_document(&self, source: &str) -> Result<BoundDocument, KdlSchemaError> {
        let doc = parser::parse(source)?;
        Ok(self.bind(&doc)?)
    }
}
