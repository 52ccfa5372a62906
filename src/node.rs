use std::fmt::Display;
use std::ops::Index;
use std::str::FromStr;

use indexmap::IndexMap;
use miette::SourceSpan;

use crate::{emit, parser, KdlDocument, KdlEntry, KdlError, KdlErrorKind, KdlValue};

/// Represents an individual KDL
/// [`Node`](https://github.com/kdl-org/kdl/blob/main/SPEC.md#node) inside a
/// KDL Document.
///
/// A node has a name (optionally type-annotated), ordered positional
/// arguments, insertion-ordered properties, and an optional children block.
/// An absent children block is distinct from an empty one.
#[derive(Debug, Clone)]
pub struct KdlNode {
    pub(crate) ty: Option<String>,
    pub(crate) name: String,
    pub(crate) args: Vec<KdlEntry>,
    pub(crate) props: IndexMap<String, KdlEntry>,
    pub(crate) children: Option<KdlDocument>,
    pub(crate) span: SourceSpan,
}

impl KdlNode {
    /// Creates a new KdlNode with a given name.
    pub fn new(name: impl Into<String>) -> Self {
        KdlNode {
            ty: None,
            name: name.into(),
            args: Vec::new(),
            props: IndexMap::new(),
            children: None,
            span: SourceSpan::from(0..0),
        }
    }

    /// Gets this node's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets this node's name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Gets the node's type annotation, if any.
    pub fn ty(&self) -> Option<&str> {
        self.ty.as_deref()
    }

    /// Sets the node's type annotation.
    pub fn set_ty(&mut self, ty: impl Into<String>) {
        self.ty = Some(ty.into());
    }

    /// Gets this node's span.
    ///
    /// This value is properly initialized when the node came out of a parse,
    /// but is not adjusted if the node is mutated afterwards.
    pub fn span(&self) -> SourceSpan {
        self.span
    }

    /// The node's positional arguments, in source order.
    pub fn args(&self) -> &[KdlEntry] {
        &self.args
    }

    /// Mutable access to the node's positional arguments.
    pub fn args_mut(&mut self) -> &mut Vec<KdlEntry> {
        &mut self.args
    }

    /// Appends a positional argument.
    pub fn push_arg(&mut self, entry: impl Into<KdlEntry>) {
        self.args.push(entry.into());
    }

    /// The node's properties, in the order of each key's *last* assignment.
    pub fn props(&self) -> &IndexMap<String, KdlEntry> {
        &self.props
    }

    /// Mutable access to the node's properties.
    pub fn props_mut(&mut self) -> &mut IndexMap<String, KdlEntry> {
        &mut self.props
    }

    /// Sets a property. A key that already exists moves to the end, the same
    /// way a duplicated property key in source takes the position of its
    /// last occurrence.
    pub fn insert_prop(&mut self, key: impl Into<String>, entry: impl Into<KdlEntry>) {
        let key = key.into();
        self.props.shift_remove(&key);
        self.props.insert(key, entry.into());
    }

    /// Gets the argument value at `index`, if present.
    pub fn get_arg(&self, index: usize) -> Option<&KdlValue> {
        self.args.get(index).map(|e| e.value())
    }

    /// Gets the value of the property named `key`, if present.
    pub fn get_prop(&self, key: &str) -> Option<&KdlValue> {
        self.props.get(key).map(|e| e.value())
    }

    /// Gets the argument entry (value plus annotation) at `index`.
    pub fn arg_entry(&self, index: usize) -> Option<&KdlEntry> {
        self.args.get(index)
    }

    /// Gets the property entry (value plus annotation) named `key`.
    pub fn prop_entry(&self, key: &str) -> Option<&KdlEntry> {
        self.props.get(key)
    }

    /// Returns a reference to this node's children, if any.
    pub fn children(&self) -> Option<&KdlDocument> {
        self.children.as_ref()
    }

    /// Returns a mutable reference to this node's children, if any.
    pub fn children_mut(&mut self) -> Option<&mut KdlDocument> {
        self.children.as_mut()
    }

    /// Sets this node's children block.
    pub fn set_children(&mut self, children: KdlDocument) {
        self.children = Some(children);
    }

    /// Removes this node's children block entirely, as opposed to leaving an
    /// empty one.
    pub fn clear_children(&mut self) {
        self.children = None;
    }

    /// Returns a mutable reference to this node's children, creating an
    /// empty block first if the node has none.
    pub fn ensure_children(&mut self) -> &mut KdlDocument {
        self.children.get_or_insert_with(KdlDocument::new)
    }

    /// Gets the first child node with a matching name.
    pub fn get(&self, name: &str) -> Option<&KdlNode> {
        self.children.as_ref().and_then(|doc| doc.get(name))
    }
}

impl PartialEq for KdlNode {
    fn eq(&self, other: &Self) -> bool {
        // IndexMap's own Eq ignores order; property order is significant
        // here, so compare pairwise.
        self.ty == other.ty
            && self.name == other.name
            && self.args == other.args
            && self.props.len() == other.props.len()
            && self.props.iter().eq(other.props.iter())
            && self.children == other.children
        // Intentionally omitted: self.span == other.span
    }
}

impl Eq for KdlNode {}

impl std::hash::Hash for KdlNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.ty.hash(state);
        self.name.hash(state);
        self.args.hash(state);
        for (key, entry) in &self.props {
            key.hash(state);
            entry.hash(state);
        }
        self.children.hash(state);
        // Intentionally omitted: self.span.hash(state)
    }
}

/// Indexing by integer gets the positional argument value at that index.
///
/// Panics if the index is out of bounds.
impl Index<usize> for KdlNode {
    type Output = KdlValue;

    fn index(&self, index: usize) -> &Self::Output {
        self.args[index].value()
    }
}

/// Indexing by string gets the value of the property with that key.
///
/// Panics if the property does not exist.
impl Index<&str> for KdlNode {
    type Output = KdlValue;

    fn index(&self, key: &str) -> &Self::Output {
        self.props
            .get(key)
            .map(|e| e.value())
            .unwrap_or_else(|| panic!("no property named {key:?}"))
    }
}

impl Display for KdlNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        emit::write_node(f, self, 0)
    }
}

impl FromStr for KdlNode {
    type Err = KdlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let doc = parser::parse(s)?;
        let mut nodes = doc.nodes;
        if nodes.len() == 1 {
            Ok(nodes.remove(0))
        } else {
            Err(KdlError {
                input: std::sync::Arc::new(s.to_string()),
                span: doc.span,
                label: Some("expected exactly one node"),
                help: None,
                kind: KdlErrorKind::UnexpectedToken,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexing() {
        let node: KdlNode = "point 10 20 color=red".parse().unwrap();
        assert_eq!(node[0], KdlValue::Integer(10));
        assert_eq!(node[1], KdlValue::Integer(20));
        assert_eq!(node["color"], KdlValue::String("red".into()));
    }

    #[test]
    fn duplicate_props_keep_last_position() {
        let node: KdlNode = "n a=1 b=2 a=3".parse().unwrap();
        let keys: Vec<&str> = node.props().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(node["a"], KdlValue::Integer(3));
    }

    #[test]
    fn absent_children_differ_from_empty() {
        let bare: KdlNode = "n".parse().unwrap();
        let braced: KdlNode = "n {\n}".parse().unwrap();
        assert!(bare.children().is_none());
        assert!(braced.children().is_some());
        assert_ne!(bare, braced);
    }
}
