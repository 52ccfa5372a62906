use std::fmt::Display;
use std::str::FromStr;

use miette::SourceSpan;

use crate::{emit, parser, KdlError, KdlNode, KdlValue};

/// Represents a KDL
/// [`Document`](https://github.com/kdl-org/kdl/blob/main/SPEC.md#document):
/// an ordered sequence of nodes.
///
/// This type is also used for a [`KdlNode`]'s [`Children
/// Block`](https://github.com/kdl-org/kdl/blob/main/SPEC.md#children-block),
/// when present.
///
/// # Examples
///
/// The easiest way to create a `KdlDocument` is to parse it:
/// ```rust
/// # use kuddle::KdlDocument;
/// let kdl: KdlDocument = "foo 1 2 3\nbar 4 5 6".parse().expect("parse failed");
/// ```
#[derive(Debug, Clone)]
pub struct KdlDocument {
    pub(crate) nodes: Vec<KdlNode>,
    pub(crate) span: SourceSpan,
}

impl Default for KdlDocument {
    fn default() -> Self {
        KdlDocument {
            nodes: Vec::new(),
            span: SourceSpan::from(0..0),
        }
    }
}

impl KdlDocument {
    /// Creates a new, empty Document.
    pub fn new() -> Self {
        Default::default()
    }

    /// Parses a source string, without any transformers. Equivalent to the
    /// [`FromStr`] impl.
    pub fn parse(source: &str) -> Result<Self, KdlError> {
        parser::parse(source)
    }

    /// Gets this document's span.
    ///
    /// This value is properly initialized when the document came out of a
    /// parse, but is not adjusted if the document is mutated afterwards.
    pub fn span(&self) -> SourceSpan {
        self.span
    }

    /// Gets the first node with a matching name.
    pub fn get(&self, name: &str) -> Option<&KdlNode> {
        self.nodes.iter().find(move |n| n.name() == name)
    }

    /// Gets a mutable reference to the first node with a matching name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut KdlNode> {
        self.nodes.iter_mut().find(move |n| n.name() == name)
    }

    /// Gets the first argument (value) of the first node with a matching
    /// name. This is a shorthand utility for cases where a document is being
    /// used as a key/value store.
    ///
    /// # Examples
    ///
    /// Given a document like this:
    /// ```kdl
    /// foo 1
    /// bar #false
    /// ```
    ///
    /// You can fetch the value of `foo` in a single call like this:
    /// ```rust
    /// # use kuddle::{KdlDocument, KdlValue};
    /// # let doc: KdlDocument = "foo 1\nbar #false".parse().unwrap();
    /// assert_eq!(doc.get_arg("foo"), Some(&1.into()));
    /// ```
    pub fn get_arg(&self, name: &str) -> Option<&KdlValue> {
        self.get(name).and_then(|node| node.get_arg(0))
    }

    /// Returns an iterator over all the arguments of the first node with a
    /// matching name.
    pub fn iter_args(&self, name: &str) -> impl Iterator<Item = &KdlValue> {
        self.get(name)
            .map(|n| n.args())
            .unwrap_or_default()
            .iter()
            .map(|e| e.value())
    }

    /// Returns a reference to this document's nodes.
    pub fn nodes(&self) -> &[KdlNode] {
        &self.nodes
    }

    /// Returns a mutable reference to this document's nodes.
    pub fn nodes_mut(&mut self) -> &mut Vec<KdlNode> {
        &mut self.nodes
    }

    /// Appends a node to the document.
    pub fn push(&mut self, node: KdlNode) {
        self.nodes.push(node);
    }

    /// Number of nodes in the document.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if this document has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns true if there is a node with the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.iter().any(|n| n.name() == name)
    }

    /// Iterates over the document's nodes in order.
    pub fn iter(&self) -> std::slice::Iter<'_, KdlNode> {
        self.nodes.iter()
    }

    /// Serializes the document to canonical KDL text. Same as the
    /// [`Display`] impl.
    pub fn emit(&self) -> String {
        self.to_string()
    }
}

impl PartialEq for KdlDocument {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
        // Intentionally omitted: self.span == other.span
    }
}

impl Eq for KdlDocument {}

impl std::hash::Hash for KdlDocument {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.nodes.hash(state);
        // Intentionally omitted: self.span.hash(state)
    }
}

impl<'a> IntoIterator for &'a KdlDocument {
    type Item = &'a KdlNode;
    type IntoIter = std::slice::Iter<'a, KdlNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl IntoIterator for KdlDocument {
    type Item = KdlNode;
    type IntoIter = std::vec::IntoIter<KdlNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl Display for KdlDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        emit::write_document(f, self)
    }
}

impl FromStr for KdlDocument {
    type Err = KdlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_shorthand() {
        let doc: KdlDocument = "foo 1 2 3\nbar #false".parse().unwrap();
        assert_eq!(doc.get_arg("foo"), Some(&1.into()));
        assert_eq!(doc.get_arg("bar"), Some(&false.into()));
        assert_eq!(
            doc.iter_args("foo").collect::<Vec<_>>(),
            vec![&1.into(), &2.into(), &3.into()]
        );
        assert!(doc.contains("bar"));
        assert!(!doc.contains("baz"));
    }
}
