//! Navigation sugar over the document tree.
//!
//! `/` selects all matching nodes and keeps navigating:
//!
//! ```
//! use kuddle::KdlDocument;
//!
//! let doc: KdlDocument = "a {\n b 1\n b 2\n c 3\n}".parse().unwrap();
//! let bs = &doc / "a" / "b";
//! assert_eq!(bs.len(), 2);
//! ```
//!
//! [`one`](KdlDocument::one) is the single-match descend: it insists on
//! exactly one match and reports [`PickError::NotFound`] or
//! [`PickError::Ambiguous`] otherwise.

use std::ops::Div;

use miette::Diagnostic;
use thiserror::Error;

use crate::{KdlDocument, KdlNode, KdlValue};

/// Failure of a single-match navigation step.
#[derive(Debug, Clone, Eq, PartialEq, Error, Diagnostic)]
pub enum PickError {
    /// No node with the requested name.
    #[error("No node named {0:?} here.")]
    #[diagnostic(code(kuddle::nav::not_found))]
    NotFound(String),

    /// More than one node with the requested name.
    #[error("Expected a single node named {name:?}, found {count}.")]
    #[diagnostic(code(kuddle::nav::ambiguous))]
    Ambiguous {
        /// The requested node name.
        name: String,
        /// How many nodes actually matched.
        count: usize,
    },
}

/// A flat, possibly-empty selection of nodes. Further `/` steps select among
/// the *children* of every node in the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeCollection<'a> {
    nodes: Vec<&'a KdlNode>,
}

fn children_of<'a>(node: &'a KdlNode) -> &'a [KdlNode] {
    node.children().map(|doc| doc.nodes()).unwrap_or_default()
}

fn pick<'a>(
    candidates: impl Iterator<Item = &'a KdlNode>,
    name: &str,
) -> Result<&'a KdlNode, PickError> {
    let matches: Vec<&KdlNode> = candidates.filter(|n| n.name() == name).collect();
    match matches.len() {
        0 => Err(PickError::NotFound(name.into())),
        1 => Ok(matches[0]),
        count => Err(PickError::Ambiguous {
            name: name.into(),
            count,
        }),
    }
}

impl<'a> NodeCollection<'a> {
    fn from_iter(iter: impl Iterator<Item = &'a KdlNode>, name: &str) -> Self {
        NodeCollection {
            nodes: iter.filter(|n| n.name() == name).collect(),
        }
    }

    /// Iterates the selected nodes in document order.
    pub fn iter(&self) -> impl Iterator<Item = &'a KdlNode> + '_ {
        self.nodes.iter().copied()
    }

    /// Number of selected nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if nothing matched.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The `index`th selected node.
    pub fn get(&self, index: usize) -> Option<&'a KdlNode> {
        self.nodes.get(index).copied()
    }

    /// Single-match descend into the children of the selected nodes.
    pub fn one(&self, name: &str) -> Result<&'a KdlNode, PickError> {
        pick(self.nodes.iter().flat_map(|n| children_of(n)), name)
    }

    /// Projects the argument at `index` out of every selected node. `None`
    /// if any node lacks that argument.
    pub fn args(&self, index: usize) -> Option<Vec<&'a KdlValue>> {
        self.nodes.iter().map(|n| n.get_arg(index)).collect()
    }

    /// Projects the property named `key` out of every selected node. `None`
    /// if any node lacks it.
    pub fn props(&self, key: &str) -> Option<Vec<&'a KdlValue>> {
        self.nodes.iter().map(|n| n.get_prop(key)).collect()
    }
}

impl<'a> IntoIterator for NodeCollection<'a> {
    type Item = &'a KdlNode;
    type IntoIter = std::vec::IntoIter<&'a KdlNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'a> Div<&str> for &'a KdlDocument {
    type Output = NodeCollection<'a>;

    fn div(self, name: &str) -> Self::Output {
        NodeCollection::from_iter(self.nodes().iter(), name)
    }
}

impl<'a> Div<&str> for &'a KdlNode {
    type Output = NodeCollection<'a>;

    fn div(self, name: &str) -> Self::Output {
        NodeCollection::from_iter(children_of(self).iter(), name)
    }
}

impl<'a> Div<&str> for NodeCollection<'a> {
    type Output = NodeCollection<'a>;

    fn div(self, name: &str) -> Self::Output {
        NodeCollection::from_iter(
            self.nodes.iter().flat_map(|n| children_of(n)),
            name,
        )
    }
}

impl KdlDocument {
    /// Single-match descend: the node named `name`, requiring exactly one
    /// match among this document's nodes.
    pub fn one(&self, name: &str) -> Result<&KdlNode, PickError> {
        pick(self.nodes().iter(), name)
    }

    /// All nodes named `name` at any depth, in breadth-first order.
    pub fn descendants(&self, name: &str) -> Vec<&KdlNode> {
        let mut found = Vec::new();
        let mut queue: Vec<&KdlNode> = self.nodes().iter().collect();
        let mut at = 0;
        while at < queue.len() {
            let node = queue[at];
            at += 1;
            if node.name() == name {
                found.push(node);
            }
            queue.extend(children_of(node));
        }
        found
    }
}

impl KdlNode {
    /// Single-match descend: the child named `name`, requiring exactly one
    /// match among this node's children.
    pub fn one(&self, name: &str) -> Result<&KdlNode, PickError> {
        pick(children_of(self).iter(), name)
    }
}
