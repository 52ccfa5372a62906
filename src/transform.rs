use std::collections::HashMap;

use crate::{KdlNode, KdlValue};

/// A value transformer: receives the decoded value of an annotated argument
/// or property and returns the value to store in its place. An `Err` aborts
/// the parse with a [`TransformError`](crate::KdlErrorKind::TransformError)
/// at the value's span.
pub type ValueTransform = Box<dyn Fn(KdlValue) -> Result<KdlValue, String> + Send + Sync>;

/// A node transformer: receives a fully parsed node (children, arguments,
/// and properties filled in) and returns the node to store in its place.
pub type NodeTransform = Box<dyn Fn(KdlNode) -> Result<KdlNode, String> + Send + Sync>;

/// User-supplied transformers applied during a single
/// [`parse_with`](crate::parse_with) call.
///
/// `value` transformers are keyed by type annotation and run on every
/// argument or property value carrying that annotation; the annotation
/// itself stays on the entry as metadata. `node` transformers are keyed by
/// node name and run once the node is complete — before any of its *parent's*
/// transformers, since parsing is bottom-up.
///
/// A missing key means identity. Transformers are held only for the duration
/// of one parse and are never stored in the resulting document.
///
/// # Examples
///
/// ```
/// use kuddle::{KdlTransforms, KdlValue};
///
/// let transforms = KdlTransforms::new().value("celsius", |v| match v {
///     KdlValue::Integer(c) => Ok(KdlValue::Float(c as f64 + 273.15)),
///     other => Err(format!("expected an integer, got {other}")),
/// });
/// let doc = kuddle::parse_with("temp (celsius)27", &transforms)?;
/// assert_eq!(doc.get_arg("temp"), Some(&KdlValue::Float(300.15)));
/// # Ok::<(), kuddle::KdlError>(())
/// ```
#[derive(Default)]
pub struct KdlTransforms {
    pub(crate) values: HashMap<String, ValueTransform>,
    pub(crate) nodes: HashMap<String, NodeTransform>,
}

impl KdlTransforms {
    /// Creates an empty transformer set (every lookup is identity).
    pub fn new() -> Self {
        Default::default()
    }

    /// Registers a value transformer for the given type annotation.
    pub fn value(
        mut self,
        annotation: impl Into<String>,
        f: impl Fn(KdlValue) -> Result<KdlValue, String> + Send + Sync + 'static,
    ) -> Self {
        self.values.insert(annotation.into(), Box::new(f));
        self
    }

    /// Registers a node transformer for the given node name.
    pub fn node(
        mut self,
        name: impl Into<String>,
        f: impl Fn(KdlNode) -> Result<KdlNode, String> + Send + Sync + 'static,
    ) -> Self {
        self.nodes.insert(name.into(), Box::new(f));
        self
    }

    /// True if no transformers are registered.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.nodes.is_empty()
    }
}

impl std::fmt::Debug for KdlTransforms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KdlTransforms")
            .field("values", &self.values.keys().collect::<Vec<_>>())
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .finish()
    }
}
