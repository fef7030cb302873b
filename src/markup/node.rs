//! Node types: NodeId, NodeData, and the borrowed [`NodeRef`] view renderers
//! read attributes through.

use std::rc::Rc;

use slotmap::new_key_type;

use super::tree::Markup;

new_key_type! {
    /// Unique identifier for a markup node. Copy, lightweight (u64).
    pub struct NodeId;
}

/// A single attribute. `bind:text="name"` has namespace `bind`, name `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub namespace: Option<String>,
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn namespaced(
        namespace: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Data associated with a single element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    /// Tag name as written in the source.
    pub name: String,
    /// Attributes in source order.
    pub attributes: Vec<Attribute>,
    /// Direct text content, concatenated across child elements, untrimmed.
    pub content: String,
}

impl NodeData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            content: String::new(),
        }
    }

    /// Add an attribute (builder).
    pub fn with_attr(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Append text content (builder).
    pub fn with_content(mut self, text: impl AsRef<str>) -> Self {
        self.content.push_str(text.as_ref());
        self
    }
}

// ---------------------------------------------------------------------------
// NodeRef
// ---------------------------------------------------------------------------

/// Borrowed view of one element inside a shared [`Markup`] tree.
///
/// Plain attribute lookups ignore namespaced attributes, so `attr("text")`
/// never sees `bind:text`. Bind lookups match the tree's bind namespace only.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a Rc<Markup>,
    id: NodeId,
    data: &'a NodeData,
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("name", &self.data.name)
            .finish()
    }
}

impl<'a> NodeRef<'a> {
    pub fn new(tree: &'a Rc<Markup>, id: NodeId) -> Option<Self> {
        tree.get(id).map(|data| Self { tree, id, data })
    }

    /// The root element of `tree`.
    pub fn root(tree: &'a Rc<Markup>) -> Option<Self> {
        tree.root().and_then(|id| Self::new(tree, id))
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'a Rc<Markup> {
        self.tree
    }

    pub fn data(&self) -> &'a NodeData {
        self.data
    }

    /// Lowercased tag name.
    pub fn tag(&self) -> String {
        self.data.name.to_lowercase()
    }

    pub fn attributes(&self) -> &'a [Attribute] {
        &self.data.attributes
    }

    fn find(&self, namespace: Option<&str>, name: &str) -> Option<&'a Attribute> {
        self.data
            .attributes
            .iter()
            .find(|attr| attr.namespace.as_deref() == namespace && attr.name == name)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.find(None, name).is_some()
    }

    /// Plain attribute value, or `""` when absent.
    pub fn attr(&self, name: &str) -> &'a str {
        self.find(None, name)
            .map(|attr| attr.value.as_str())
            .unwrap_or("")
    }

    /// Integer attribute. Absent or malformed values read as `0`.
    pub fn attr_int(&self, name: &str) -> i64 {
        let raw = self.attr(name);
        if raw.is_empty() {
            return 0;
        }
        raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(tag = %self.data.name, attr = name, value = raw, "ignoring malformed integer attribute");
            0
        })
    }

    /// Float attribute. Absent or malformed values read as `0.0`.
    pub fn attr_float(&self, name: &str) -> f64 {
        let raw = self.attr(name);
        if raw.is_empty() {
            return 0.0;
        }
        raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(tag = %self.data.name, attr = name, value = raw, "ignoring malformed float attribute");
            0.0
        })
    }

    /// `true` only for `"true"` or `"1"`.
    pub fn attr_bool(&self, name: &str) -> bool {
        matches!(self.attr(name), "true" | "1")
    }

    pub fn has_bind(&self, name: &str) -> bool {
        self.find(Some(self.tree.bind_namespace()), name).is_some()
    }

    /// Bind name declared for `name`, or `""` when absent.
    pub fn bind(&self, name: &str) -> &'a str {
        self.find(Some(self.tree.bind_namespace()), name)
            .map(|attr| attr.value.as_str())
            .unwrap_or("")
    }

    /// Direct text content, trimmed.
    pub fn content(&self) -> &'a str {
        self.data.content.trim()
    }

    /// Child elements in document order.
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let tree = self.tree;
        tree.children(self.id)
            .iter()
            .filter_map(move |&child| NodeRef::new(tree, child))
    }

    /// An owned handle that keeps the tree alive.
    pub fn to_handle(&self) -> NodeHandle {
        NodeHandle {
            tree: Rc::clone(self.tree),
            id: self.id,
        }
    }
}

/// Owned counterpart of [`NodeRef`], for renderers that re-render a subtree
/// later (list rows).
#[derive(Debug, Clone)]
pub struct NodeHandle {
    tree: Rc<Markup>,
    id: NodeId,
}

impl NodeHandle {
    pub fn node(&self) -> Option<NodeRef<'_>> {
        NodeRef::new(&self.tree, self.id)
    }
}
