//! Renderer registry.
//!
//! [`Registry`] maps lowercase tag names to [`Renderer`]s and component names
//! to markup-producing functions. It is built once, before the first document
//! loads, and shared by every document and fragment through an `Rc`.
//! The `with_defaults()` constructor installs the built-in widget set.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::document::{Document, DocumentError};
use crate::markup::NodeRef;
use crate::widget::WidgetRef;
use crate::widgets;

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Builds a widget for one markup node.
///
/// Implemented for every `Fn(NodeRef, &Document) -> Result<WidgetRef, _>`,
/// so plain functions and closures register directly.
pub trait Renderer {
    fn render(&self, node: NodeRef<'_>, document: &Document) -> Result<WidgetRef, DocumentError>;
}

impl<F> Renderer for F
where
    F: Fn(NodeRef<'_>, &Document) -> Result<WidgetRef, DocumentError>,
{
    fn render(&self, node: NodeRef<'_>, document: &Document) -> Result<WidgetRef, DocumentError> {
        self(node, document)
    }
}

/// Produces markup that is parsed and rendered in place of the node.
pub type Component = Rc<dyn Fn(NodeRef<'_>, &Document) -> String>;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Registry of tag renderers and components, keyed by lowercase name.
#[derive(Default)]
pub struct Registry {
    tags: HashMap<String, Rc<dyn Renderer>>,
    components: HashMap<String, Component>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&String> = self.tags.keys().collect();
        tags.sort();
        let mut components: Vec<&String> = self.components.keys().collect();
        components.sort();
        f.debug_struct("Registry")
            .field("tags", &tags)
            .field("components", &components)
            .finish()
    }
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in widgets.
    ///
    /// Defaults: `row`, `col`, `text`, `button`, `input`, `list`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_tag("row", widgets::stack::render_row);
        registry.register_tag("col", widgets::stack::render_col);
        registry.register_tag("text", widgets::label::render);
        registry.register_tag("button", widgets::button::render);
        registry.register_tag("input", widgets::input::render);
        registry.register_tag("list", widgets::list::render);
        registry
    }

    /// Register a renderer function for `tag`, replacing any existing one.
    pub fn register_tag<F>(&mut self, tag: &str, render: F)
    where
        F: Fn(NodeRef<'_>, &Document) -> Result<WidgetRef, DocumentError> + 'static,
    {
        self.register_renderer(tag, render);
    }

    /// Register any [`Renderer`] implementation for `tag`.
    pub fn register_renderer(&mut self, tag: &str, renderer: impl Renderer + 'static) {
        self.tags.insert(tag.to_lowercase(), Rc::new(renderer));
    }

    /// Register a component: its markup replaces the node when rendered.
    pub fn register_component<F>(&mut self, name: &str, component: F)
    where
        F: Fn(NodeRef<'_>, &Document) -> String + 'static,
    {
        self.components.insert(name.to_lowercase(), Rc::new(component));
    }

    /// Remove a tag renderer. Returns whether one was registered.
    pub fn unregister_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(&tag.to_lowercase()).is_some()
    }

    pub fn renderer(&self, tag: &str) -> Option<Rc<dyn Renderer>> {
        self.tags.get(&tag.to_lowercase()).cloned()
    }

    pub fn component(&self, name: &str) -> Option<Component> {
        self.components.get(&name.to_lowercase()).cloned()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains_key(&tag.to_lowercase())
    }

    /// Number of registered tags (components not included).
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the registry has no tags.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::Label;
    use crate::widget::shared;

    #[test]
    fn defaults_installed() {
        let registry = Registry::with_defaults();
        for tag in ["row", "col", "text", "button", "input", "list"] {
            assert!(registry.has_tag(tag), "missing {tag}");
        }
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut registry = Registry::new();
        registry.register_tag("Badge", |_node, _doc| Ok(shared(Label::new("b")) as WidgetRef));
        assert!(registry.renderer("badge").is_some());
        assert!(registry.renderer("BADGE").is_some());
        assert!(registry.renderer("other").is_none());
    }

    #[test]
    fn register_replaces_existing() {
        let mut registry = Registry::with_defaults();
        registry.register_tag("text", |_node, _doc| Ok(shared(Label::new("x")) as WidgetRef));
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn unregister() {
        let mut registry = Registry::with_defaults();
        assert!(registry.unregister_tag("LIST"));
        assert!(!registry.unregister_tag("list"));
        assert!(!registry.is_empty());
    }

    #[test]
    fn components_are_separate() {
        let mut registry = Registry::new();
        registry.register_component("Greeting", |_node, _doc| "<text>hi</text>".to_string());
        assert!(registry.component("greeting").is_some());
        assert!(!registry.has_tag("greeting"));
        assert!(registry.is_empty());
    }
}
