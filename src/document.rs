//! Document: one parsed markup tree plus its state, ref table and callbacks.
//!
//! Loading markup parses it and renders the root node through the
//! [`Registry`]. For every node the driver
//!
//! - builds the widget with the tag's renderer, expands a component, or falls
//!   back to an "unknown tag" placeholder,
//! - registers the widget in the ref table under its `id` (last wins),
//! - wires the `hidden` attribute and bind to the widget's visibility.
//!
//! Renderers compose their children before returning, so child ids register
//! before their parent's. Malformed markup never fails a load: it renders as
//! a visible placeholder. Type mismatches between bindings and I/O failures
//! are returned as [`DocumentError`].
//!
//! Reloading is a full remount: the ref table and every binding subscription
//! of the previous tree are dropped before the new tree renders.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::binding::{bind_template, bind_to_state, update_widget, Setter};
use crate::config::DocumentConfig;
use crate::markup::{parse_markup, Markup, NodeRef};
use crate::reactive::{StateValue, Subscription};
use crate::registry::Registry;
use crate::reload::HotReload;
use crate::state::{State, StateError, WeakState};
use crate::widget::{with_widget, with_widget_mut, Widget, WidgetRef};
use crate::widgets::Placeholder;

/// A named action invoked by `bind:click`-style interactions.
pub type Callback = Rc<dyn Fn()>;

type CallbackMap = Rc<RefCell<HashMap<String, Callback>>>;

/// Errors surfaced by document loading and rendering.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error(transparent)]
    State(#[from] StateError),
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

pub struct Document {
    registry: Rc<Registry>,
    config: Rc<DocumentConfig>,
    state: State,
    callbacks: CallbackMap,
    refs: RefCell<HashMap<String, WidgetRef>>,
    subscriptions: RefCell<Vec<Subscription>>,
    root: Option<WidgetRef>,
    markup: Option<Rc<Markup>>,
    source: Option<PathBuf>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("state", &self.state)
            .field("refs", &self.ids())
            .field("subscriptions", &self.subscriptions.borrow().len())
            .field("mounted", &self.root.is_some())
            .field("source", &self.source)
            .finish()
    }
}

impl Drop for Document {
    fn drop(&mut self) {
        self.cancel_subscriptions();
    }
}

impl Document {
    /// Create an empty document with the default config.
    pub fn new(registry: Rc<Registry>) -> Self {
        Self::with_config(registry, DocumentConfig::default())
    }

    pub fn with_config(registry: Rc<Registry>, config: DocumentConfig) -> Self {
        Self {
            registry,
            config: Rc::new(config),
            state: State::new(),
            callbacks: Rc::default(),
            refs: RefCell::default(),
            subscriptions: RefCell::default(),
            root: None,
            markup: None,
            source: None,
        }
    }

    pub fn registry(&self) -> &Rc<Registry> {
        &self.registry
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    pub fn use_state(&self) -> &State {
        &self.state
    }

    /// Register (or replace) the callback invoked for `bind:click="name"`.
    pub fn use_callback(&self, name: impl Into<String>, callback: impl Fn() + 'static) {
        self.callbacks
            .borrow_mut()
            .insert(name.into(), Rc::new(callback));
    }

    pub fn callback(&self, name: &str) -> Option<Callback> {
        self.callbacks.borrow().get(name).cloned()
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Remount from a markup string.
    ///
    /// If a binding fails, the document is left unmounted and every state
    /// name the attempt created is removed again. Values written into names
    /// that already existed are kept.
    pub fn load_string(&mut self, content: &str) -> Result<(), DocumentError> {
        self.unmount();
        let known: HashSet<String> = self.state.names().into_iter().collect();

        let root = match parse_markup(content, &self.config.bind_namespace) {
            Ok(markup) => {
                let markup = Rc::new(markup);
                let root = match NodeRef::root(&markup) {
                    Some(node) => self.render_node(node),
                    None => Ok(Placeholder::shared("empty document")),
                };
                self.markup = Some(markup);
                root
            }
            Err(err) => {
                tracing::warn!(%err, "markup failed to parse");
                Ok(Placeholder::shared(format!("error parsing markup: {err}")))
            }
        };

        match root {
            Ok(root) => {
                self.root = Some(root);
                tracing::debug!(
                    refs = self.refs.borrow().len(),
                    subscriptions = self.subscriptions.borrow().len(),
                    "document mounted"
                );
                Ok(())
            }
            Err(err) => {
                self.unmount();
                let created: Vec<String> = self
                    .state
                    .names()
                    .into_iter()
                    .filter(|name| !known.contains(name))
                    .collect();
                for name in &created {
                    self.state.remove(name);
                }
                tracing::debug!(%err, rolled_back = created.len(), "mount failed");
                Err(err)
            }
        }
    }

    /// Remount from a file, remembering the path for [`reload`](Self::reload).
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.source = Some(path.to_path_buf());
        self.load_string(&content)
    }

    /// Re-read the file last loaded with [`load_file`](Self::load_file).
    /// Returns `false` when the document was not loaded from a file.
    pub fn reload(&mut self) -> Result<bool, DocumentError> {
        match self.source.clone() {
            Some(path) => {
                self.load_file(path)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Drain pending reload signals and remount at most once.
    ///
    /// Must be called on the thread that owns the document. Returns whether a
    /// remount happened.
    pub fn apply_reload(&mut self, reload: &mut HotReload) -> Result<bool, DocumentError> {
        let events = reload.drain();
        let Some(last) = events.last() else {
            return Ok(false);
        };
        let path = self.source.clone().unwrap_or_else(|| last.path.clone());
        tracing::debug!(signals = events.len(), path = %path.display(), "reloading document");
        self.load_file(path)?;
        Ok(true)
    }

    /// Drop the widget tree, the ref table and every binding subscription.
    pub fn unmount(&mut self) {
        self.cancel_subscriptions();
        self.refs.get_mut().clear();
        self.root = None;
        self.markup = None;
    }

    fn cancel_subscriptions(&mut self) {
        for subscription in self.subscriptions.get_mut().drain(..) {
            subscription.cancel();
        }
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    pub fn root(&self) -> Option<WidgetRef> {
        self.root.clone()
    }

    /// The parsed markup of the current mount.
    pub fn markup(&self) -> Option<&Rc<Markup>> {
        self.markup.as_ref()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// The widget registered under `id`.
    pub fn widget(&self, id: &str) -> Option<WidgetRef> {
        self.refs.borrow().get(id).cloned()
    }

    /// Run `f` on the widget registered under `id` if it is a `W`.
    pub fn find<W: Widget + 'static, R>(&self, id: &str, f: impl FnOnce(&W) -> R) -> Option<R> {
        with_widget(&self.widget(id)?, f)
    }

    pub fn find_mut<W: Widget + 'static, R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut W) -> R,
    ) -> Option<R> {
        with_widget_mut(&self.widget(id)?, f)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.refs.borrow().keys().cloned().collect();
        ids.sort();
        ids
    }

    // -----------------------------------------------------------------------
    // Fragments
    // -----------------------------------------------------------------------

    /// A document sharing this one's registry, config and callbacks, whose
    /// state is a [fork](State::fork) of this one's. It starts unmounted with
    /// an empty ref table.
    pub fn fragment(&self) -> Document {
        self.fragment_factory().build(self.state.fork())
    }

    /// A detached handle that creates fragments later, without borrowing or
    /// keeping alive this document's state.
    pub fn fragment_factory(&self) -> FragmentFactory {
        FragmentFactory {
            registry: Rc::clone(&self.registry),
            config: Rc::clone(&self.config),
            state: self.state.downgrade(),
            callbacks: Rc::clone(&self.callbacks),
        }
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    /// Build the widget for `node` and apply the per-node id and visibility
    /// wiring.
    pub fn render_node(&self, node: NodeRef<'_>) -> Result<WidgetRef, DocumentError> {
        let tag = node.tag();
        let widget = if let Some(renderer) = self.registry.renderer(&tag) {
            renderer.render(node, self)?
        } else if let Some(component) = self.registry.component(&tag) {
            let markup = component(node, self);
            self.render_markup(&markup)?
        } else {
            tracing::warn!(tag = %node.data().name, "unknown tag");
            Placeholder::unknown_tag(&tag)
        };

        let id = node.attr(&self.config.id_attr);
        if !id.is_empty() {
            self.refs
                .borrow_mut()
                .insert(id.to_owned(), Rc::clone(&widget));
        }

        self.bind_bool(
            node,
            &self.config.visibility_attr,
            update_widget(&widget, |widget, hidden: &bool| widget.set_hidden(*hidden)),
        )?;

        Ok(widget)
    }

    /// Render every child of `node`, in order.
    pub fn render_children(&self, node: NodeRef<'_>) -> Result<Vec<WidgetRef>, DocumentError> {
        node.children().map(|child| self.render_node(child)).collect()
    }

    /// Parse and render a markup snippet inside this document.
    pub fn render_markup(&self, source: &str) -> Result<WidgetRef, DocumentError> {
        match parse_markup(source, &self.config.bind_namespace) {
            Ok(markup) => {
                let markup = Rc::new(markup);
                match NodeRef::root(&markup) {
                    Some(node) => self.render_node(node),
                    None => Ok(Placeholder::shared("empty component")),
                }
            }
            Err(err) => {
                tracing::warn!(%err, "component markup failed to parse");
                Ok(Placeholder::shared(format!("component error: {err}")))
            }
        }
    }

    /// Keep `subscription` until the next remount.
    pub fn track(&self, subscription: Subscription) {
        self.subscriptions.borrow_mut().push(subscription);
    }

    // -----------------------------------------------------------------------
    // Binding helpers
    // -----------------------------------------------------------------------

    fn bind_value<T: StateValue>(
        &self,
        literal: T,
        bind_name: &str,
        update: impl FnMut(&T) + 'static,
    ) -> Result<Option<Setter<T>>, DocumentError> {
        let (setter, subscription) =
            bind_to_state(literal, bind_name, &self.state, update)?.into_parts();
        if let Some(subscription) = subscription {
            self.track(subscription);
        }
        Ok(setter)
    }

    /// Bind the string attribute `name` and its `bind:name` counterpart.
    pub fn bind_string(
        &self,
        node: NodeRef<'_>,
        name: &str,
        update: impl FnMut(&String) + 'static,
    ) -> Result<Option<Setter<String>>, DocumentError> {
        self.bind_value(node.attr(name).to_owned(), node.bind(name), update)
    }

    pub fn bind_int(
        &self,
        node: NodeRef<'_>,
        name: &str,
        update: impl FnMut(&i64) + 'static,
    ) -> Result<Option<Setter<i64>>, DocumentError> {
        self.bind_value(node.attr_int(name), node.bind(name), update)
    }

    pub fn bind_float(
        &self,
        node: NodeRef<'_>,
        name: &str,
        update: impl FnMut(&f64) + 'static,
    ) -> Result<Option<Setter<f64>>, DocumentError> {
        self.bind_value(node.attr_float(name), node.bind(name), update)
    }

    pub fn bind_bool(
        &self,
        node: NodeRef<'_>,
        name: &str,
        update: impl FnMut(&bool) + 'static,
    ) -> Result<Option<Setter<bool>>, DocumentError> {
        self.bind_value(node.attr_bool(name), node.bind(name), update)
    }

    /// Bind the node's text content.
    ///
    /// `bind:content="name"` binds the content to a string cell. A bare
    /// `bind:content=""` compiles the content as a template instead; template
    /// content has no setter.
    pub fn bind_content(
        &self,
        node: NodeRef<'_>,
        update: impl FnMut(&String) + 'static,
    ) -> Result<Option<Setter<String>>, DocumentError> {
        let attr = &self.config.content_attr;
        let bind_name = node.bind(attr);
        if bind_name.is_empty() && node.has_bind(attr) {
            for subscription in bind_template(node.content(), &self.state, update)? {
                self.track(subscription);
            }
            return Ok(None);
        }
        self.bind_value(node.content().to_owned(), bind_name, update)
    }

    /// An action that fires the callback named by `bind:name`.
    ///
    /// The callback is looked up when the action fires, so callbacks may be
    /// registered after the document loads. Returns `None` when the node has
    /// no such bind.
    pub fn bind_callback(&self, node: NodeRef<'_>, name: &str) -> Option<Callback> {
        if !node.has_bind(name) {
            return None;
        }
        let callback_name = node.bind(name).to_owned();
        let callbacks = Rc::downgrade(&self.callbacks);
        Some(Rc::new(move || {
            let callback = callbacks
                .upgrade()
                .and_then(|map| map.borrow().get(&callback_name).cloned());
            match callback {
                Some(callback) => callback(),
                None => tracing::warn!(callback = %callback_name, "no callback registered"),
            }
        }))
    }
}

// ---------------------------------------------------------------------------
// FragmentFactory
// ---------------------------------------------------------------------------

/// Creates fragment documents for a parent that may have since been dropped.
#[derive(Clone)]
pub struct FragmentFactory {
    registry: Rc<Registry>,
    config: Rc<DocumentConfig>,
    state: WeakState,
    callbacks: CallbackMap,
}

impl fmt::Debug for FragmentFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FragmentFactory")
            .field("parent_alive", &self.state.upgrade().is_some())
            .finish()
    }
}

impl FragmentFactory {
    /// A fresh fragment, or `None` once the parent state is gone.
    pub fn fragment(&self) -> Option<Document> {
        self.state.upgrade().map(|state| self.build(state.fork()))
    }

    fn build(&self, state: State) -> Document {
        Document {
            registry: Rc::clone(&self.registry),
            config: Rc::clone(&self.config),
            state,
            callbacks: Rc::clone(&self.callbacks),
            refs: RefCell::default(),
            subscriptions: RefCell::default(),
            root: None,
            markup: None,
            source: None,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::widgets::{Button, Label};
    use pretty_assertions::assert_eq;

    fn document() -> Document {
        Document::new(Rc::new(Registry::with_defaults()))
    }

    fn label_text(doc: &Document, id: &str) -> String {
        doc.find::<Label, _>(id, |label| label.text().to_owned())
            .unwrap()
    }

    #[test]
    fn load_registers_ids() {
        let mut doc = document();
        doc.load_string(r#"<col id="root"><text id="title">Hello</text></col>"#)
            .unwrap();
        assert_eq!(doc.ids(), vec!["root".to_string(), "title".to_string()]);
        assert_eq!(label_text(&doc, "title"), "Hello");
    }

    #[test]
    fn unknown_tag_becomes_placeholder() {
        let mut doc = document();
        doc.load_string(r#"<frobnicate id="x"/>"#).unwrap();
        let message = doc
            .find::<Placeholder, _>("x", |p| (p.message().to_owned(), p.tag().map(str::to_owned)))
            .unwrap();
        assert_eq!(message, ("<unknown tag: frobnicate>".to_string(), Some("frobnicate".to_string())));
    }

    #[test]
    fn parse_error_becomes_placeholder() {
        let mut doc = document();
        doc.load_string("<col><text></col>").unwrap();
        let root = doc.root().unwrap();
        let message = with_widget::<Placeholder, _>(&root, |p| p.message().to_owned()).unwrap();
        assert!(message.starts_with("error parsing markup:"), "{message}");
        assert!(doc.ids().is_empty());
    }

    #[test]
    fn overly_deep_markup_becomes_placeholder() {
        let depth = crate::markup::MAX_DEPTH + 1;
        let markup = format!("{}{}", "<col>".repeat(depth), "</col>".repeat(depth));
        let mut doc = document();
        doc.load_string(&markup).unwrap();
        let root = doc.root().unwrap();
        let message = with_widget::<Placeholder, _>(&root, |p| p.message().to_owned()).unwrap();
        assert!(message.starts_with("error parsing markup: elements nested deeper than"), "{message}");
    }

    #[test]
    fn duplicate_id_last_writer_wins() {
        let mut doc = document();
        doc.load_string(r#"<col><text id="t">first</text><text id="t">second</text></col>"#)
            .unwrap();
        assert_eq!(label_text(&doc, "t"), "second");
    }

    #[test]
    fn parent_id_registered_after_children() {
        let mut doc = document();
        doc.load_string(r#"<col id="same"><text id="same">child</text></col>"#)
            .unwrap();
        assert_eq!(doc.widget("same").unwrap().borrow().widget_type(), "Stack");
    }

    #[test]
    fn hidden_attribute_and_bind() {
        let mut doc = document();
        doc.load_string(
            r#"<col><text id="a" hidden="true">a</text><text id="b" bind:hidden="collapsed">b</text></col>"#,
        )
        .unwrap();
        assert!(doc.widget("a").unwrap().borrow().is_hidden());
        assert!(!doc.widget("b").unwrap().borrow().is_hidden());

        doc.use_state().bool("collapsed", true).unwrap();
        assert!(doc.widget("b").unwrap().borrow().is_hidden());
    }

    #[test]
    fn content_bind_and_template() {
        let mut doc = document();
        doc.use_state().string("name", "World").unwrap();
        doc.load_string(
            r#"<col>
                <text id="plain" bind:content="name"/>
                <text id="greeting" bind:content="">Hello {{name}}!</text>
            </col>"#,
        )
        .unwrap();
        assert_eq!(label_text(&doc, "plain"), "World");
        assert_eq!(label_text(&doc, "greeting"), "Hello World!");

        doc.use_state().string("name", "Reago").unwrap();
        assert_eq!(label_text(&doc, "plain"), "Reago");
        assert_eq!(label_text(&doc, "greeting"), "Hello Reago!");
    }

    #[test]
    fn type_mismatch_fails_load() {
        let mut doc = document();
        let err = doc
            .load_string(r#"<col><text bind:content="n"/><text bind:size="n"/></col>"#)
            .unwrap_err();
        assert!(matches!(err, DocumentError::State(StateError::TypeMismatch { .. })));
        assert!(doc.root().is_none());
    }

    #[test]
    fn failed_load_removes_names_it_created() {
        let mut doc = document();
        doc.use_state().int("n", 1).unwrap();
        doc.use_state().string("kept", "yes").unwrap();
        let err = doc
            .load_string(r#"<col><text bind:content="fresh"/><text bind:content="kept"/><text bind:content="n"/></col>"#)
            .unwrap_err();
        assert!(matches!(err, DocumentError::State(StateError::TypeMismatch { .. })));
        assert!(!doc.use_state().has("fresh"));
        assert_eq!(doc.use_state().names(), vec!["kept".to_string(), "n".to_string()]);
        assert_eq!(doc.use_state().get_string("kept").unwrap().listener_count(), 0);
    }

    #[test]
    fn failed_fragment_load_removes_names_from_parent() {
        let doc = document();
        doc.use_state().int("n", 1).unwrap();
        let mut fragment = doc.fragment();
        assert!(fragment
            .load_string(r#"<col><text bind:content="fresh"/><text bind:content="n"/></col>"#)
            .is_err());
        assert!(!doc.use_state().has("fresh"));
    }

    #[test]
    fn callbacks_resolve_at_fire_time() {
        let mut doc = document();
        doc.load_string(r#"<button id="save" bind:click="save">Save</button>"#)
            .unwrap();
        let clicks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&clicks);
        doc.use_callback("save", move || counter.set(counter.get() + 1));

        doc.find::<Button, _>("save", |button| button.click()).unwrap();
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn missing_callback_is_ignored() {
        let mut doc = document();
        doc.load_string(r#"<button id="b" bind:click="nothing">Go</button>"#)
            .unwrap();
        doc.find::<Button, _>("b", |button| button.click()).unwrap();
    }

    #[test]
    fn remount_drops_old_bindings() {
        let mut doc = document();
        doc.load_string(r#"<text id="t" bind:content="name"/>"#).unwrap();
        let old = doc.widget("t").unwrap();
        let cell = doc.use_state().get_string("name").unwrap();
        assert_eq!(cell.listener_count(), 1);

        doc.load_string(r#"<text id="t" bind:content="name"/>"#).unwrap();
        assert_eq!(cell.listener_count(), 1);
        assert!(!Rc::ptr_eq(&old, &doc.widget("t").unwrap()));
    }

    #[test]
    fn components_render_in_place() {
        let mut registry = Registry::with_defaults();
        registry.register_component("greeting", |node, _doc| {
            format!(r#"<text id="inner">Hi {}</text>"#, node.attr("who"))
        });
        let mut doc = Document::new(Rc::new(registry));
        doc.load_string(r#"<col><greeting id="outer" who="Ann"/></col>"#)
            .unwrap();
        assert_eq!(label_text(&doc, "inner"), "Hi Ann");
        assert_eq!(label_text(&doc, "outer"), "Hi Ann");
    }

    #[test]
    fn fragment_shares_state_not_refs() {
        let mut doc = document();
        doc.use_state().string("title", "shared").unwrap();
        doc.load_string(r#"<text id="t">x</text>"#).unwrap();

        let mut fragment = doc.fragment();
        assert!(fragment.widget("t").is_none());
        fragment
            .load_string(r#"<text id="f" bind:content="title"/>"#)
            .unwrap();
        assert_eq!(label_text(&fragment, "f"), "shared");

        doc.use_state().string("title", "changed").unwrap();
        assert_eq!(label_text(&fragment, "f"), "changed");
        assert!(doc.widget("f").is_none());
    }

    #[test]
    fn fragment_sees_names_created_later() {
        let doc = document();
        let mut fragment = doc.fragment();
        doc.use_state().string("late", "early").unwrap();
        fragment
            .load_string(r#"<text id="t" bind:content="title"/>"#)
            .unwrap();
        doc.use_state().string("title", "parent").unwrap();
        assert_eq!(label_text(&fragment, "t"), "parent");
        assert!(fragment.use_state().has("late"));
    }

    #[test]
    fn dropping_fragment_releases_listeners() {
        let doc = document();
        let cell = doc.use_state().get_string("title").unwrap();
        {
            let mut fragment = doc.fragment();
            fragment
                .load_string(r#"<text bind:content="title"/>"#)
                .unwrap();
            assert_eq!(cell.listener_count(), 1);
        }
        assert_eq!(cell.listener_count(), 0);
    }

    #[test]
    fn load_file_missing_is_io_error() {
        let mut doc = document();
        let err = doc.load_file("/definitely/not/here.xml").unwrap_err();
        assert!(matches!(err, DocumentError::Io { .. }));
        assert!(err.to_string().starts_with("failed to read /definitely/not/here.xml"));
    }

    #[test]
    fn reload_without_source_is_noop() {
        let mut doc = document();
        assert!(!doc.reload().unwrap());
    }
}
