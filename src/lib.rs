//! # reago
//!
//! Declarative XML markup bound to a reactive state store.
//!
//! A [`Document`] parses markup into a tree of widgets. Widget properties are
//! either static attributes or `bind:` attributes naming a cell in the
//! document's [`State`]; bound properties update whenever their cell changes,
//! and interactive widgets write user edits back into it. Text content may be
//! a `{{ name }}` template that re-renders when any name it mentions changes.
//!
//! ## Core Systems
//!
//! - **[`reactive`]**: Typed reactive cells and lists with change listeners
//! - **[`state`]**: Named store of mixed-kind cells, with forking for fragments
//! - **[`template`]**: `{{ name }}` template compiler and renderer
//! - **[`binding`]**: Resolution of static/bound properties against state
//! - **[`markup`]**: Logos-based XML tokenizer, parser and slotmap node arena
//! - **[`document`]**: Parse/render driver, ref table, callbacks and fragments
//! - **[`registry`]**: Tag to renderer/component mapping
//! - **[`widget`]** / **[`widgets`]**: Headless widget trait and built-in set
//! - **[`reload`]**: File-watch hot reload signals
//! - **[`testing`]**: Tree dumps for snapshot assertions
//!
//! ## Example
//!
//! ```
//! use std::rc::Rc;
//! use reago::{Document, Registry};
//! use reago::widgets::Label;
//!
//! let mut doc = Document::new(Rc::new(Registry::with_defaults()));
//! doc.use_state().string("name", "World").unwrap();
//! doc.load_string(r#"<text id="greeting" bind:content="">Hello {{name}}!</text>"#)
//!     .unwrap();
//!
//! doc.use_state().string("name", "reago").unwrap();
//! let text = doc.find::<Label, _>("greeting", |label| label.text().to_owned());
//! assert_eq!(text.as_deref(), Some("Hello reago!"));
//! ```

// Reactive core
pub mod reactive;
pub mod state;
pub mod template;
pub mod binding;

// Markup and documents
pub mod config;
pub mod markup;
pub mod document;
pub mod registry;
pub mod reload;

// Widget system
pub mod widget;
pub mod widgets;

// Test support
pub mod testing;

pub use binding::{bind_template, bind_to_state, Binding, Setter};
pub use config::DocumentConfig;
pub use document::{Callback, Document, DocumentError, FragmentFactory};
pub use markup::{parse_markup, MarkupError};
pub use reactive::{CellKind, ListError, Reactive, ReactiveList, StateValue, Subscription, Uri};
pub use registry::{Component, Registry, Renderer};
pub use reload::{HotReload, ReloadError, ReloadEvent, ReloadSender};
pub use state::{State, StateError, WeakState};
pub use template::TemplateProgram;
pub use widget::{Widget, WidgetRef};
