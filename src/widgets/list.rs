//! List widget: one row per item of a bound list.
//!
//! `<list bind:items="todos">` renders its children once per item. Each row
//! is rendered in its own fragment document whose state is layered over the
//! parent's, with the item's top-level fields shadowed as string cells, so
//! row markup binds item fields by name and still reacts to every other name
//! in the parent, including names the parent creates after the row.
//! Rows are rebuilt from scratch whenever the list changes.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::document::{Document, DocumentError, FragmentFactory};
use crate::markup::{NodeHandle, NodeRef};
use crate::state::State;
use crate::widget::{shared, Widget, WidgetRef};
use crate::widgets::placeholder::Placeholder;
use crate::widgets::stack::{Direction, Stack};

/// One rendered row and the fragment that owns its bindings.
pub struct ListRow {
    fragment: Document,
    widget: WidgetRef,
}

impl ListRow {
    /// The fragment document the row was rendered in.
    pub fn document(&self) -> &Document {
        &self.fragment
    }

    pub fn widget(&self) -> &WidgetRef {
        &self.widget
    }
}

impl fmt::Debug for ListRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListRow")
            .field("fragment", &self.fragment)
            .field(
                "widget",
                &self.widget.try_borrow().map(|w| w.widget_type().to_owned()).ok(),
            )
            .finish()
    }
}

#[derive(Debug)]
pub struct List {
    bind: String,
    rows: Vec<ListRow>,
    hidden: bool,
}

impl List {
    pub fn new(bind: impl Into<String>) -> Self {
        Self {
            bind: bind.into(),
            rows: Vec::new(),
            hidden: false,
        }
    }

    /// Name of the bound list cell.
    pub fn bind_name(&self) -> &str {
        &self.bind
    }

    pub fn rows(&self) -> &[ListRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Replace every row. The previous rows' fragments and bindings drop.
    pub fn set_rows(&mut self, rows: Vec<ListRow>) {
        self.rows = rows;
    }
}

impl Widget for List {
    fn widget_type(&self) -> &str {
        "List"
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }

    fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    fn children(&self) -> Vec<WidgetRef> {
        self.rows.iter().map(|row| row.widget.clone()).collect()
    }

    fn describe(&self) -> String {
        format!("items={} rows={}", self.bind, self.rows.len())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Text form of an item field: strings verbatim, `null` empty, anything else
/// as JSON.
fn field_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Seed a row's forked state from `item`. Object fields become row-local
/// string cells named after the field; any other item is stored under
/// `value`. Row writes to these names never reach the parent.
fn seed_row_state(state: &State, item: &Value) {
    match item {
        Value::Object(fields) => {
            for (key, value) in fields {
                state.shadow(key, field_text(value));
            }
        }
        other => {
            state.shadow("value", field_text(other));
        }
    }
}

fn build_row(fragment: Document, template: NodeRef<'_>, item: &Value) -> Result<ListRow, DocumentError> {
    seed_row_state(fragment.use_state(), item);
    let children = fragment.render_children(template)?;
    let widget: WidgetRef = shared(Stack::new(Direction::Row, children));
    Ok(ListRow { fragment, widget })
}

fn build_rows(
    factory: &FragmentFactory,
    template: &NodeHandle,
    items: &[Value],
) -> Result<Vec<ListRow>, DocumentError> {
    let Some(node) = template.node() else {
        return Ok(Vec::new());
    };
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let Some(fragment) = factory.fragment() else {
            break;
        };
        rows.push(build_row(fragment, node, item)?);
    }
    Ok(rows)
}

/// Renderer for `<list>`. Requires `bind:items`.
pub fn render(node: NodeRef<'_>, document: &Document) -> Result<WidgetRef, DocumentError> {
    if !node.has_bind("items") {
        return Ok(Placeholder::shared("<missing bind property in list>"));
    }

    let bind = node.bind("items").to_owned();
    let items = document.use_state().get_list(&bind)?;
    let factory = document.fragment_factory();
    let template = node.to_handle();

    let list = shared(List::new(bind.as_str()));
    let rows = build_rows(&factory, &template, &items.get())?;
    list.borrow_mut().set_rows(rows);

    let weak_list = Rc::downgrade(&list);
    let id = items.on_change(move |items: &[Value]| {
        let Some(list) = weak_list.upgrade() else {
            return;
        };
        match build_rows(&factory, &template, items) {
            Ok(rows) => match list.try_borrow_mut() {
                Ok(mut list) => {
                    tracing::debug!(list = %list.bind, rows = rows.len(), "rebuilt list rows");
                    list.set_rows(rows);
                }
                Err(_) => tracing::warn!("list changed while its widget was borrowed; rows not rebuilt"),
            },
            Err(err) => tracing::warn!(%err, "list rows failed to render"),
        };
    });
    document.track(items.subscription(id));

    Ok(list)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::widget::with_widget;
    use crate::widgets::{Input, Label};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const MARKUP: &str = r#"
        <list id="todos" bind:items="todos">
            <text id="title" bind:content="title"/>
            <text bind:content="">{{owner}}: {{done}}</text>
        </list>"#;

    fn document() -> Document {
        Document::new(Rc::new(Registry::with_defaults()))
    }

    /// Text of every label in every row, row by row.
    fn row_texts(doc: &Document) -> Vec<Vec<String>> {
        doc.find::<List, _>("todos", |list| {
            list.rows()
                .iter()
                .map(|row| {
                    row.widget()
                        .borrow()
                        .children()
                        .iter()
                        .filter_map(|child| with_widget::<Label, _>(child, |l| l.text().to_owned()))
                        .collect()
                })
                .collect()
        })
        .unwrap()
    }

    #[test]
    fn field_text_forms() {
        assert_eq!(field_text(&json!("a")), "a");
        assert_eq!(field_text(&json!(null)), "");
        assert_eq!(field_text(&json!(3)), "3");
        assert_eq!(field_text(&json!(true)), "true");
    }

    #[test]
    fn missing_bind_renders_placeholder() {
        let mut doc = document();
        doc.load_string(r#"<list id="l"><text/></list>"#).unwrap();
        let message = doc.find::<Placeholder, _>("l", |p| p.message().to_owned());
        assert_eq!(message.as_deref(), Some("<missing bind property in list>"));
    }

    #[test]
    fn rows_render_item_fields() {
        let mut doc = document();
        doc.use_state().string("owner", "ann").unwrap();
        doc.use_state()
            .list(
                "todos",
                vec![
                    json!({"title": "write", "done": false}),
                    json!({"title": "test", "done": true}),
                ],
            )
            .unwrap();
        doc.load_string(MARKUP).unwrap();

        assert_eq!(
            row_texts(&doc),
            vec![
                vec!["write".to_string(), "ann: false".to_string()],
                vec!["test".to_string(), "ann: true".to_string()],
            ]
        );
    }

    #[test]
    fn row_ids_stay_in_row_fragments() {
        let mut doc = document();
        doc.use_state().list("todos", vec![json!({"title": "a"})]).unwrap();
        doc.load_string(MARKUP).unwrap();
        assert!(doc.widget("title").is_none());
        let found = doc.find::<List, _>("todos", |list| list.rows()[0].document().widget("title").is_some());
        assert_eq!(found, Some(true));
    }

    #[test]
    fn rows_rebuild_on_change() {
        let mut doc = document();
        doc.load_string(MARKUP).unwrap();
        assert!(row_texts(&doc).is_empty());

        let todos = doc.use_state().get_list("todos").unwrap();
        todos.append(json!({"title": "new"}));
        assert_eq!(row_texts(&doc).len(), 1);
        assert_eq!(row_texts(&doc)[0][0], "new");

        todos.set(Vec::new());
        assert!(row_texts(&doc).is_empty());
    }

    #[test]
    fn rows_follow_parent_names() {
        let mut doc = document();
        doc.use_state().string("owner", "ann").unwrap();
        doc.use_state().list("todos", vec![json!({"title": "a"})]).unwrap();
        doc.load_string(MARKUP).unwrap();

        doc.use_state().string("owner", "bob").unwrap();
        assert_eq!(row_texts(&doc)[0][1], "bob: ");
    }

    #[test]
    fn rows_follow_names_bound_after_the_list() {
        let mut doc = document();
        doc.use_state().list("todos", vec![json!({"title": "a"})]).unwrap();
        doc.load_string(
            r#"
            <col>
                <list id="todos" bind:items="todos"><text bind:content="filter"/></list>
                <input id="filter" bind:value="filter"/>
            </col>"#,
        )
        .unwrap();
        assert_eq!(row_texts(&doc), vec![vec![String::new()]]);

        doc.use_state().string("filter", "done").unwrap();
        assert_eq!(row_texts(&doc), vec![vec!["done".to_string()]]);

        doc.find_mut::<Input, _>("filter", |input| {
            input.clear();
            input.type_text("all");
        });
        assert_eq!(row_texts(&doc), vec![vec!["all".to_string()]]);
    }

    #[test]
    fn row_edits_stay_in_row() {
        let mut doc = document();
        doc.use_state().string("title", "page").unwrap();
        doc.use_state().list("todos", vec![json!({"title": "row"})]).unwrap();
        doc.load_string(r#"<list id="todos" bind:items="todos"><input id="edit" bind:value="title"/></list>"#)
            .unwrap();
        doc.find::<List, _>("todos", |list| {
            list.rows()[0]
                .document()
                .find_mut::<Input, _>("edit", |input| input.type_text("changed"));
        });
        assert_eq!(doc.use_state().get_string("title").unwrap().get(), "page");
    }

    #[test]
    fn item_fields_do_not_leak_to_parent() {
        let mut doc = document();
        doc.use_state().string("title", "page").unwrap();
        doc.use_state().list("todos", vec![json!({"title": "row"})]).unwrap();
        doc.load_string(MARKUP).unwrap();
        assert_eq!(doc.use_state().get_string("title").unwrap().get(), "page");
        assert_eq!(row_texts(&doc)[0][0], "row");
    }

    #[test]
    fn scalar_items_use_value_name() {
        let mut doc = document();
        doc.use_state().list("tags", vec![json!("x"), json!(2)]).unwrap();
        doc.load_string(r#"<list id="todos" bind:items="tags"><text bind:content="value"/></list>"#)
            .unwrap();
        assert_eq!(
            row_texts(&doc),
            vec![vec!["x".to_string()], vec!["2".to_string()]]
        );
    }

    #[test]
    fn remount_releases_list_listener() {
        let mut doc = document();
        let todos = doc.use_state().get_list("todos").unwrap();
        doc.load_string(MARKUP).unwrap();
        assert_eq!(todos.listener_count(), 1);
        doc.unmount();
        assert_eq!(todos.listener_count(), 0);
    }
}
