//! Snapshot rendering helpers.
//!
//! Converts a widget tree into plain text: one line per widget, indented two
//! spaces per level, holding the widget type, its
//! [`describe`](crate::widget::Widget::describe) summary and a `[hidden]`
//! marker.

use crate::document::Document;
use crate::widget::WidgetRef;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Dump the tree rooted at `widget`.
///
/// The final line does not have a trailing newline. A widget that is
/// mutably borrowed while the dump runs shows as `<borrowed>`.
///
/// # Examples
///
/// ```
/// use reago::testing::tree_to_string;
/// use reago::widget::{shared, WidgetRef};
/// use reago::widgets::{Direction, Label, Stack};
///
/// let label: WidgetRef = shared(Label::new("Hello"));
/// let root: WidgetRef = shared(Stack::new(Direction::Column, vec![label]));
/// assert_eq!(tree_to_string(&root), "Stack col\n  Label \"Hello\"");
/// ```
pub fn tree_to_string(widget: &WidgetRef) -> String {
    let mut lines = Vec::new();
    write_node(widget, 0, &mut lines);
    lines.join("\n")
}

/// Dump a document's mounted tree, or an empty string when unmounted.
pub fn document_to_string(document: &Document) -> String {
    document
        .root()
        .map(|root| tree_to_string(&root))
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Internal
// ---------------------------------------------------------------------------

fn write_node(widget: &WidgetRef, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    let Ok(node) = widget.try_borrow() else {
        lines.push(format!("{indent}<borrowed>"));
        return;
    };

    let mut line = format!("{indent}{}", node.widget_type());
    let summary = node.describe();
    if !summary.is_empty() {
        line.push(' ');
        line.push_str(&summary);
    }
    if node.is_hidden() {
        line.push_str(" [hidden]");
    }
    lines.push(line);

    for child in node.children() {
        write_node(&child, depth + 1, lines);
    }
}

// ===========================================================================
// Tests
// ===========================================================================
