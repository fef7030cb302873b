//! Stack widget: holds child widgets in a row or a column.
//!
//! `<row>` and `<col>` both render to a `Stack`; the tag picks the
//! direction. Children are rendered before the stack is built.

use std::any::Any;

use crate::document::{Document, DocumentError};
use crate::markup::NodeRef;
use crate::widget::{shared, Widget, WidgetRef};

/// Main axis of a [`Stack`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Row,
    Column,
}

/// A container that holds child widgets along one axis.
///
/// # Examples
///
/// ```
/// use reago::widget::{shared, WidgetRef};
/// use reago::widgets::{Direction, Label, Stack};
///
/// let child: WidgetRef = shared(Label::new("Hello"));
/// let stack = Stack::new(Direction::Column, vec![child]);
/// assert_eq!(stack.child_count(), 1);
/// ```
pub struct Stack {
    direction: Direction,
    children: Vec<WidgetRef>,
    hidden: bool,
}

impl Stack {
    pub fn new(direction: Direction, children: Vec<WidgetRef>) -> Self {
        Self {
            direction,
            children,
            hidden: false,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Append a child.
    pub fn push(&mut self, child: WidgetRef) {
        self.children.push(child);
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

impl Widget for Stack {
    fn widget_type(&self) -> &str {
        "Stack"
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }

    fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    fn children(&self) -> Vec<WidgetRef> {
        self.children.clone()
    }

    fn describe(&self) -> String {
        match self.direction {
            Direction::Row => "row".into(),
            Direction::Column => "col".into(),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn render_stack(
    direction: Direction,
    node: NodeRef<'_>,
    document: &Document,
) -> Result<WidgetRef, DocumentError> {
    let children = document.render_children(node)?;
    Ok(shared(Stack::new(direction, children)))
}

/// Renderer for `<row>`.
pub fn render_row(node: NodeRef<'_>, document: &Document) -> Result<WidgetRef, DocumentError> {
    render_stack(Direction::Row, node, document)
}

/// Renderer for `<col>`.
pub fn render_col(node: NodeRef<'_>, document: &Document) -> Result<WidgetRef, DocumentError> {
    render_stack(Direction::Column, node, document)
}

// ===========================================================================
// Tests
// ===========================================================================
