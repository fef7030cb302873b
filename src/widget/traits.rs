//! Widget trait and the shared widget handle.
//!
//! Widgets are headless: they hold the properties their bindings write and
//! expose them for inspection. Every widget carries a hidden flag, because
//! visibility is wired for every node regardless of tag.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

// ---------------------------------------------------------------------------
// Widget trait
// ---------------------------------------------------------------------------

/// Core trait implemented by all widgets.
///
/// Widget is object-safe: documents hold widgets as [`WidgetRef`] trait
/// objects and downcast through [`as_any`](Widget::as_any) when a caller
/// knows the concrete type.
pub trait Widget {
    /// Type name for diagnostics and tree dumps (e.g. "Label", "Stack").
    fn widget_type(&self) -> &str;

    fn is_hidden(&self) -> bool;

    fn set_hidden(&mut self, hidden: bool);

    /// Child widgets, in order. Defaults to none (leaf widget).
    fn children(&self) -> Vec<WidgetRef> {
        Vec::new()
    }

    /// Short property summary shown next to the type name in tree dumps.
    fn describe(&self) -> String {
        String::new()
    }

    /// Downcast to `&dyn Any` for runtime type inspection.
    fn as_any(&self) -> &dyn Any;

    /// Downcast to `&mut dyn Any` for mutable runtime type inspection.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Shared, single-thread handle to a widget.
pub type WidgetRef = Rc<RefCell<dyn Widget>>;

/// Wrap a concrete widget in a shared handle, keeping its concrete type.
///
/// The result coerces to [`WidgetRef`] with `as WidgetRef` or `Rc::clone`.
pub fn shared<W: Widget + 'static>(widget: W) -> Rc<RefCell<W>> {
    Rc::new(RefCell::new(widget))
}

/// Run `f` on `widget` if it is a `W`.
///
/// Returns `None` when the widget has another type or is currently borrowed
/// mutably.
pub fn with_widget<W: Widget + 'static, R>(widget: &WidgetRef, f: impl FnOnce(&W) -> R) -> Option<R> {
    let borrowed = widget.try_borrow().ok()?;
    borrowed.as_any().downcast_ref::<W>().map(f)
}

/// Mutable counterpart of [`with_widget`].
pub fn with_widget_mut<W: Widget + 'static, R>(
    widget: &WidgetRef,
    f: impl FnOnce(&mut W) -> R,
) -> Option<R> {
    let mut borrowed = widget.try_borrow_mut().ok()?;
    borrowed.as_any_mut().downcast_mut::<W>().map(f)
}
