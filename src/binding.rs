//! Attribute/binding resolution.
//!
//! [`bind_to_state`] is the contract every bindable widget property goes
//! through. A node supplies the literal from its plain attribute and the bind
//! name from its `bind:` attribute:
//!
//! 1. A non-zero literal is applied to the widget at once, bound or not.
//! 2. With a bind name, the first binder of a name seeds the cell with its own
//!    literal; later binders never overwrite it. A binder with a zero literal
//!    adopts the value an existing cell already holds.
//! 3. The widget then listens for every later change, and the caller gets a
//!    [`Setter`] for pushing user edits back into the cell.
//!
//! Without a bind name the property is static and no setter is returned.
//!
//! [`bind_template`] is the content variant: the literal is compiled as a
//! template and re-rendered whenever one of its dependencies changes.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::reactive::{Reactive, StateValue, Subscription};
use crate::state::{State, StateError};
use crate::template::TemplateProgram;

/// Writes user edits back into a bound cell.
pub struct Setter<T: StateValue> {
    cell: Reactive<T>,
}

impl<T: StateValue> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T: StateValue> fmt::Debug for Setter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter").field("kind", &T::KIND).finish()
    }
}

impl<T: StateValue> Setter<T> {
    pub fn set(&self, value: T) {
        self.cell.set(value);
    }

    pub fn cell(&self) -> &Reactive<T> {
        &self.cell
    }
}

/// The outcome of one [`bind_to_state`] call.
#[derive(Debug)]
pub struct Binding<T: StateValue> {
    setter: Option<Setter<T>>,
    subscription: Option<Subscription>,
}

impl<T: StateValue> Binding<T> {
    fn unbound() -> Self {
        Self {
            setter: None,
            subscription: None,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.setter.is_some()
    }

    pub fn setter(&self) -> Option<&Setter<T>> {
        self.setter.as_ref()
    }

    /// Split into the setter and the guard that detaches the widget listener.
    pub fn into_parts(self) -> (Option<Setter<T>>, Option<Subscription>) {
        (self.setter, self.subscription)
    }
}

/// Resolve one property against `state`. See the module docs for the order
/// of effects.
pub fn bind_to_state<T: StateValue>(
    static_value: T,
    bind_name: &str,
    state: &State,
    mut update: impl FnMut(&T) + 'static,
) -> Result<Binding<T>, StateError> {
    let has_literal = !static_value.is_zero();
    if has_literal {
        update(&static_value);
    }

    if bind_name.is_empty() {
        return Ok(Binding::unbound());
    }

    let initialized = state.has(bind_name);
    let cell = state.get::<T>(bind_name)?;
    if !initialized {
        cell.set(static_value);
    } else if !has_literal {
        let current = cell.get();
        if !current.is_zero() {
            update(&current);
        }
    }

    let id = cell.on_change(update);
    Ok(Binding {
        subscription: Some(cell.subscription(id)),
        setter: Some(Setter { cell }),
    })
}

/// Compile `source` as a template, apply its current rendering, and re-render
/// on every change of a dependency.
///
/// Each distinct dependency is subscribed once, so one mutation causes one
/// render even when a name appears several times. Returns one guard per
/// dependency.
pub fn bind_template(
    source: &str,
    state: &State,
    update: impl FnMut(&String) + 'static,
) -> Result<Vec<Subscription>, StateError> {
    let program = Rc::new(TemplateProgram::compile(source));
    let update: Rc<RefCell<dyn FnMut(&String)>> = Rc::new(RefCell::new(update));

    let mut subscriptions = Vec::new();
    for name in program.unique_dependencies() {
        let cell = state.get_string(name)?;
        let weak = state.downgrade();
        let program = Rc::clone(&program);
        let update = Rc::clone(&update);
        let id = cell.on_change(move |_| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            match program.render(&state) {
                Ok(text) => match update.try_borrow_mut() {
                    Ok(mut update) => (&mut *update)(&text),
                    Err(_) => tracing::warn!("template update re-entered itself; skipped"),
                },
                Err(err) => tracing::warn!(%err, "template render failed"),
            };
        });
        subscriptions.push(cell.subscription(id));
    }

    let text = program.render(state)?;
    let mut apply = update.borrow_mut();
    (&mut *apply)(&text);
    drop(apply);
    Ok(subscriptions)
}

/// Build an update callback that applies values to `widget` through a weak
/// reference.
///
/// The callback does nothing once the widget is dropped, and skips the update
/// while the widget is borrowed (a widget pushing its own edit into state).
pub fn update_widget<W, T>(
    widget: &Rc<RefCell<W>>,
    apply: impl Fn(&mut W, &T) + 'static,
) -> impl FnMut(&T) + 'static
where
    W: ?Sized + 'static,
    T: ?Sized + 'static,
{
    let weak = Rc::downgrade(widget);
    move |value: &T| {
        let Some(widget) = weak.upgrade() else {
            return;
        };
        if let Ok(mut widget) = widget.try_borrow_mut() {
            apply(&mut *widget, value);
        };
    }
}

// ===========================================================================
// Tests
// ===========================================================================
