//! Button widget: a clickable label.
//!
//! `bind:click="name"` wires the click to the document callback `name`. A
//! disabled button ignores clicks.

use std::any::Any;
use std::fmt;

use crate::binding::update_widget;
use crate::document::{Callback, Document, DocumentError};
use crate::markup::NodeRef;
use crate::widget::{shared, Widget, WidgetRef};

/// An interactive button widget.
///
/// # Examples
///
/// ```
/// use reago::widgets::Button;
///
/// let button = Button::new("Submit").disabled(true);
/// assert!(button.is_disabled());
/// ```
#[derive(Default)]
pub struct Button {
    label: String,
    icon: String,
    disabled: bool,
    hidden: bool,
    on_click: Option<Callback>,
}

impl fmt::Debug for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Button")
            .field("label", &self.label)
            .field("icon", &self.icon)
            .field("disabled", &self.disabled)
            .field("hidden", &self.hidden)
            .field("on_click", &self.on_click.is_some())
            .finish()
    }
}

impl Button {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Set whether the button is disabled (builder pattern).
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn set_icon(&mut self, icon: impl Into<String>) {
        self.icon = icon.into();
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn set_on_click(&mut self, callback: Option<Callback>) {
        self.on_click = callback;
    }

    /// Fire the click action. Returns whether an action ran.
    pub fn click(&self) -> bool {
        if self.disabled {
            return false;
        }
        match &self.on_click {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

impl Widget for Button {
    fn widget_type(&self) -> &str {
        "Button"
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }

    fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    fn describe(&self) -> String {
        let mut out = format!("{:?}", self.label);
        if self.disabled {
            out.push_str(" disabled");
        }
        out
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Renderer for `<button>`.
pub fn render(node: NodeRef<'_>, document: &Document) -> Result<WidgetRef, DocumentError> {
    let button = shared(Button::default());
    button
        .borrow_mut()
        .set_on_click(document.bind_callback(node, "click"));

    document.bind_string(
        node,
        "icon",
        update_widget(&button, |button: &mut Button, icon: &String| button.set_icon(icon.as_str())),
    )?;
    document.bind_content(
        node,
        update_widget(&button, |button: &mut Button, label: &String| {
            button.set_label(label.as_str())
        }),
    )?;
    document.bind_bool(
        node,
        "disabled",
        update_widget(&button, |button: &mut Button, disabled: &bool| {
            button.set_disabled(*disabled)
        }),
    )?;

    Ok(button)
}

// ===========================================================================
// Tests
// ===========================================================================
