//! Placeholder widget: stands in for markup that could not be rendered.
//!
//! Unknown tags, unparseable markup and incomplete nodes all render to a
//! visible placeholder instead of failing the document.

use std::any::Any;

use crate::widget::{shared, Widget, WidgetRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    message: String,
    tag: Option<String>,
    hidden: bool,
}

impl Placeholder {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            tag: None,
            hidden: false,
        }
    }

    /// Placeholder for a tag no renderer or component handles.
    pub fn for_unknown_tag(tag: &str) -> Self {
        Self {
            message: format!("<unknown tag: {tag}>"),
            tag: Some(tag.to_owned()),
            hidden: false,
        }
    }

    /// [`Placeholder::new`] wrapped in a widget handle.
    pub fn shared(message: impl Into<String>) -> WidgetRef {
        shared(Self::new(message))
    }

    /// [`Placeholder::for_unknown_tag`] wrapped in a widget handle.
    pub fn unknown_tag(tag: &str) -> WidgetRef {
        shared(Self::for_unknown_tag(tag))
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The unknown tag name, when this placeholder stands in for one.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }
}

impl Widget for Placeholder {
    fn widget_type(&self) -> &str {
        "Placeholder"
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }

    fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    fn describe(&self) -> String {
        format!("{:?}", self.message)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
