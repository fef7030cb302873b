//! Input widget: an editable text field.
//!
//! Supports cursor movement, character insertion/deletion, placeholder text,
//! and password masking. User edits are reported through the change handler,
//! which the `<input>` renderer connects to the `bind:value` cell. Values
//! arriving from state replace the text without reporting a change.

use std::any::Any;
use std::fmt;

use crate::binding::update_widget;
use crate::document::{Document, DocumentError};
use crate::markup::NodeRef;
use crate::widget::{shared, Widget, WidgetRef};

type ChangeHandler = Box<dyn Fn(&str)>;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A text input widget with cursor, placeholder, and password support.
///
/// The cursor position is tracked as a byte offset into the value string.
/// All cursor operations are char-boundary safe.
///
/// # Examples
///
/// ```
/// use reago::widgets::Input;
///
/// let mut input = Input::new().with_placeholder("Enter your name...");
/// input.type_text("Alice");
/// assert_eq!(input.value(), "Alice");
/// ```
pub struct Input {
    value: String,
    placeholder: String,
    cursor_position: usize,
    password: bool,
    disabled: bool,
    hidden: bool,
    on_change: Option<ChangeHandler>,
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input")
            .field("value", &self.value)
            .field("placeholder", &self.placeholder)
            .field("cursor_position", &self.cursor_position)
            .field("password", &self.password)
            .field("disabled", &self.disabled)
            .finish()
    }
}

impl Input {
    /// Create a new empty input.
    pub fn new() -> Self {
        Self {
            value: String::new(),
            placeholder: String::new(),
            cursor_position: 0,
            password: false,
            disabled: false,
            hidden: false,
            on_change: None,
        }
    }

    /// Set the placeholder text (builder pattern).
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Enable or disable password masking (builder pattern).
    pub fn password(mut self, password: bool) -> Self {
        self.password = password;
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the value without reporting a change, moving the cursor to
    /// the end.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor_position = self.value.len();
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn set_placeholder(&mut self, placeholder: impl Into<String>) {
        self.placeholder = placeholder.into();
    }

    pub fn is_password(&self) -> bool {
        self.password
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Handler called with the new value after every user edit.
    pub fn set_on_change(&mut self, handler: impl Fn(&str) + 'static) {
        self.on_change = Some(Box::new(handler));
    }

    /// Clear the input value and reset the cursor.
    pub fn clear(&mut self) {
        self.edit(|input| {
            input.value.clear();
            input.cursor_position = 0;
        });
    }

    /// Insert a character at the current cursor position.
    pub fn insert_char(&mut self, ch: char) {
        self.edit(|input| {
            input.value.insert(input.cursor_position, ch);
            input.cursor_position += ch.len_utf8();
        });
    }

    /// Insert `text` at the cursor, reporting one change.
    pub fn type_text(&mut self, text: &str) {
        self.edit(|input| {
            input.value.insert_str(input.cursor_position, text);
            input.cursor_position += text.len();
        });
    }

    /// Delete the character before the cursor (backspace).
    pub fn delete_char(&mut self) {
        if self.cursor_position == 0 {
            return;
        }
        self.edit(|input| {
            let prev = input.prev_char_boundary();
            input.value.drain(prev..input.cursor_position);
            input.cursor_position = prev;
        });
    }

    /// Delete the character after the cursor (delete forward).
    pub fn delete_forward(&mut self) {
        if self.cursor_position >= self.value.len() {
            return;
        }
        self.edit(|input| {
            let next = input.next_char_boundary();
            input.value.drain(input.cursor_position..next);
        });
    }

    /// Move the cursor left by one character.
    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position = self.prev_char_boundary();
        }
    }

    /// Move the cursor right by one character.
    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.value.len() {
            self.cursor_position = self.next_char_boundary();
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_position = self.value.len();
    }

    /// Return the cursor position (byte offset).
    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    /// Display string: either the value (possibly masked) or the placeholder.
    pub fn display_text(&self) -> String {
        if self.value.is_empty() {
            self.placeholder.clone()
        } else if self.password {
            "\u{2022}".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Apply a user edit and report the new value. Disabled inputs ignore
    /// edits.
    fn edit(&mut self, change: impl FnOnce(&mut Self)) {
        if self.disabled {
            return;
        }
        change(self);
        if let Some(handler) = &self.on_change {
            handler(&self.value);
        }
    }

    fn prev_char_boundary(&self) -> usize {
        let mut pos = self.cursor_position.saturating_sub(1);
        while pos > 0 && !self.value.is_char_boundary(pos) {
            pos -= 1;
        }
        pos
    }

    fn next_char_boundary(&self) -> usize {
        let mut pos = self.cursor_position + 1;
        while pos < self.value.len() && !self.value.is_char_boundary(pos) {
            pos += 1;
        }
        pos
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for Input {
    fn widget_type(&self) -> &str {
        "Input"
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }

    fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    fn describe(&self) -> String {
        format!("{:?}", self.display_text())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Renderer for `<input>`. `type="password"` masks the value.
pub fn render(node: NodeRef<'_>, document: &Document) -> Result<WidgetRef, DocumentError> {
    let input = shared(Input::new().password(node.attr("type") == "password"));

    document.bind_string(
        node,
        "placeholder",
        update_widget(&input, |input: &mut Input, text: &String| {
            input.set_placeholder(text.as_str())
        }),
    )?;
    let setter = document.bind_string(
        node,
        "value",
        update_widget(&input, |input: &mut Input, value: &String| {
            input.set_value(value.as_str())
        }),
    )?;
    if let Some(setter) = setter {
        input
            .borrow_mut()
            .set_on_change(move |value| setter.set(value.to_owned()));
    }
    document.bind_bool(
        node,
        "disabled",
        update_widget(&input, |input: &mut Input, disabled: &bool| {
            input.set_disabled(*disabled)
        }),
    )?;

    Ok(input)
}

// ===========================================================================
// Tests
// ===========================================================================
