//! Label widget: displays text content.
//!
//! The `<text>` tag renders to a `Label`. Its content, `color`, `size`,
//! `style` and `align` are all bindable.

use std::any::Any;
use std::fmt;

use crate::binding::update_widget;
use crate::document::{Document, DocumentError};
use crate::markup::NodeRef;
use crate::widget::{shared, Widget, WidgetRef};

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

const NAMED_COLORS: &[(&str, Color)] = &[
    ("black", Color::rgb(0, 0, 0)),
    ("white", Color::rgb(255, 255, 255)),
    ("red", Color::rgb(255, 0, 0)),
    ("green", Color::rgb(0, 128, 0)),
    ("lime", Color::rgb(0, 255, 0)),
    ("blue", Color::rgb(0, 0, 255)),
    ("yellow", Color::rgb(255, 255, 0)),
    ("cyan", Color::rgb(0, 255, 255)),
    ("magenta", Color::rgb(255, 0, 255)),
    ("gray", Color::rgb(128, 128, 128)),
    ("grey", Color::rgb(128, 128, 128)),
    ("orange", Color::rgb(255, 165, 0)),
    ("purple", Color::rgb(128, 0, 128)),
    ("pink", Color::rgb(255, 192, 203)),
    ("brown", Color::rgb(165, 42, 42)),
    ("navy", Color::rgb(0, 0, 128)),
    ("teal", Color::rgb(0, 128, 128)),
];

/// Parse `#rgb`, `#rrggbb` or a named color (case-insensitive).
pub fn parse_color(input: &str) -> Option<Color> {
    let input = input.trim();
    if let Some(hex) = input.strip_prefix('#') {
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_owned(),
            _ => return None,
        };
        let channel = |i: usize| -> Option<u8> { u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok() };
        return Some(Color::rgb(channel(0)?, channel(2)?, channel(4)?));
    }
    let lower = input.to_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, color)| *color)
}

// ---------------------------------------------------------------------------
// Style
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextStyle {
    #[default]
    Normal,
    Bold,
    Italic,
    Monospace,
    Underline,
}

impl TextStyle {
    /// Unknown names read as `Normal`.
    pub fn parse(input: &str) -> Self {
        match input {
            "bold" => Self::Bold,
            "italic" => Self::Italic,
            "monospace" => Self::Monospace,
            "underline" => Self::Underline,
            _ => Self::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    /// Unknown names read as `Left`.
    pub fn parse(input: &str) -> Self {
        match input {
            "center" => Self::Center,
            "right" => Self::Right,
            _ => Self::Left,
        }
    }
}

// ---------------------------------------------------------------------------
// Label
// ---------------------------------------------------------------------------

/// A widget that displays non-interactive text.
///
/// # Examples
///
/// ```
/// use reago::widgets::Label;
///
/// let label = Label::new("Hello, world!");
/// assert_eq!(label.text(), "Hello, world!");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Label {
    text: String,
    color: Option<Color>,
    size: f64,
    style: TextStyle,
    align: Align,
    hidden: bool,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Apply a color literal. Unparseable values keep the current color.
    pub fn set_color(&mut self, value: &str) {
        match parse_color(value) {
            Some(color) => self.color = Some(color),
            None => tracing::debug!(value, "ignoring unparseable color"),
        }
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn set_size(&mut self, size: f64) {
        self.size = size;
    }

    pub fn style(&self) -> TextStyle {
        self.style
    }

    pub fn set_style(&mut self, style: TextStyle) {
        self.style = style;
    }

    pub fn align(&self) -> Align {
        self.align
    }

    pub fn set_align(&mut self, align: Align) {
        self.align = align;
    }
}

impl Widget for Label {
    fn widget_type(&self) -> &str {
        "Label"
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }

    fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    fn describe(&self) -> String {
        let mut out = format!("{:?}", self.text);
        if let Some(color) = self.color {
            out.push_str(&format!(" color={color}"));
        }
        if self.style != TextStyle::Normal {
            out.push_str(&format!(" style={:?}", self.style));
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

/// Renderer for `<text>`.
pub fn render(node: NodeRef<'_>, document: &Document) -> Result<WidgetRef, DocumentError> {
    let label = shared(Label::default());

    document.bind_content(
        node,
        update_widget(&label, |label: &mut Label, text: &String| label.set_text(text.as_str())),
    )?;
    document.bind_string(
        node,
        "color",
        update_widget(&label, |label: &mut Label, value: &String| label.set_color(value)),
    )?;
    document.bind_float(
        node,
        "size",
        update_widget(&label, |label: &mut Label, size: &f64| label.set_size(*size)),
    )?;
    document.bind_string(
        node,
        "style",
        update_widget(&label, |label: &mut Label, value: &String| {
            label.set_style(TextStyle::parse(value))
        }),
    )?;
    document.bind_string(
        node,
        "align",
        update_widget(&label, |label: &mut Label, value: &String| {
            label.set_align(Align::parse(value))
        }),
    )?;

    Ok(label)
}
