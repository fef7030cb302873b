//! Built-in widgets and the renderers that build them from markup:
//! Label (`<text>`), Stack (`<row>`, `<col>`), Button, Input, List and the
//! Placeholder shown for markup that cannot be rendered.

pub mod button;
pub mod input;
pub mod label;
pub mod list;
pub mod placeholder;
pub mod stack;

pub use button::Button;
pub use input::Input;
pub use label::{parse_color, Align, Color, Label, TextStyle};
pub use list::{List, ListRow};
pub use placeholder::Placeholder;
pub use stack::{Direction, Stack};
