//! Widget system: the trait every built-in and host widget implements.

pub mod traits;

pub use traits::{shared, with_widget, with_widget_mut, Widget, WidgetRef};
