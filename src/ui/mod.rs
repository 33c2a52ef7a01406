pub mod elements;
pub mod labels;
pub mod layout;
pub mod style;

pub use elements::{render, render_all, Element, ElementKind, Primitive};
pub use layout::EditorLayout;
pub use style::Theme;
