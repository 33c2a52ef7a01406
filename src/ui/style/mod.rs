pub mod theme;

pub use theme::{Color, Theme};
