#![forbid(unsafe_code)]

//! Color and style model for the wireterm screen engine.

pub mod color;
pub mod style;

pub use color::{find_color, palette_rgb, Color};
pub use style::{Attrs, Style};
