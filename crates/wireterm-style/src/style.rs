#![forbid(unsafe_code)]

//! Styles: a foreground color, a background color, and an attribute set.
//!
//! `Style` is a value type with fluent builders. [`Style::DEFAULT`] is a
//! sentinel meaning "inherit the screen's default style"; the renderer
//! substitutes the screen style for it at draw time, so a cell written with
//! `Style::DEFAULT` follows later `set_style` calls.

use bitflags::bitflags;

use crate::color::Color;

bitflags! {
    /// Display attributes applied to a cell.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attrs: u8 {
        /// Bold (increased intensity).
        const BOLD = 0b0000_0001;
        /// Underline.
        const UNDERLINE = 0b0000_0010;
        /// Reverse video.
        const REVERSE = 0b0000_0100;
        /// Blink.
        const BLINK = 0b0000_1000;
        /// Dim (decreased intensity).
        const DIM = 0b0001_0000;
    }
}

/// A composed style: `(fg, bg, attrs)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    fg: Color,
    bg: Color,
    attrs: Attrs,
}

impl Style {
    /// The inherit-screen-default sentinel.
    pub const DEFAULT: Self = Self {
        fg: Color::Default,
        bg: Color::Default,
        attrs: Attrs::empty(),
    };

    /// Create a style with the given colors and no attributes.
    #[must_use]
    pub const fn new(fg: Color, bg: Color) -> Self {
        Self {
            fg,
            bg,
            attrs: Attrs::empty(),
        }
    }

    /// Replace the foreground color.
    #[must_use]
    pub const fn with_fg(mut self, fg: Color) -> Self {
        self.fg = fg;
        self
    }

    /// Replace the background color.
    #[must_use]
    pub const fn with_bg(mut self, bg: Color) -> Self {
        self.bg = bg;
        self
    }

    /// Replace the attribute set.
    #[must_use]
    pub const fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    /// Add `attrs` to the attribute set.
    #[must_use]
    pub fn with_attrs_added(mut self, attrs: Attrs) -> Self {
        self.attrs |= attrs;
        self
    }

    /// Toggle bold.
    #[must_use]
    pub fn bold(self, on: bool) -> Self {
        self.toggle(Attrs::BOLD, on)
    }

    /// Toggle underline.
    #[must_use]
    pub fn underline(self, on: bool) -> Self {
        self.toggle(Attrs::UNDERLINE, on)
    }

    /// Toggle reverse video.
    #[must_use]
    pub fn reverse(self, on: bool) -> Self {
        self.toggle(Attrs::REVERSE, on)
    }

    /// Toggle blink.
    #[must_use]
    pub fn blink(self, on: bool) -> Self {
        self.toggle(Attrs::BLINK, on)
    }

    /// Toggle dim.
    #[must_use]
    pub fn dim(self, on: bool) -> Self {
        self.toggle(Attrs::DIM, on)
    }

    fn toggle(mut self, attr: Attrs, on: bool) -> Self {
        self.attrs.set(attr, on);
        self
    }

    /// Decompose into `(fg, bg, attrs)`.
    #[must_use]
    pub const fn decompose(self) -> (Color, Color, Attrs) {
        (self.fg, self.bg, self.attrs)
    }

    /// The foreground color.
    #[must_use]
    pub const fn fg(self) -> Color {
        self.fg
    }

    /// The background color.
    #[must_use]
    pub const fn bg(self) -> Color {
        self.bg
    }

    /// The attribute set.
    #[must_use]
    pub const fn attrs(self) -> Attrs {
        self.attrs
    }
}
