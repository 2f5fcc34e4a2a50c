#![forbid(unsafe_code)]

//! Input events.
//!
//! Everything the engine learns from the input byte stream (or from the
//! embedder, via `resize`/`post_event`) is delivered as an [`Event`].
//!
//! # Design Notes
//!
//! - Mouse coordinates are 0-indexed and always clipped to the screen.
//! - Mouse events are button-state reports: a wheel impulse arrives as a
//!   single event with `WheelUp`/`WheelDown`, a release as `MouseButton::None`.
//! - `KeyEvent::ch` carries the raw byte for single-byte key-table matches
//!   (control codes), mirroring what went over the wire.

use bitflags::bitflags;

use crate::error::ScreenError;

bitflags! {
    /// Modifier keys reported with a key or mouse event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Shift key.
        const SHIFT = 0b001;
        /// Alt/Meta key.
        const ALT = 0b010;
        /// Control key.
        const CTRL = 0b100;
    }
}

/// Key identities the parser can resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character.
    Char(char),
    /// NUL (Ctrl+Space / Ctrl+@).
    Null,
    /// Enter/Return.
    Enter,
    /// Escape.
    Escape,
    /// Backspace.
    Backspace,
    /// Tab.
    Tab,
    /// Shift+Tab.
    BackTab,
    /// Delete.
    Delete,
    /// Insert.
    Insert,
    /// Home.
    Home,
    /// End.
    End,
    /// Page Up.
    PageUp,
    /// Page Down.
    PageDown,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Function key (F1 is `F(1)`).
    F(u8),
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The resolved key.
    pub code: KeyCode,
    /// The scalar that produced the event, when a single byte did.
    pub ch: Option<char>,
    /// Modifiers, including `ALT` injected by a preceding lone ESC.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create a key event with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            ch: None,
            modifiers: Modifiers::empty(),
        }
    }

    /// Attach the originating scalar.
    #[must_use]
    pub const fn with_ch(mut self, ch: char) -> Self {
        self.ch = Some(ch);
        self
    }

    /// Attach modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Mouse button state carried by a [`MouseEvent`].
///
/// `None` means no button is held (motion or release). Wheel values are
/// impulses, not held buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// No button.
    None,
    /// Primary (usually left) button.
    Button1,
    /// Middle button.
    Button2,
    /// Secondary (usually right) button.
    Button3,
    /// Wheel scrolled up.
    WheelUp,
    /// Wheel scrolled down.
    WheelDown,
}

/// A mouse event, coordinates clipped to the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// Column, 0-indexed.
    pub x: usize,
    /// Row, 0-indexed.
    pub y: usize,
    /// Button state.
    pub button: MouseButton,
    /// Modifiers held during the event.
    pub modifiers: Modifiers,
}

/// An event delivered through [`crate::Screen::poll_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A keyboard event.
    Key(KeyEvent),
    /// A mouse event.
    Mouse(MouseEvent),
    /// The screen was resized.
    Resize {
        /// New width in columns.
        width: usize,
        /// New height in rows.
        height: usize,
    },
    /// An interrupt posted by the embedder.
    Interrupt,
    /// An error report.
    Error(ScreenError),
}
