#![forbid(unsafe_code)]

//! Cell type and invariants.
//!
//! A cell holds a primary scalar, any combining scalars attached to it, a
//! style, and its display width (1 or 2). Alongside the current content it
//! keeps the *last emitted* snapshot; the dirty predicate is a comparison
//! of the two.
//!
//! # Invariants
//!
//! - `width` is 1 or 2; combining scalars never contribute to it.
//! - A `last` snapshot whose primary is `'\0'` means "never emitted" (or
//!   explicitly invalidated) and forces the cell dirty.
//! - The cell to the right of a width-2 cell is unpaintable; the buffer
//!   drops writes to it.

use unicode_width::UnicodeWidthChar;
use wireterm_style::Style;

/// Display width of a scalar in terminal columns, clamped to 1 or 2.
///
/// Combining marks and control characters report 1 here: a combining mark
/// written as a *primary* scalar still occupies the cell it lands in.
#[must_use]
pub fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(1).clamp(1, 2)
}

/// One grid position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Primary scalar.
    pub(crate) ch: char,
    /// Combining scalars attached to the primary.
    pub(crate) comb: Vec<char>,
    /// Style for the whole cell.
    pub(crate) style: Style,
    /// Display width in columns (1 or 2).
    pub(crate) width: u8,
    /// Last emitted primary; `'\0'` forces dirty.
    pub(crate) last_ch: char,
    /// Last emitted combining scalars.
    pub(crate) last_comb: Vec<char>,
    /// Last emitted style.
    pub(crate) last_style: Style,
}

impl Cell {
    /// A blank cell that has never been emitted.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            ch: ' ',
            comb: Vec::new(),
            style: Style::DEFAULT,
            width: 1,
            last_ch: '\0',
            last_comb: Vec::new(),
            last_style: Style::DEFAULT,
        }
    }

    /// Current content as `(primary, combining, style, width)`.
    #[must_use]
    pub fn content(&self) -> (char, &[char], Style, usize) {
        (self.ch, &self.comb, self.style, self.width as usize)
    }

    /// Whether this cell's content differs from its last emitted snapshot.
    #[must_use]
    pub fn dirty(&self) -> bool {
        self.last_ch == '\0'
            || self.last_ch != self.ch
            || self.last_style != self.style
            || self.last_comb != self.comb
    }

    /// Force or clear the dirty state.
    ///
    /// Forcing replaces the snapshot primary with `'\0'`; clearing records
    /// the current content as emitted.
    pub fn set_dirty(&mut self, dirty: bool) {
        if dirty {
            self.last_ch = '\0';
            self.last_comb.clear();
        } else {
            self.last_ch = self.ch;
            self.last_comb = self.comb.clone();
            self.last_style = self.style;
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wireterm_style::Color;

    #[test]
    fn blank_cell_is_dirty() {
        assert!(Cell::blank().dirty());
    }

    #[test]
    fn clearing_dirty_records_snapshot() {
        let mut cell = Cell::blank();
        cell.ch = 'x';
        cell.set_dirty(false);
        assert!(!cell.dirty());
        cell.ch = 'y';
        assert!(cell.dirty());
    }

    #[test]
    fn style_change_dirties() {
        let mut cell = Cell::blank();
        cell.set_dirty(false);
        cell.style = Style::DEFAULT.with_fg(Color::RED);
        assert!(cell.dirty());
    }

    #[test]
    fn combining_change_dirties() {
        let mut cell = Cell::blank();
        cell.ch = 'e';
        cell.set_dirty(false);
        cell.comb = vec!['\u{0301}'];
        assert!(cell.dirty());
    }

    #[test]
    fn widths() {
        assert_eq!(char_width('a'), 1);
        assert_eq!(char_width('世'), 2);
        // Combining mark as a primary still takes a column.
        assert_eq!(char_width('\u{0301}'), 1);
        assert_eq!(char_width('\u{7}'), 1);
    }
}
