#![forbid(unsafe_code)]

//! The cell grid.
//!
//! Cells are stored in row-major order: `index = y * width + x`.
//!
//! # Invariants
//!
//! 1. `cells.len() == width * height` at all times.
//! 2. `resize` preserves the overlapping region's content and marks every
//!    surviving cell dirty; new cells start blank and dirty.
//! 3. Writes to the right half of a wide cell are dropped.
//! 4. A width-2 scalar written in the last column is demoted to width 1.

use wireterm_style::Style;

use crate::cell::{char_width, Cell};

/// A 2D grid of [`Cell`]s with per-cell dirty tracking.
#[derive(Debug, Clone, Default)]
pub struct CellBuffer {
    w: usize,
    h: usize,
    cells: Vec<Cell>,
}

impl CellBuffer {
    /// Create a buffer of the given size, all cells blank and dirty.
    #[must_use]
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::blank(); w * h],
        }
    }

    /// Buffer size as `(width, height)`.
    #[must_use]
    pub fn size(&self) -> (usize, usize) {
        (self.w, self.h)
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.w && y < self.h).then(|| y * self.w + x)
    }

    /// Write a cell.
    ///
    /// The write is dropped when `(x, y)` is out of bounds or falls on the
    /// right half of a wide cell. A wide scalar that would overhang the
    /// last column is stored with width 1. Dirtiness follows from the
    /// comparison against the last emitted snapshot, so rewriting identical
    /// content does not dirty the cell.
    pub fn set_content(&mut self, x: usize, y: usize, ch: char, comb: &[char], style: Style) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        if x > 0 {
            if let Some(left) = self.index(x - 1, y) {
                if self.cells[left].width == 2 {
                    return;
                }
            }
        }
        let mut width = char_width(ch);
        if width == 2 && x == self.w - 1 {
            width = 1;
        }
        let cell = &mut self.cells[idx];
        cell.ch = ch;
        cell.comb = comb.to_vec();
        cell.style = style;
        cell.width = width as u8;
    }

    /// Read a cell as `(primary, combining, style, width)`.
    ///
    /// Out-of-bounds reads return a blank default.
    #[must_use]
    pub fn get_content(&self, x: usize, y: usize) -> (char, Vec<char>, Style, usize) {
        match self.index(x, y) {
            Some(idx) => {
                let cell = &self.cells[idx];
                (
                    cell.ch,
                    cell.comb.clone(),
                    cell.style,
                    cell.width as usize,
                )
            }
            None => (' ', Vec::new(), Style::DEFAULT, 1),
        }
    }

    /// Whether the cell differs from its last emitted snapshot.
    ///
    /// Out-of-bounds queries are `false`.
    #[must_use]
    pub fn dirty(&self, x: usize, y: usize) -> bool {
        self.index(x, y)
            .is_some_and(|idx| self.cells[idx].dirty())
    }

    /// Force or clear one cell's dirty state.
    pub fn set_dirty(&mut self, x: usize, y: usize, dirty: bool) {
        if let Some(idx) = self.index(x, y) {
            self.cells[idx].set_dirty(dirty);
        }
    }

    /// Overwrite every cell with `ch` in `style`, marking all dirty.
    pub fn fill(&mut self, ch: char, style: Style) {
        let width = char_width(ch) as u8;
        for cell in &mut self.cells {
            cell.ch = ch;
            cell.comb.clear();
            cell.style = style;
            cell.width = width;
        }
    }

    /// Mark every cell dirty without touching content.
    pub fn invalidate(&mut self) {
        for cell in &mut self.cells {
            cell.set_dirty(true);
        }
    }

    /// Resize the grid, preserving the overlapping region.
    ///
    /// Surviving cells keep their content but are marked dirty (the next
    /// draw repaints everything); new cells start blank and dirty.
    pub fn resize(&mut self, w: usize, h: usize) {
        if w == self.w && h == self.h {
            return;
        }
        let mut cells = vec![Cell::blank(); w * h];
        for y in 0..h.min(self.h) {
            for x in 0..w.min(self.w) {
                let mut cell = self.cells[y * self.w + x].clone();
                cell.set_dirty(true);
                cells[y * w + x] = cell;
            }
        }
        self.w = w;
        self.h = h;
        self.cells = cells;
    }
}
