#![forbid(unsafe_code)]

//! Color values and palette resolution.
//!
//! A [`Color`] is either the terminal's configured default, an index into
//! the terminal palette, or a 24-bit RGB value. Whether palette indices or
//! RGB values reach the wire is decided by the screen, based on the
//! capabilities of the terminfo entry it was opened with; the types here
//! carry no notion of the active profile.

/// A color value.
///
/// `Default` means "whatever the terminal's default is" and is never
/// resolved through the palette; emitters skip the corresponding channel
/// entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// The terminal's own default color.
    #[default]
    Default,

    /// An index into the terminal palette (0-255).
    Palette(u8),

    /// A 24-bit RGB value.
    Rgb(u8, u8, u8),
}

impl Color {
    /// Black (palette index 0).
    pub const BLACK: Self = Self::Palette(0);
    /// Red (palette index 1).
    pub const RED: Self = Self::Palette(1);
    /// Green (palette index 2).
    pub const GREEN: Self = Self::Palette(2);
    /// Yellow (palette index 3).
    pub const YELLOW: Self = Self::Palette(3);
    /// Blue (palette index 4).
    pub const BLUE: Self = Self::Palette(4);
    /// Magenta (palette index 5).
    pub const MAGENTA: Self = Self::Palette(5);
    /// Cyan (palette index 6).
    pub const CYAN: Self = Self::Palette(6);
    /// White (palette index 7).
    pub const WHITE: Self = Self::Palette(7);

    /// Create a true-color RGB value.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::Rgb(r, g, b)
    }

    /// Check whether this is the terminal-default sentinel.
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }

    /// Resolve this color to an RGB triplet.
    ///
    /// Palette indices resolve through the standard xterm 256-entry table.
    /// `Default` resolves to black; callers that care about the distinction
    /// check [`Color::is_default`] first.
    #[must_use]
    pub fn to_rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Default => (0, 0, 0),
            Self::Palette(idx) => palette_rgb(idx),
            Self::Rgb(r, g, b) => (r, g, b),
        }
    }

    /// The palette index, if this is a palette color.
    #[must_use]
    pub const fn palette_index(self) -> Option<u8> {
        match self {
            Self::Palette(idx) => Some(idx),
            _ => None,
        }
    }
}

/// Canonical RGB values for the 16 base palette entries.
const BASE16_RGB: [(u8, u8, u8); 16] = [
    (0, 0, 0),       // black
    (205, 0, 0),     // red
    (0, 205, 0),     // green
    (205, 205, 0),   // yellow
    (0, 0, 238),     // blue
    (205, 0, 205),   // magenta
    (0, 205, 205),   // cyan
    (229, 229, 229), // white
    (127, 127, 127), // bright black
    (255, 0, 0),     // bright red
    (0, 255, 0),     // bright green
    (255, 255, 0),   // bright yellow
    (92, 92, 255),   // bright blue
    (255, 0, 255),   // bright magenta
    (0, 255, 255),   // bright cyan
    (255, 255, 255), // bright white
];

/// Resolve a palette index to its canonical RGB value.
///
/// Indices 0-15 use the base palette, 16-231 the 6×6×6 color cube, and
/// 232-255 the 24-step grayscale ramp.
#[must_use]
pub fn palette_rgb(index: u8) -> (u8, u8, u8) {
    if index < 16 {
        return BASE16_RGB[index as usize];
    }
    if index >= 232 {
        let gray = 8 + 10 * (index - 232);
        return (gray, gray, gray);
    }
    let idx = index - 16;
    let r = idx / 36;
    let g = (idx / 6) % 6;
    let b = idx % 6;
    const LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];
    (LEVELS[r as usize], LEVELS[g as usize], LEVELS[b as usize])
}

/// Find the palette color closest to `color`.
///
/// The scan is deterministic: palette entries are visited in order and a
/// candidate wins only by being strictly closer, so ties resolve to the
/// lowest index. Screens memoize the result per requested color, which
/// keeps the mapping stable for the life of a session.
#[must_use]
pub fn find_color(color: Color, palette: &[Color]) -> Color {
    if palette.is_empty() {
        return Color::Default;
    }
    let target = color.to_rgb();
    let mut best = palette[0];
    let mut best_dist = u64::MAX;
    for &candidate in palette {
        let dist = weighted_distance(target, candidate.to_rgb());
        if dist < best_dist {
            best = candidate;
            best_dist = dist;
        }
    }
    best
}

fn weighted_distance(a: (u8, u8, u8), b: (u8, u8, u8)) -> u64 {
    // ITU-R BT.709 luma weights, applied to squared channel deltas.
    let dr = a.0 as i32 - b.0 as i32;
    let dg = a.1 as i32 - b.1 as i32;
    let db = a.2 as i32 - b.2 as i32;
    2126 * (dr * dr) as u64 + 7152 * (dg * dg) as u64 + 722 * (db * db) as u64
}
