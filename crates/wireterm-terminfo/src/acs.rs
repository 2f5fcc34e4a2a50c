#![forbid(unsafe_code)]

//! VT100 alternate character set names.
//!
//! An `alt_chars` capability is a flat sequence of byte pairs: a VT100
//! name byte and the byte the terminal wants on the wire for it. The table
//! here maps each name byte to the Unicode glyph it draws, so the engine
//! can translate Unicode content back into ACS escape sequences on
//! terminals that cannot take the Unicode directly.

/// Diamond.
pub const DIAMOND: char = '◆';
/// Checkerboard (stipple).
pub const CKBOARD: char = '▒';
/// Degree sign.
pub const DEGREE: char = '°';
/// Plus/minus.
pub const PLMINUS: char = '±';
/// Board of squares.
pub const BOARD: char = '░';
/// Lantern symbol.
pub const LANTERN: char = '§';
/// Lower-right corner.
pub const LRCORNER: char = '┘';
/// Upper-right corner.
pub const URCORNER: char = '┐';
/// Upper-left corner.
pub const ULCORNER: char = '┌';
/// Lower-left corner.
pub const LLCORNER: char = '└';
/// Crossover (plus).
pub const PLUS: char = '┼';
/// Scan line 1.
pub const S1: char = '⎺';
/// Scan line 3.
pub const S3: char = '⎻';
/// Horizontal line.
pub const HLINE: char = '─';
/// Scan line 7.
pub const S7: char = '⎼';
/// Scan line 9.
pub const S9: char = '⎽';
/// Left tee.
pub const LTEE: char = '├';
/// Right tee.
pub const RTEE: char = '┤';
/// Bottom tee.
pub const BTEE: char = '┴';
/// Top tee.
pub const TTEE: char = '┬';
/// Vertical line.
pub const VLINE: char = '│';
/// Less than or equal.
pub const LEQUAL: char = '≤';
/// Greater than or equal.
pub const GEQUAL: char = '≥';
/// Pi.
pub const PI: char = 'π';
/// Not equal.
pub const NEQUAL: char = '≠';
/// Sterling (pound).
pub const STERLING: char = '£';
/// Bullet.
pub const BULLET: char = '·';
/// Right arrow.
pub const RARROW: char = '→';
/// Left arrow.
pub const LARROW: char = '←';
/// Up arrow.
pub const UARROW: char = '↑';
/// Down arrow.
pub const DARROW: char = '↓';
/// Solid block.
pub const BLOCK: char = '█';

/// The VT100 name-byte to glyph table.
pub const VT100_ACS_NAMES: &[(u8, char)] = &[
    (b'+', RARROW),
    (b',', LARROW),
    (b'-', UARROW),
    (b'.', DARROW),
    (b'0', BLOCK),
    (b'`', DIAMOND),
    (b'a', CKBOARD),
    (b'f', DEGREE),
    (b'g', PLMINUS),
    (b'h', BOARD),
    (b'i', LANTERN),
    (b'j', LRCORNER),
    (b'k', URCORNER),
    (b'l', ULCORNER),
    (b'm', LLCORNER),
    (b'n', PLUS),
    (b'o', S1),
    (b'p', S3),
    (b'q', HLINE),
    (b'r', S7),
    (b's', S9),
    (b't', LTEE),
    (b'u', RTEE),
    (b'v', BTEE),
    (b'w', TTEE),
    (b'x', VLINE),
    (b'y', LEQUAL),
    (b'z', GEQUAL),
    (b'{', PI),
    (b'|', NEQUAL),
    (b'}', STERLING),
    (b'~', BULLET),
];

/// Look up the glyph a VT100 ACS name byte draws.
#[must_use]
pub fn vt100_glyph(name: u8) -> Option<char> {
    VT100_ACS_NAMES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, glyph)| *glyph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_resolve() {
        assert_eq!(vt100_glyph(b'q'), Some(HLINE));
        assert_eq!(vt100_glyph(b'x'), Some(VLINE));
        assert_eq!(vt100_glyph(b'l'), Some(ULCORNER));
    }

    #[test]
    fn unknown_names_are_none() {
        assert_eq!(vt100_glyph(b'Q'), None);
        assert_eq!(vt100_glyph(0), None);
    }

    #[test]
    fn names_are_unique() {
        for (i, (a, _)) in VT100_ACS_NAMES.iter().enumerate() {
            for (b, _) in &VT100_ACS_NAMES[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
