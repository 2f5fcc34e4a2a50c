#![forbid(unsafe_code)]

//! Terminfo capability records for the wireterm screen engine.
//!
//! A [`Terminfo`] is a plain record of named capability strings; the engine
//! formats the parameterized ones with [`Terminfo::tparm`] and writes them
//! through [`Terminfo::tputs`]. Records come from the built-in database
//! ([`Terminfo::lookup`], xterm family) or are constructed directly by
//! embedders that carry their own entries.
//!
//! An empty capability string means the terminal does not support the
//! corresponding action; callers skip emission in that case.

pub mod acs;
pub mod param;

use std::fmt;

pub use param::{tparm, tputs, Param};

/// Lookup failure: the name matched no database entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTerminal(pub String);

impl fmt::Display for UnknownTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown terminal type: {}", self.0)
    }
}

impl std::error::Error for UnknownTerminal {}

/// A terminfo entry, reduced to the capabilities the engine uses.
#[derive(Debug, Clone, Default)]
pub struct Terminfo {
    /// Primary entry name.
    pub name: String,
    /// Number of palette colors (0 means no color support).
    pub colors: usize,

    /// Clear screen and home the cursor.
    pub clear: String,
    /// Enter cursor-addressing (alternate screen) mode.
    pub enter_ca: String,
    /// Leave cursor-addressing mode.
    pub exit_ca: String,
    /// Make the cursor visible.
    pub show_cursor: String,
    /// Make the cursor invisible.
    pub hide_cursor: String,
    /// Reset all attributes and colors.
    pub attr_off: String,
    /// Enter bold mode.
    pub bold: String,
    /// Enter underline mode.
    pub underline: String,
    /// Enter reverse-video mode.
    pub reverse: String,
    /// Enter blink mode.
    pub blink: String,
    /// Enter dim mode.
    pub dim: String,
    /// Enter keypad-transmit (application) mode.
    pub enter_keypad: String,
    /// Leave keypad-transmit mode.
    pub exit_keypad: String,

    /// Move the cursor; parameters are row then column (`tgoto` flips).
    pub set_cursor: String,
    /// Set the foreground palette color (one parameter).
    pub set_fg: String,
    /// Set the background palette color (one parameter).
    pub set_bg: String,
    /// Set both palette colors (two parameters).
    pub set_fg_bg: String,
    /// Set the foreground as RGB (three parameters).
    pub set_fg_rgb: String,
    /// Set the background as RGB (three parameters).
    pub set_bg_rgb: String,
    /// Set both colors as RGB (six parameters).
    pub set_fg_bg_rgb: String,

    /// Mouse report introducer; non-empty means the terminal has a mouse.
    pub mouse: String,
    /// Parameterized mouse-mode switch (1 enables, 0 disables).
    pub mouse_mode: String,

    /// Prepare the alternate character set.
    pub enable_acs: String,
    /// Shift into the alternate character set.
    pub enter_acs: String,
    /// Shift out of the alternate character set.
    pub exit_acs: String,
    /// ACS definition string: pairs of (VT100 name byte, output byte).
    pub alt_chars: String,

    /// Backspace key.
    pub key_backspace: String,
    /// Function keys, F1 first.
    pub key_f: Vec<String>,
    /// Insert key.
    pub key_insert: String,
    /// Delete key.
    pub key_delete: String,
    /// Home key.
    pub key_home: String,
    /// End key.
    pub key_end: String,
    /// Page-up key.
    pub key_page_up: String,
    /// Page-down key.
    pub key_page_down: String,
    /// Up arrow.
    pub key_up: String,
    /// Down arrow.
    pub key_down: String,
    /// Left arrow.
    pub key_left: String,
    /// Right arrow.
    pub key_right: String,
    /// Shift-Tab.
    pub key_backtab: String,

    /// Shift-modified arrows and Home/End: up, down, left, right, home, end.
    pub key_shift: [String; 6],
    /// Ctrl-modified arrows and Home/End, same order.
    pub key_ctrl: [String; 6],
    /// Alt-modified arrows and Home/End, same order.
    pub key_alt: [String; 6],
    /// Shift+Alt-modified arrows and Home/End, same order.
    pub key_shift_alt: [String; 6],
    /// Ctrl+Shift-modified arrows and Home/End, same order.
    pub key_ctrl_shift: [String; 6],
}

impl Terminfo {
    /// Resolve a named entry from the built-in database.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownTerminal`] when the name matches no entry. There is
    /// no fallback entry; the engine refuses to guess at capabilities.
    pub fn lookup(name: &str) -> Result<Self, UnknownTerminal> {
        match name {
            "xterm" | "xterm-color" => Ok(Self::xterm(8)),
            "xterm-88color" => Ok(Self::xterm(88)),
            "xterm-256color" => Ok(Self::xterm(256)),
            "xterm-truecolor" | "xterm-direct" => {
                let mut ti = Self::xterm(256);
                ti.name = name.to_string();
                ti.set_fg_rgb = "\x1b[38;2;%p1%d;%p2%d;%p3%dm".into();
                ti.set_bg_rgb = "\x1b[48;2;%p1%d;%p2%d;%p3%dm".into();
                ti.set_fg_bg_rgb =
                    "\x1b[38;2;%p1%d;%p2%d;%p3%d;48;2;%p4%d;%p5%d;%p6%dm".into();
                Ok(ti)
            }
            _ => Err(UnknownTerminal(name.to_string())),
        }
    }

    /// Format a parameterized capability. See [`param::tparm`].
    #[must_use]
    pub fn tparm(&self, cap: &str, params: &[Param]) -> String {
        param::tparm(cap, params)
    }

    /// Format a cursor move to column `x`, row `y` (0-based).
    #[must_use]
    pub fn tgoto(&self, x: usize, y: usize) -> String {
        param::tparm(
            &self.set_cursor,
            &[Param::from(y as i64), Param::from(x as i64)],
        )
    }

    /// Write a capability string to `out`, stripping `$<ms>` padding.
    /// See [`param::tputs`].
    pub fn tputs(
        &self,
        out: &mut dyn std::io::Write,
        s: &str,
        baud: usize,
    ) -> std::io::Result<()> {
        param::tputs(out, s, baud)
    }

    fn xterm(colors: usize) -> Self {
        let mut ti = Self {
            name: match colors {
                256 => "xterm-256color".into(),
                88 => "xterm-88color".into(),
                _ => "xterm".into(),
            },
            colors,
            clear: "\x1b[H\x1b[2J".into(),
            enter_ca: "\x1b[?1049h".into(),
            exit_ca: "\x1b[?1049l".into(),
            show_cursor: "\x1b[?12l\x1b[?25h".into(),
            hide_cursor: "\x1b[?25l".into(),
            attr_off: "\x1b(B\x1b[m".into(),
            bold: "\x1b[1m".into(),
            underline: "\x1b[4m".into(),
            reverse: "\x1b[7m".into(),
            blink: "\x1b[5m".into(),
            dim: "\x1b[2m".into(),
            enter_keypad: "\x1b[?1h\x1b=".into(),
            exit_keypad: "\x1b[?1l\x1b>".into(),
            set_cursor: "\x1b[%i%p1%d;%p2%dH".into(),
            mouse: "\x1b[M".into(),
            mouse_mode: "\x1b[?1000;1002;1006%?%p1%th%el%;".into(),
            enable_acs: "\x1b(B\x1b)0".into(),
            enter_acs: "\x0e".into(),
            exit_acs: "\x0f".into(),
            alt_chars: "``aaffggiijjkkllmmnnooppqqrrssttuuvvwwxxyyzz{{||}}~~".into(),
            key_backspace: "\u{7f}".into(),
            key_f: [
                "\x1bOP", "\x1bOQ", "\x1bOR", "\x1bOS", "\x1b[15~", "\x1b[17~", "\x1b[18~",
                "\x1b[19~", "\x1b[20~", "\x1b[21~", "\x1b[23~", "\x1b[24~",
            ]
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
            key_insert: "\x1b[2~".into(),
            key_delete: "\x1b[3~".into(),
            key_home: "\x1bOH".into(),
            key_end: "\x1bOF".into(),
            key_page_up: "\x1b[5~".into(),
            key_page_down: "\x1b[6~".into(),
            key_up: "\x1bOA".into(),
            key_down: "\x1bOB".into(),
            key_left: "\x1bOD".into(),
            key_right: "\x1bOC".into(),
            key_backtab: "\x1b[Z".into(),
            key_shift: modified_keys(2),
            key_ctrl: modified_keys(5),
            key_alt: modified_keys(3),
            key_shift_alt: modified_keys(4),
            key_ctrl_shift: modified_keys(6),
            ..Self::default()
        };
        if colors >= 88 {
            ti.set_fg =
                "\x1b[%?%p1%{8}%<%t3%p1%d%e%p1%{16}%<%t9%p1%{8}%-%d%e38;5;%p1%d%;m".into();
            ti.set_bg =
                "\x1b[%?%p1%{8}%<%t4%p1%d%e%p1%{16}%<%t10%p1%{8}%-%d%e48;5;%p1%d%;m".into();
            ti.set_fg_bg = "\x1b[%?%p1%{8}%<%t3%p1%d%e%p1%{16}%<%t9%p1%{8}%-%d%e38;5;%p1%d%;;%?%p2%{8}%<%t4%p2%d%e%p2%{16}%<%t10%p2%{8}%-%d%e48;5;%p2%d%;m".into();
        } else {
            ti.set_fg = "\x1b[3%p1%dm".into();
            ti.set_bg = "\x1b[4%p1%dm".into();
            ti.set_fg_bg = "\x1b[3%p1%d;4%p2%dm".into();
        }
        ti
    }
}

/// xterm modified-key sequences for one modifier code, in the order
/// up, down, left, right, home, end.
fn modified_keys(modifier: u8) -> [String; 6] {
    let seq = |fin: char| format!("\x1b[1;{modifier}{fin}");
    [
        seq('A'),
        seq('B'),
        seq('D'),
        seq('C'),
        seq('H'),
        seq('F'),
    ]
}
