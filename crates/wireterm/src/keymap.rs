#![forbid(unsafe_code)]

//! The key code table.
//!
//! Maps byte-sequence prefixes to `(KeyCode, Modifiers)`. The table is
//! built once per screen from the terminfo entry:
//!
//! 1. terminfo key capabilities, plain then modified variants;
//! 2. fixed xterm fallback sequences, only when the entry advertises
//!    keypad application mode (xterm key reporting varies with that mode
//!    and many terminfo entries omit half the sequences);
//! 3. one-byte entries for the control codes `0x00..0x20`, except any
//!    byte that already begins a registered multi-byte sequence. That
//!    exception is what keeps a lone ESC ambiguous long enough for the
//!    escape-sequence matchers to run.
//!
//! Registration never overrides an existing sequence.

use std::collections::HashSet;

use wireterm_terminfo::Terminfo;

use crate::event::{KeyCode, Modifiers};

/// One table entry.
#[derive(Debug, Clone)]
pub struct KeyEntry {
    /// The byte sequence the terminal sends.
    pub seq: Vec<u8>,
    /// The key it means.
    pub code: KeyCode,
    /// Modifiers implied by the sequence itself.
    pub mods: Modifiers,
}

/// The prefix table, in registration order.
#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    entries: Vec<KeyEntry>,
    known: HashSet<KeyCode>,
}

/// Order of the modified-key capability arrays in [`Terminfo`].
const MODIFIED_ORDER: [KeyCode; 6] = [
    KeyCode::Up,
    KeyCode::Down,
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::Home,
    KeyCode::End,
];

impl KeyMap {
    /// Build the table for a terminfo entry.
    #[must_use]
    pub fn new(ti: &Terminfo) -> Self {
        let mut map = Self::default();

        map.register(&ti.key_backspace, KeyCode::Backspace, Modifiers::empty());
        for (i, cap) in ti.key_f.iter().enumerate() {
            map.register(cap, KeyCode::F(i as u8 + 1), Modifiers::empty());
        }
        map.register(&ti.key_insert, KeyCode::Insert, Modifiers::empty());
        map.register(&ti.key_delete, KeyCode::Delete, Modifiers::empty());
        map.register(&ti.key_home, KeyCode::Home, Modifiers::empty());
        map.register(&ti.key_end, KeyCode::End, Modifiers::empty());
        map.register(&ti.key_up, KeyCode::Up, Modifiers::empty());
        map.register(&ti.key_down, KeyCode::Down, Modifiers::empty());
        map.register(&ti.key_left, KeyCode::Left, Modifiers::empty());
        map.register(&ti.key_right, KeyCode::Right, Modifiers::empty());
        map.register(&ti.key_page_up, KeyCode::PageUp, Modifiers::empty());
        map.register(&ti.key_page_down, KeyCode::PageDown, Modifiers::empty());
        map.register(&ti.key_backtab, KeyCode::BackTab, Modifiers::empty());

        let modified: [(&[String; 6], Modifiers); 5] = [
            (&ti.key_shift, Modifiers::SHIFT),
            (&ti.key_ctrl, Modifiers::CTRL),
            (&ti.key_alt, Modifiers::ALT),
            (&ti.key_shift_alt, Modifiers::SHIFT | Modifiers::ALT),
            (&ti.key_ctrl_shift, Modifiers::CTRL | Modifiers::SHIFT),
        ];
        for (caps, mods) in modified {
            for (cap, code) in caps.iter().zip(MODIFIED_ORDER) {
                map.register(cap, code, mods);
            }
        }

        if !ti.enter_keypad.is_empty() {
            map.register_xterm_fallbacks();
        }
        map.register_control_codes();

        map
    }

    /// The entries, in registration order.
    #[must_use]
    pub fn entries(&self) -> &[KeyEntry] {
        &self.entries
    }

    /// Whether the table can produce this key at all.
    #[must_use]
    pub fn has_key(&self, code: KeyCode) -> bool {
        matches!(code, KeyCode::Char(_)) || self.known.contains(&code)
    }

    fn register(&mut self, seq: &str, code: KeyCode, mods: Modifiers) {
        if seq.is_empty() {
            return;
        }
        let seq = seq.as_bytes();
        if self.entries.iter().any(|e| e.seq == seq) {
            return;
        }
        self.known.insert(code);
        self.entries.push(KeyEntry {
            seq: seq.to_vec(),
            code,
            mods,
        });
    }

    /// Cursor-mode and application-mode sequences xterm sends regardless
    /// of what the terminfo entry admits to.
    fn register_xterm_fallbacks(&mut self) {
        let none = Modifiers::empty();
        self.register("\x1b[A", KeyCode::Up, none);
        self.register("\x1b[B", KeyCode::Down, none);
        self.register("\x1b[C", KeyCode::Right, none);
        self.register("\x1b[D", KeyCode::Left, none);
        self.register("\x1b[F", KeyCode::End, none);
        self.register("\x1b[H", KeyCode::Home, none);
        self.register("\x1b[3~", KeyCode::Delete, none);
        self.register("\x1b[1~", KeyCode::Home, none);
        self.register("\x1b[4~", KeyCode::End, none);
        self.register("\x1b[5~", KeyCode::PageUp, none);
        self.register("\x1b[6~", KeyCode::PageDown, none);

        self.register("\x1bOA", KeyCode::Up, none);
        self.register("\x1bOB", KeyCode::Down, none);
        self.register("\x1bOC", KeyCode::Right, none);
        self.register("\x1bOD", KeyCode::Left, none);
        self.register("\x1bOH", KeyCode::Home, none);
    }

    /// One-byte entries for `0x00..0x20`, minus bytes that open a
    /// registered multi-byte sequence.
    fn register_control_codes(&mut self) {
        for byte in 0u8..0x20 {
            let taken = self
                .entries
                .iter()
                .any(|e| e.seq.len() > 1 && e.seq[0] == byte);
            if taken {
                continue;
            }
            let (code, mods) = control_key(byte);
            let seq = [byte];
            if self.entries.iter().any(|e| e.seq == seq) {
                continue;
            }
            self.known.insert(code);
            self.entries.push(KeyEntry {
                seq: seq.to_vec(),
                code,
                mods,
            });
        }
    }
}

/// The key identity of a control byte.
///
/// BS, TAB, CR, and ESC are directly typeable and carry no modifier; the
/// rest report as Ctrl plus the letter or punctuation they alias.
fn control_key(byte: u8) -> (KeyCode, Modifiers) {
    match byte {
        0x00 => (KeyCode::Null, Modifiers::CTRL),
        0x08 => (KeyCode::Backspace, Modifiers::empty()),
        0x09 => (KeyCode::Tab, Modifiers::empty()),
        0x0D => (KeyCode::Enter, Modifiers::empty()),
        0x1B => (KeyCode::Escape, Modifiers::empty()),
        0x01..=0x1A => (KeyCode::Char((byte + b'a' - 1) as char), Modifiers::CTRL),
        // 0x1C..=0x1F alias the punctuation at byte + 0x40.
        _ => (KeyCode::Char((byte + 0x40) as char), Modifiers::CTRL),
    }
}
