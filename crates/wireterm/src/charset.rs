#![forbid(unsafe_code)]

//! Charset codecs.
//!
//! The engine talks to the terminal in its *wire charset*. An [`Encoding`]
//! converts one Unicode scalar at a time: outbound for the renderer
//! (falling back to ACS or replacement glyphs happens a layer up), inbound
//! for the rune matcher, which feeds it successively longer prefixes of the
//! input buffer and relies on [`Decoded::Incomplete`] to distinguish "need
//! more bytes" from "never going to decode".
//!
//! UTF-8 and US-ASCII ship built in. Embedders running against legacy
//! charsets register their own codec with [`register_encoding`] before
//! opening a screen.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use wireterm_terminfo::acs;

/// Outcome of decoding the head of a byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// A scalar decoded from the first `consumed` bytes.
    Char {
        /// The decoded scalar.
        ch: char,
        /// Bytes consumed from the head of the buffer.
        consumed: usize,
    },
    /// The buffer is a proper prefix of a valid sequence.
    Incomplete,
    /// The head bytes can never begin a valid sequence; skip `consumed`.
    Invalid {
        /// Bytes to discard.
        consumed: usize,
    },
}

/// A codec between Unicode scalars and the terminal's wire charset.
pub trait Encoding: Send + Sync {
    /// Canonical charset name.
    fn name(&self) -> &str;

    /// Encode `ch` into `out`. Returns false when the charset has no
    /// representation for it (nothing is written in that case).
    fn encode(&self, ch: char, out: &mut Vec<u8>) -> bool;

    /// Decode one scalar from the head of `src`. `src` is never empty.
    fn decode(&self, src: &[u8]) -> Decoded;
}

/// UTF-8, the default wire charset.
#[derive(Debug, Default)]
pub struct Utf8;

impl Encoding for Utf8 {
    fn name(&self) -> &str {
        "UTF-8"
    }

    fn encode(&self, ch: char, out: &mut Vec<u8>) -> bool {
        let mut buf = [0u8; 4];
        out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        true
    }

    fn decode(&self, src: &[u8]) -> Decoded {
        let lead = src[0];
        let need = match lead {
            0x00..=0x7F => 1,
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            // Continuation bytes and invalid leads.
            _ => return Decoded::Invalid { consumed: 1 },
        };
        if src.len() < need {
            // A truncated sequence is incomplete only while every byte so
            // far could still be part of one.
            if src[1..].iter().all(|b| (0x80..=0xBF).contains(b)) {
                return Decoded::Incomplete;
            }
            return Decoded::Invalid { consumed: 1 };
        }
        match std::str::from_utf8(&src[..need]) {
            Ok(s) => match s.chars().next() {
                Some(ch) => Decoded::Char { ch, consumed: need },
                None => Decoded::Invalid { consumed: 1 },
            },
            Err(_) => Decoded::Invalid { consumed: 1 },
        }
    }
}

/// US-ASCII: high bytes never decode and non-ASCII scalars never encode.
#[derive(Debug, Default)]
pub struct Ascii;

impl Encoding for Ascii {
    fn name(&self) -> &str {
        "US-ASCII"
    }

    fn encode(&self, ch: char, out: &mut Vec<u8>) -> bool {
        if ch.is_ascii() {
            out.push(ch as u8);
            true
        } else {
            false
        }
    }

    fn decode(&self, src: &[u8]) -> Decoded {
        let b = src[0];
        if b < 0x80 {
            Decoded::Char {
                ch: b as char,
                consumed: 1,
            }
        } else {
            Decoded::Invalid { consumed: 1 }
        }
    }
}

/// Normalize a charset name for lookup: lowercase, alphanumerics only.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

type Registry = RwLock<HashMap<String, Arc<dyn Encoding>>>;

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Register a codec for a charset name, replacing any previous entry.
pub fn register_encoding(name: &str, encoding: Arc<dyn Encoding>) {
    registry().write().insert(normalize(name), encoding);
}

/// Resolve a charset name against the built-ins and the registry.
#[must_use]
pub fn lookup_encoding(name: &str) -> Option<Arc<dyn Encoding>> {
    match normalize(name).as_str() {
        "utf8" => Some(Arc::new(Utf8)),
        "ascii" | "usascii" | "ansix341968" | "646" => Some(Arc::new(Ascii)),
        norm => registry().read().get(norm).cloned(),
    }
}

/// Default replacement strings for glyphs a charset cannot carry, keyed by
/// the rune. These cover the VT100 line-drawing and symbol set so plain
/// ASCII terminals still show a recognizable frame.
pub const DEFAULT_RUNE_FALLBACKS: &[(char, &str)] = &[
    (acs::STERLING, "f"),
    (acs::DARROW, "v"),
    (acs::LARROW, "<"),
    (acs::RARROW, ">"),
    (acs::UARROW, "^"),
    (acs::BULLET, "o"),
    (acs::BOARD, "#"),
    (acs::CKBOARD, ":"),
    (acs::DEGREE, "\\"),
    (acs::DIAMOND, "+"),
    (acs::GEQUAL, ">"),
    (acs::PI, "*"),
    (acs::HLINE, "-"),
    (acs::LANTERN, "#"),
    (acs::PLUS, "+"),
    (acs::LEQUAL, "<"),
    (acs::LLCORNER, "+"),
    (acs::LRCORNER, "+"),
    (acs::NEQUAL, "!"),
    (acs::PLMINUS, "#"),
    (acs::S1, "~"),
    (acs::S3, "-"),
    (acs::S7, "-"),
    (acs::S9, "_"),
    (acs::TTEE, "+"),
    (acs::RTEE, "+"),
    (acs::LTEE, "+"),
    (acs::BTEE, "+"),
    (acs::ULCORNER, "+"),
    (acs::URCORNER, "+"),
    (acs::VLINE, "|"),
];
