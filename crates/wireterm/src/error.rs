#![forbid(unsafe_code)]

//! Error type for screen construction and event posting.

use std::fmt;

/// Errors surfaced by the screen facade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenError {
    /// The terminal name matched no terminfo entry.
    UnknownTerminal(String),
    /// No charset codec could be resolved at init.
    NoCharset,
    /// The bounded event queue was full on a non-blocking post.
    EventQueueFull,
    /// The requested operation is not provided by this engine.
    NotSupported(&'static str),
}

impl fmt::Display for ScreenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTerminal(name) => write!(f, "unknown terminal type: {name}"),
            Self::NoCharset => write!(f, "no charset codec available"),
            Self::EventQueueFull => write!(f, "event queue full"),
            Self::NotSupported(what) => write!(f, "not supported: {what}"),
        }
    }
}

impl std::error::Error for ScreenError {}

impl From<wireterm_terminfo::UnknownTerminal> for ScreenError {
    fn from(err: wireterm_terminfo::UnknownTerminal) -> Self {
        Self::UnknownTerminal(err.0)
    }
}
