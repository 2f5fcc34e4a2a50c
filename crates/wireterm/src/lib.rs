#![forbid(unsafe_code)]

//! wireterm: a detached terminal screen engine.
//!
//! Maintains an in-memory grid of styled cells, renders differential
//! updates as terminfo-encoded bytes to an arbitrary output sink, and
//! parses an arbitrary input byte stream into key/mouse/resize events.
//! Neither endpoint is a TTY: both are plain byte streams, which is what
//! lets a session be served to a pty, a socket, or an in-memory pipe
//! feeding a remote client.
//!
//! ```no_run
//! use wireterm::{Color, Screen, ScreenOptions, Style};
//!
//! # fn main() -> Result<(), wireterm::ScreenError> {
//! let (input, output) = open_streams();
//! let screen = Screen::new(ScreenOptions {
//!     input,
//!     output,
//!     term: "xterm-256color".into(),
//!     width: 80,
//!     height: 24,
//!     charset: None,
//! })?;
//! screen.init()?;
//!
//! let style = Style::DEFAULT.with_fg(Color::GREEN);
//! screen.set_content(0, 0, 'h', &[], style);
//! screen.set_content(1, 0, 'i', &[], style);
//! screen.show();
//!
//! while let Some(event) = screen.poll_event() {
//!     // ... dispatch ...
//!     # let _ = event; break;
//! }
//! screen.fini();
//! # Ok(())
//! # }
//! # fn open_streams() -> (Box<dyn std::io::Read + Send>, Box<dyn std::io::Write + Send>) {
//! #     unimplemented!()
//! # }
//! ```

pub mod charset;
pub mod error;
pub mod event;
pub mod input;
pub mod keymap;
pub mod screen;

mod channel;

pub use error::ScreenError;
pub use event::{Event, KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent};
pub use screen::{Screen, ScreenOptions};

pub use wireterm_render::CellBuffer;
pub use wireterm_style::{Attrs, Color, Style};
pub use wireterm_terminfo::Terminfo;
