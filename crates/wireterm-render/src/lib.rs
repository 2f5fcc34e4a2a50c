#![forbid(unsafe_code)]

//! Cell grid storage for the wireterm screen engine.
//!
//! The [`CellBuffer`] is the engine's model of what the remote display
//! should show. Each [`Cell`] additionally remembers what was last emitted
//! for it, which is what makes minimal redraw possible: a cell is *dirty*
//! exactly when its current content differs from that snapshot, or when an
//! invalidation forced the snapshot away.

pub mod buffer;
pub mod cell;

pub use buffer::CellBuffer;
pub use cell::{char_width, Cell};
